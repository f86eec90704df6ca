//! Secret redaction for log output.
//!
//! Submission parameters carry raw credentials straight through to the
//! backend. Nothing in this client stores them, but request logging must
//! never print them either.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

/// Replacement token written in place of a redacted value.
pub const REDACTED: &str = "[REDACTED]";

/// Parameter-name fragments treated as secret (case-insensitive).
const SECRET_NAME_FRAGMENTS: &[&str] = &["password", "passwd", "secret", "token", "key", "credential"];

static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(authorization:\s*)(\S+(?:\s+\S+)?)",
        r"(?i)(\b[A-Z0-9_]*(?:KEY|TOKEN|SECRET|PASSWORD)\s*[=:]\s*)([^\s,&]+)",
        r#"(?i)("(?:password|token|secret|api_key)"\s*:\s*")([^"]*)(")"#,
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Redacts values that look like secrets in free text.
///
/// # Example
/// ```ignore
/// let line = redact_sensitive("PASSWORD=hunter2 user=a");
/// assert_eq!(line, "PASSWORD=[REDACTED] user=a");
/// ```
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for pattern in REDACT_PATTERNS.iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                let suffix = captures.get(3).map(|m| m.as_str()).unwrap_or("");
                format!("{prefix}{REDACTED}{suffix}")
            })
            .into_owned();
    }
    redacted
}

/// Returns `true` when a parameter name suggests its value is a credential.
pub fn is_secret_parameter(name: &str) -> bool {
    let lowered = name.to_ascii_lowercase();
    SECRET_NAME_FRAGMENTS.iter().any(|fragment| lowered.contains(fragment))
}

/// Copy of `parameters` with secret-looking values replaced, order preserved.
pub fn redact_parameters(parameters: &IndexMap<String, String>) -> IndexMap<String, String> {
    parameters
        .iter()
        .map(|(name, value)| {
            let shown = if is_secret_parameter(name) && !value.is_empty() {
                REDACTED.to_string()
            } else {
                value.clone()
            };
            (name.clone(), shown)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_env_style_assignments() {
        assert_eq!(redact_sensitive("PASSWORD=hunter2 user=a"), "PASSWORD=[REDACTED] user=a");
        assert_eq!(redact_sensitive("API_TOKEN: abc123"), "API_TOKEN: [REDACTED]");
    }

    #[test]
    fn redacts_secrets_in_request_urls() {
        assert_eq!(
            redact_sensitive("http://127.0.0.1:8000/api/workflows?api_key=abc&page=2"),
            "http://127.0.0.1:8000/api/workflows?api_key=[REDACTED]&page=2"
        );
        assert_eq!(redact_sensitive("http://127.0.0.1:8000/health"), "http://127.0.0.1:8000/health");
    }

    #[test]
    fn redacts_json_password_fields() {
        let body = r#"{"username":"a","password":"b"}"#;
        assert_eq!(redact_sensitive(body), r#"{"username":"a","password":"[REDACTED]"}"#);
    }

    #[test]
    fn redacts_authorization_header() {
        assert_eq!(redact_sensitive("Authorization: Bearer abc"), "Authorization: [REDACTED]");
    }

    #[test]
    fn parameter_map_redaction_keeps_order_and_plain_values() {
        let mut parameters = IndexMap::new();
        parameters.insert("username".to_string(), "alice".to_string());
        parameters.insert("Password".to_string(), "s3cret".to_string());
        parameters.insert("api_key".to_string(), String::new());
        let redacted = redact_parameters(&parameters);
        let entries: Vec<_> = redacted.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(entries, vec![("username", "alice"), ("Password", REDACTED), ("api_key", "")]);
    }
}
