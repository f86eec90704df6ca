//! Error types for backend requests.

use automator_util::redact_sensitive;
use thiserror::Error;

/// Backend capability a request belongs to; used to name failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Execute,
    Status,
    Health,
    ListWorkflows,
    ListExecutions,
    GetExecution,
    ListExtracted,
    Reset,
}

impl Endpoint {
    /// Label used as the prefix of error messages, e.g. `Execute failed: 500`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Execute => "Execute",
            Self::Status => "Status",
            Self::Health => "Health",
            Self::ListWorkflows => "List workflows",
            Self::ListExecutions => "List executions",
            Self::GetExecution => "Get execution",
            Self::ListExtracted => "List extracted",
            Self::Reset => "Reset",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Failure of a single backend request. Nothing is retried.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure: DNS, refused connection, reset, body read.
    #[error("{endpoint} failed: network error: {source}")]
    Network {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx response. The body is not inspected.
    #[error("{endpoint} failed: {status}")]
    Http { endpoint: Endpoint, status: u16 },

    /// 2xx response whose body did not have the expected shape.
    #[error("{endpoint} failed: unexpected response body: {source}")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },

    /// 2xx response carrying an `{"error": ...}` object instead of data.
    #[error("{endpoint} failed: {message}")]
    Backend { endpoint: Endpoint, message: String },

    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl ApiError {
    /// Display text with secret-looking values masked, for log fields.
    ///
    /// Transport errors embed the request URL, so query strings can carry
    /// tokens into the message.
    pub fn redacted(&self) -> String {
        redact_sensitive(&self.to_string())
    }

    /// HTTP status code for non-2xx failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
