//! Client configuration resolution.
//!
//! Settings come from, in order of precedence: explicit overrides (CLI
//! flags), environment variables, an optional JSON file in the user's
//! configuration directory, and built-in defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dirs_next::{config_dir, data_dir, home_dir};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Base URL of the automation backend.
pub const API_BASE_ENV: &str = "AUTOMATOR_API_BASE";
/// Status poll period in milliseconds.
pub const POLL_INTERVAL_ENV: &str = "AUTOMATOR_POLL_INTERVAL_MS";
/// Optional TCP connect timeout in milliseconds.
pub const CONNECT_TIMEOUT_ENV: &str = "AUTOMATOR_CONNECT_TIMEOUT_MS";
/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "AUTOMATOR_CONFIG_PATH";
/// Overrides the TUI log file location.
pub const LOG_PATH_ENV: &str = "AUTOMATOR_LOG_PATH";

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
/// Lower bound on the poll period; anything faster only hammers the backend.
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

const APP_DIR_NAME: &str = "workflow-automator";
const CONFIG_FILE_NAME: &str = "config.json";
const LOG_FILE_NAME: &str = "tui.log";

/// Error surfaced while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value '{value}' for {name}: expected {expected}")]
    InvalidValue {
        name: String,
        value: String,
        expected: &'static str,
    },
}

/// On-disk configuration payload. Every field is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
    #[serde(default)]
    pub log_path: Option<String>,
}

/// Values supplied on the command line, taking precedence over everything else.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub api_base: Option<String>,
    pub poll_interval_ms: Option<u64>,
}

/// Fully resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutomatorConfig {
    pub api_base: String,
    pub poll_interval: Duration,
    /// `None` leaves the platform default in place.
    pub connect_timeout: Option<Duration>,
    pub log_path: PathBuf,
}

impl AutomatorConfig {
    /// Resolve configuration from overrides, environment, and the config file.
    pub fn load(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let path = config_file_path();
        let file = load_config_file(&path)?;
        Self::resolve(overrides, file)
    }

    /// Resolve configuration against an already-loaded file payload.
    pub fn resolve(overrides: &ConfigOverrides, file: ConfigFile) -> Result<Self, ConfigError> {
        let api_base = overrides
            .api_base
            .clone()
            .or_else(|| non_empty_env(API_BASE_ENV))
            .or(file.api_base)
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let poll_interval_ms = match overrides.poll_interval_ms {
            Some(value) => value,
            None => env_u64(POLL_INTERVAL_ENV)?
                .or(file.poll_interval_ms)
                .unwrap_or(DEFAULT_POLL_INTERVAL_MS),
        };

        let connect_timeout_ms = env_u64(CONNECT_TIMEOUT_ENV)?.or(file.connect_timeout_ms);

        let log_path = non_empty_env(LOG_PATH_ENV)
            .or(file.log_path)
            .map(|raw| expand_tilde(&raw))
            .unwrap_or_else(default_log_path);

        let config = Self {
            api_base: api_base.trim().trim_end_matches('/').to_string(),
            poll_interval: Duration::from_millis(poll_interval_ms.max(MIN_POLL_INTERVAL_MS)),
            connect_timeout: connect_timeout_ms.filter(|ms| *ms > 0).map(Duration::from_millis),
            log_path,
        };
        debug!(api_base = %config.api_base, poll_interval_ms = config.poll_interval.as_millis() as u64, "resolved configuration");
        Ok(config)
    }
}

/// Location of the JSON config file, honoring [`CONFIG_PATH_ENV`].
pub fn config_file_path() -> PathBuf {
    if let Some(path) = non_empty_env(CONFIG_PATH_ENV) {
        return expand_tilde(&path);
    }
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

/// Read the config file; a missing file yields the empty payload.
pub fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(ConfigFile::default()),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            });
        }
    };
    if content.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn default_log_path() -> PathBuf {
    data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join(LOG_FILE_NAME)
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let home = || home_dir().unwrap_or_else(|| PathBuf::from("~"));
    if trimmed == "~" {
        return home();
    }
    match trimmed.strip_prefix("~/").or_else(|| trimmed.strip_prefix("~\\")) {
        Some(rest) => home().join(rest),
        None => PathBuf::from(trimmed),
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn env_u64(name: &str) -> Result<Option<u64>, ConfigError> {
    match non_empty_env(name) {
        None => Ok(None),
        Some(value) => value.parse::<u64>().map(Some).map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value,
            expected: "a non-negative integer in milliseconds",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ALL_VARS: [&str; 5] = [API_BASE_ENV, POLL_INTERVAL_ENV, CONNECT_TIMEOUT_ENV, CONFIG_PATH_ENV, LOG_PATH_ENV];

    fn cleared<F: FnOnce()>(extra: &[(&str, Option<&str>)], body: F) {
        let mut vars: Vec<(&str, Option<&str>)> = ALL_VARS.iter().map(|name| (*name, None)).collect();
        for (name, value) in extra {
            vars.retain(|(existing, _)| existing != name);
            vars.push((*name, *value));
        }
        temp_env::with_vars(vars, body);
    }

    #[test]
    fn defaults_apply_without_any_source() {
        cleared(&[], || {
            let config = AutomatorConfig::resolve(&ConfigOverrides::default(), ConfigFile::default()).unwrap();
            assert_eq!(config.api_base, DEFAULT_API_BASE);
            assert_eq!(config.poll_interval, Duration::from_millis(DEFAULT_POLL_INTERVAL_MS));
            assert_eq!(config.connect_timeout, None);
            assert!(config.log_path.ends_with("workflow-automator/tui.log"));
        });
    }

    #[test]
    fn environment_beats_file_and_overrides_beat_environment() {
        cleared(&[(API_BASE_ENV, Some("http://env.local:9000/")), (POLL_INTERVAL_ENV, Some("250"))], || {
            let file = ConfigFile {
                api_base: Some("http://file.local".into()),
                poll_interval_ms: Some(5000),
                connect_timeout_ms: Some(1500),
                log_path: None,
            };
            let from_env = AutomatorConfig::resolve(&ConfigOverrides::default(), file.clone()).unwrap();
            assert_eq!(from_env.api_base, "http://env.local:9000");
            assert_eq!(from_env.poll_interval, Duration::from_millis(250));
            assert_eq!(from_env.connect_timeout, Some(Duration::from_millis(1500)));

            let overrides = ConfigOverrides {
                api_base: Some("http://flag.local".into()),
                poll_interval_ms: Some(2000),
            };
            let from_flags = AutomatorConfig::resolve(&overrides, file).unwrap();
            assert_eq!(from_flags.api_base, "http://flag.local");
            assert_eq!(from_flags.poll_interval, Duration::from_millis(2000));
        });
    }

    #[test]
    fn poll_interval_is_floored() {
        cleared(&[(POLL_INTERVAL_ENV, Some("5"))], || {
            let config = AutomatorConfig::resolve(&ConfigOverrides::default(), ConfigFile::default()).unwrap();
            assert_eq!(config.poll_interval, Duration::from_millis(MIN_POLL_INTERVAL_MS));
        });
    }

    #[test]
    fn rejects_non_numeric_interval() {
        cleared(&[(POLL_INTERVAL_ENV, Some("soon"))], || {
            let error = AutomatorConfig::resolve(&ConfigOverrides::default(), ConfigFile::default()).unwrap_err();
            assert!(matches!(error, ConfigError::InvalidValue { ref name, .. } if name == POLL_INTERVAL_ENV));
        });
    }

    #[test]
    fn loads_config_file_from_override_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, r#"{{"api_base": "http://from-file:8000", "poll_interval_ms": 750}}"#).unwrap();

        let path_str = path.to_string_lossy().to_string();
        cleared(&[(CONFIG_PATH_ENV, Some(path_str.as_str()))], || {
            assert_eq!(config_file_path(), path);
            let config = AutomatorConfig::load(&ConfigOverrides::default()).unwrap();
            assert_eq!(config.api_base, "http://from-file:8000");
            assert_eq!(config.poll_interval, Duration::from_millis(750));
        });
    }

    #[test]
    fn missing_file_is_empty_and_malformed_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert_eq!(load_config_file(&missing).unwrap(), ConfigFile::default());

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(load_config_file(&broken), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn expands_home_prefix() {
        let expanded = expand_tilde("~/logs/tui.log");
        assert!(expanded.ends_with("logs/tui.log"));
        assert!(!expanded.starts_with("~") || home_dir().is_none());
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
    }
}
