//! Workflow Automator utilities: configuration, logging, and redaction.

pub mod config;
pub mod logging;
pub mod redaction;

pub use config::{AutomatorConfig, ConfigError, ConfigFile, ConfigOverrides, expand_tilde};
pub use logging::{init_file_logging, init_stderr_logging};
pub use redaction::{redact_parameters, redact_sensitive};
