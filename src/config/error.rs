//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required configuration file could not be found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration could not be parsed or deserialized
    #[error("Configuration parse error: {0}")]
    ParseError(String),

    /// A configuration value failed validation
    #[error("Invalid configuration for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    /// Environment variable handling error
    #[error("Environment error: {0}")]
    EnvVarError(String),

    /// Mutually exclusive configuration sources were both set
    #[error("{0}")]
    MutualExclusivity(String),
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn mutual_exclusivity(message: impl Into<String>) -> Self {
        ConfigError::MutualExclusivity(message.into())
    }
}
