//! Configuration error types

use thiserror::Error;

/// Result type for configuration loading
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Errors raised while reading configuration from the environment
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset and has no default
    #[error("Environment variable '{0}' is not set and has no default")]
    MissingEnvVar(String),

    /// A variable is set but cannot be parsed
    #[error("Environment variable '{var}' is invalid: {message}")]
    InvalidEnvVar { var: String, message: String },
}
