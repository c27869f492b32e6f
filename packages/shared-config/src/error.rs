//! Configuration errors

use thiserror::Error;

/// Errors raised while reading configuration from the environment
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An environment variable was set but could not be parsed
    #[error("invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;
