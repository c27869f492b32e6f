//! Shared configuration types for TuneBox clients
//!
//! This crate provides the configuration surface shared by every binary
//! that talks to a TuneBox music server, ensuring the WebSocket and HTTP
//! endpoints are always derived the same way.

mod error;
mod server;

pub use error::{ConfigError, ConfigResult};
pub use server::ServerConfig;

use std::env;

/// Read an environment variable, falling back to a default when unset
pub fn get_env_or_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to a default when unset
///
/// A variable that is set but does not parse is an error, not a
/// fallback.
pub fn parse_env<T>(name: &str, default: T) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        Err(_) => Ok(default),
    }
}
