//! Music server endpoint configuration

use crate::{get_env_or_default, parse_env, ConfigResult};

/// Location of the TuneBox music server
///
/// Both the WebSocket push endpoint and the HTTP API are served from the
/// same host and port; the derived URL helpers add the right path and
/// scheme for each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Server hostname or IP address
    pub host: String,

    /// Server TCP port
    pub port: u16,
}

impl ServerConfig {
    /// Load the server location from environment variables
    ///
    /// Reads `TUNEBOX_SERVER_HOST` (default `localhost`) and
    /// `TUNEBOX_SERVER_PORT` (default `8000`).
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            host: get_env_or_default("TUNEBOX_SERVER_HOST", "localhost"),
            port: parse_env("TUNEBOX_SERVER_PORT", 8000)?,
        })
    }

    /// Create a configuration pointing at a specific address (useful for testing)
    pub fn with_address(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// URL of the state synchronization WebSocket endpoint
    pub fn ws_url(&self) -> String {
        format!("ws://{}:{}/ws", self.host, self.port)
    }

    /// Base URL of the music HTTP API
    pub fn http_base(&self) -> String {
        format!("http://{}:{}/api/music", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn test_with_address() {
        let config = ServerConfig::with_address("music.local", 9000);
        assert_eq!(config.host, "music.local");
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_ws_url() {
        let config = ServerConfig::default();
        assert_eq!(config.ws_url(), "ws://localhost:8000/ws");
    }

    #[test]
    fn test_http_base() {
        let config = ServerConfig::with_address("10.0.0.5", 8123);
        assert_eq!(config.http_base(), "http://10.0.0.5:8123/api/music");
    }
}
