//! Server bind configuration

use crate::error::{Result, ServerError};
use std::net::SocketAddr;

/// Port used when `PORT` is not configured
pub const DEFAULT_HTTP_PORT: u16 = 3000;

/// Where the HTTP server binds
///
/// # Example
///
/// ```
/// use server::config::ServerConfig;
///
/// let config = ServerConfig::new("127.0.0.1", 3000);
/// assert_eq!(config.http_addr().unwrap().port(), 3000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// HTTP port; 0 asks the OS for an ephemeral port
    pub http_port: u16,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, http_port: u16) -> Self {
        Self {
            host: host.into(),
            http_port,
        }
    }

    /// Parse the bind address
    pub fn http_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.http_port)
            .parse()
            .map_err(|_| ServerError::InvalidAddress(format!("{}:{}", self.host, self.http_port)))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("0.0.0.0", DEFAULT_HTTP_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.http_port, 3000);
    }

    #[test]
    fn test_http_addr() {
        let config = ServerConfig::new("127.0.0.1", 8080);
        assert_eq!(config.http_addr().unwrap().to_string(), "127.0.0.1:8080");

        let config = ServerConfig::new("not a host", 8080);
        assert!(matches!(config.http_addr(), Err(ServerError::InvalidAddress(_))));
    }
}
