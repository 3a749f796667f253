//! Port checks
//!
//! Checking a port before binding is inherently racy (another process can
//! take it in between). These checks give early feedback at startup; the
//! real bind is the source of truth.

use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};

/// Check that the configured HTTP port can be bound right now
pub async fn validate_port_available(config: &ServerConfig) -> Result<()> {
    validate_port_range(config.http_port)?;

    let addr = format!("{}:{}", config.host, config.http_port);
    debug!("Checking HTTP port {}", config.http_port);

    match TcpListener::bind(&addr).await {
        Ok(listener) => {
            let local_addr = listener
                .local_addr()
                .map_err(|source| ServerError::Bind {
                    address: addr.clone(),
                    source,
                })?;
            drop(listener);

            info!("HTTP port {} is available ({})", config.http_port, local_addr);
            Ok(())
        }
        Err(e) => {
            error!("HTTP port {} is NOT available: {}", config.http_port, e);
            Err(ServerError::PortInUse {
                port: config.http_port,
                reason: e.to_string(),
            })
        }
    }
}

/// Reject port 0 and warn on privileged ports
pub fn validate_port_range(port: u16) -> Result<()> {
    if port == 0 {
        Err(ServerError::InvalidPort(port))
    } else {
        if port < 1024 {
            warn!(
                "Port {} is a privileged port (requires root/admin privileges)",
                port
            );
        }
        Ok(())
    }
}
