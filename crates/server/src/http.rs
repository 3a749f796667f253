//! Axum HTTP server with graceful shutdown

use axum::Router;
use parking_lot::RwLock;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::shutdown::ShutdownController;

/// Serves one Axum router until its shutdown token is cancelled
///
/// ```ignore
/// let server = HttpServer::new("students-api", ServerConfig::new("0.0.0.0", 3000), router);
/// server.run_until_signal().await?;
/// ```
#[derive(Clone)]
pub struct HttpServer {
    name: String,
    config: ServerConfig,
    router: Router,
    bound_addr: Arc<RwLock<Option<SocketAddr>>>,
}

impl HttpServer {
    pub fn new(name: impl Into<String>, config: ServerConfig, router: Router) -> Self {
        Self {
            name: name.into(),
            config,
            router,
            bound_addr: Arc::new(RwLock::new(None)),
        }
    }

    /// Listening address, `None` before bind and after shutdown
    pub fn address(&self) -> Option<SocketAddr> {
        *self.bound_addr.read()
    }

    /// Bind and serve until `shutdown` is cancelled, draining in-flight
    /// requests before returning.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<()> {
        let addr = self.config.http_addr()?;
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                address: addr.to_string(),
                source,
            })?;

        let local_addr = listener.local_addr()?;
        *self.bound_addr.write() = Some(local_addr);
        info!(server = %self.name, %local_addr, "HTTP server listening");

        let name = self.name.clone();
        let result = axum::serve(listener, self.router.clone())
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                info!(server = %name, "Draining HTTP connections");
            })
            .await;

        *self.bound_addr.write() = None;

        if let Err(e) = result {
            error!(server = %self.name, %e, "HTTP server failed");
            return Err(ServerError::Io(e));
        }

        info!(server = %self.name, "HTTP server stopped");
        Ok(())
    }

    /// Serve until Ctrl+C or SIGTERM
    pub async fn run_until_signal(self) -> Result<()> {
        let shutdown = ShutdownController::with_signals();
        self.run(shutdown.token()).await
    }
}
