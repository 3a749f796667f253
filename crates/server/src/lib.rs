//! HTTP server infrastructure for the Students API
//!
//! Provides an Axum-backed [`HttpServer`] with lifecycle management and
//! graceful shutdown.
//!
//! Shutdown is coordinated with a `CancellationToken` from `tokio_util`.
//!
//! # Quick Start
//!
//! ```ignore
//! use server::{HttpServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::new("0.0.0.0", 3000);
//!     let server = HttpServer::new("students-api", config, router);
//!     server.run_until_signal().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`] - bind address configuration
//! - [`http`] - Axum HTTP server
//! - [`health`] - health endpoint and component status
//! - [`shutdown`] - signal handling and graceful shutdown
//! - [`port_validator`] - early port availability checks

pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod port_validator;
pub mod shutdown;

pub use config::{ServerConfig, DEFAULT_HTTP_PORT};
pub use error::{Result, ServerError};
pub use health::{health_routes, ComponentStatus, HealthState};
pub use http::HttpServer;
pub use port_validator::{validate_port_available, validate_port_range};
pub use shutdown::ShutdownController;
