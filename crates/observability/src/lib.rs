//! Observability for the Students API
//!
//! - Structured logging via `tracing`
//! - Prometheus metrics for HTTP traffic
//!
//! # Quick Start
//!
//! ```ignore
//! use observability::{init_logging, LogFormat};
//!
//! init_logging("students-api", LogFormat::Pretty)?;
//!
//! // Optional: expose /metrics on port 9100
//! observability::metrics::init_metrics(9100)?;
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::{init_metrics, HttpMetrics};
