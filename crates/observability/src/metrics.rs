//! Prometheus metrics
//!
//! When no exporter is installed (the default), the `metrics` macros are
//! no-ops, so recording is always safe to call.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Start a Prometheus exporter serving `/metrics` on `port`
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(%addr, "Metrics server listening");
    Ok(())
}

/// HTTP request metrics
///
/// * `http_requests_total{service, method, status}`
/// * `http_request_duration_seconds{service, method}`
/// * `uploads_total{service, backend}`
#[derive(Debug, Clone)]
pub struct HttpMetrics {
    service: String,
}

impl HttpMetrics {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Record one completed request
    pub fn record_request(&self, method: &str, status: u16, duration: Duration) {
        counter!(
            "http_requests_total",
            "service" => self.service.clone(),
            "method" => method.to_string(),
            "status" => status.to_string()
        )
        .increment(1);
        histogram!(
            "http_request_duration_seconds",
            "service" => self.service.clone(),
            "method" => method.to_string()
        )
        .record(duration.as_secs_f64());
    }

    /// Record one stored upload
    pub fn record_upload(&self, backend: &'static str) {
        counter!(
            "uploads_total",
            "service" => self.service.clone(),
            "backend" => backend
        )
        .increment(1);
    }

    pub fn service(&self) -> &str {
        &self.service
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_exporter_is_noop() {
        let metrics = HttpMetrics::new("students-api");
        metrics.record_request("GET", 200, Duration::from_millis(3));
        metrics.record_upload("local");
        assert_eq!(metrics.service(), "students-api");
    }
}
