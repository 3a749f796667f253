//! Health endpoint
//!
//! `GET /health` reports uptime and the status of registered components
//! (for example the backing store). The response is 200 when every
//! component is up and 503 otherwise.

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

/// Status of one dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub name: String,
    pub kind: String,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ComponentStatus {
    pub fn up(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            healthy: true,
            detail: None,
        }
    }

    pub fn down(name: impl Into<String>, kind: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            healthy: false,
            detail: Some(detail.into()),
        }
    }
}

/// Shared state behind the health endpoint
#[derive(Debug)]
pub struct HealthState {
    pub service_name: String,
    pub start_time: Instant,
    components: RwLock<Vec<ComponentStatus>>,
}

impl HealthState {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            start_time: Instant::now(),
            components: RwLock::new(Vec::new()),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Insert or replace the status of a component
    pub fn set_component(&self, status: ComponentStatus) {
        let mut components = self.components.write();
        components.retain(|c| c.name != status.name);
        components.push(status);
    }

    pub fn components(&self) -> Vec<ComponentStatus> {
        self.components.read().clone()
    }

    pub fn is_healthy(&self) -> bool {
        self.components.read().iter().all(|c| c.healthy)
    }
}

/// `GET /health`
pub async fn health_handler(State(state): State<Arc<HealthState>>) -> (StatusCode, Json<Value>) {
    let healthy = state.is_healthy();
    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = json!({
        "status": if healthy { "ok" } else { "degraded" },
        "service": state.service_name,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
        "uptime_seconds": state.uptime_seconds(),
        "components": state.components(),
    });

    (status_code, Json(body))
}

/// Router exposing `GET /health`
pub fn health_routes(state: Arc<HealthState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    #[test]
    fn test_component_tracking() {
        let state = HealthState::new("students-api");
        assert!(state.is_healthy());

        state.set_component(ComponentStatus::up("store", "memory"));
        assert!(state.is_healthy());

        state.set_component(ComponentStatus::down("store", "postgres", "connection refused"));
        assert!(!state.is_healthy());
        assert_eq!(state.components().len(), 1);
    }

    #[tokio::test]
    async fn test_health_route() {
        let state = Arc::new(HealthState::new("students-api"));
        state.set_component(ComponentStatus::up("store", "memory"));

        let response = health_routes(state.clone())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "students-api");
        assert_eq!(body["components"][0]["kind"], "memory");

        state.set_component(ComponentStatus::down("store", "postgres", "timeout"));
        let response = health_routes(state)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
