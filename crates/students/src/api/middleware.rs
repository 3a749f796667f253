//! Request middleware and fallbacks

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header::ORIGIN, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::{AllowOrigin, Any as CorsAny, CorsLayer};
use tracing::{error, info, warn};

use config::CorsConfig;
use observability::HttpMetrics;

use super::error::{ApiError, INTERNAL_ERROR_MESSAGE};
use super::models::Envelope;

pub const REQUEST_TIMEOUT_MESSAGE: &str = "Request timed out";

/// CORS response headers
///
/// Permissive unless the allow-list is enforced.
pub fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(CorsAny);

    if !cors.enforce {
        return layer.allow_origin(CorsAny);
    }

    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// Reject requests whose `Origin` is not allow-listed, when enforced.
///
/// Requests without an `Origin` header (same-origin, curl) pass.
pub async fn cors_guard(
    State(cors): State<Arc<CorsConfig>>,
    req: Request,
    next: Next,
) -> Response {
    let origin = req
        .headers()
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if let Some(origin) = origin {
        if !cors.is_allowed(&origin) {
            warn!(%origin, "Origin rejected by CORS policy");
            return ApiError::CorsRejected.into_response();
        }
    }

    next.run(req).await
}

/// Log each request and record HTTP metrics
pub async fn track_requests(
    State(metrics): State<HttpMetrics>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    let elapsed = start.elapsed();
    let status = response.status().as_u16();
    metrics.record_request(method.as_str(), status, elapsed);
    info!(
        %method,
        %path,
        status,
        latency_ms = elapsed.as_millis() as u64,
        "Request completed"
    );

    response
}

/// Answer with a 408 envelope when the inner service exceeds `timeout`
pub async fn enforce_timeout(
    State(timeout): State<Duration>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match tokio::time::timeout(timeout, next.run(req)).await {
        Ok(response) => response,
        Err(_) => {
            warn!(%method, %path, timeout_ms = timeout.as_millis() as u64, "Request timed out");
            Envelope::<()>::empty(StatusCode::REQUEST_TIMEOUT, REQUEST_TIMEOUT_MESSAGE)
                .into_response()
        }
    }
}

/// Unmatched routes
pub async fn not_found_fallback() -> Envelope<()> {
    Envelope::empty(StatusCode::NOT_FOUND, "Not found")
}

/// Panic handler for `CatchPanicLayer`
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(%detail, "Handler panicked");

    Envelope::<()>::empty(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::to_bytes,
        middleware::from_fn_with_state,
        routing::get,
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_panic_handler_returns_generic_envelope() {
        let response = handle_panic(Box::new("index out of bounds"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["message"], "Something went wrong");
        assert!(json["data"].is_null());
    }

    #[tokio::test]
    async fn test_not_found_fallback() {
        let response = not_found_fallback().await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_slow_request_gets_timeout_envelope() {
        let app = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "done"
                }),
            )
            .route("/fast", get(|| async { "done" }))
            .layer(from_fn_with_state(
                Duration::from_millis(20),
                enforce_timeout,
            ));

        let req = axum::http::Request::get("/slow").body(Body::empty()).unwrap();
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], 408);
        assert_eq!(json["message"], "Request timed out");
        assert!(json["data"].is_null());

        let req = axum::http::Request::get("/fast").body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
