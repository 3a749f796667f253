//! API routes for students

use axum::{
    extract::DefaultBodyLimit,
    handler::HandlerWithoutStateExt,
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use config::{AppConfig, CorsConfig, UploadBackend};
use server::{health_routes, HealthState};

use super::handlers::*;
use super::middleware::{
    cors_guard, cors_layer, enforce_timeout, handle_panic, not_found_fallback, track_requests,
};
use super::AppState;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Router settings taken from [`AppConfig`]
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub cors: CorsConfig,
    pub max_upload_bytes: usize,
    /// Directory served at `/uploads`, set for the local upload backend
    pub uploads_dir: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl RouterConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        let uploads_dir = match config.upload.backend {
            UploadBackend::Local => Some(config.upload.upload_dir.clone()),
            UploadBackend::Cloudinary(_) => None,
        };

        Self {
            cors: config.cors.clone(),
            max_upload_bytes: config.http.max_upload_bytes,
            uploads_dir,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Build the application router
///
/// Layers, outermost first: panic catcher, CORS, request id, tracing,
/// request metrics, timeout, body limit. Unmatched paths, unsupported
/// methods and missing uploads all get the 404 envelope.
pub fn create_router(
    state: AppState,
    config: RouterConfig,
    health: Option<Arc<HealthState>>,
) -> Router {
    let metrics = state.metrics.clone();

    let mut router = Router::new()
        .route(
            "/",
            get(hello).fallback(not_found_fallback),
        )
        .route(
            "/students",
            get(list_students)
                .post(create_student)
                .fallback(not_found_fallback),
        )
        .route(
            "/students/:id",
            get(get_student)
                .put(upsert_student)
                .patch(patch_student)
                .delete(delete_student)
                .fallback(not_found_fallback),
        )
        .with_state(state);

    if let Some(dir) = &config.uploads_dir {
        let files = ServeDir::new(dir).not_found_service(not_found_fallback.into_service());
        router = router.nest_service("/uploads", files);
    }

    if let Some(health) = health {
        router = router.merge(health_routes(health));
    }

    router
        .fallback(not_found_fallback)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(from_fn_with_state(config.request_timeout, enforce_timeout))
        .layer(from_fn_with_state(metrics, track_requests))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(from_fn_with_state(Arc::new(config.cors.clone()), cors_guard))
        .layer(cors_layer(&config.cors))
        .layer(CatchPanicLayer::custom(handle_panic))
}
