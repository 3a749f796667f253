//! HTTP API for student records

use std::sync::Arc;

use observability::HttpMetrics;

use crate::service::StudentsService;
use crate::upload::UploadStore;

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;

pub use error::ApiError;
pub use models::Envelope;
pub use routes::{create_router, RouterConfig};

/// Shared state for the students handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<StudentsService>,
    pub uploader: Arc<dyn UploadStore>,
    pub metrics: HttpMetrics,
}

impl AppState {
    pub fn new(
        service: StudentsService,
        uploader: Arc<dyn UploadStore>,
        metrics: HttpMetrics,
    ) -> Self {
        Self {
            service: Arc::new(service),
            uploader,
            metrics,
        }
    }
}
