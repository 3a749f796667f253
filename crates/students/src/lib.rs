//! Student records service
//!
//! CRUD over student records with pagination, sorting and filtering, photo
//! uploads to local disk or Cloudinary, and an Axum HTTP API that wraps
//! every response in a `{status, message, data}` envelope.
//!
//! # Architecture
//!
//! ```text
//! api (handlers) --> StudentsService --> dyn StudentStore (memory | postgres)
//!        \--> dyn UploadStore (local | cloudinary)
//! ```
//!
//! # Features
//!
//! - `postgres`: enables [`store::PostgresStudentStore`]

pub mod api;
pub mod error;
pub mod params;
pub mod service;
pub mod store;
pub mod types;
pub mod upload;

pub use api::{create_router, AppState, RouterConfig};
pub use error::{StudentsError, StudentsResult};
pub use params::{
    parse_filter_params, parse_pagination_params, parse_sort_params, PaginationParams,
    SortField, SortOrder, SortParams, StudentFilter,
};
pub use service::{StudentPage, StudentsService, UpdateOptions, UpsertResult};
pub use store::{InMemoryStudentStore, StudentQuery, StudentStore};
#[cfg(feature = "postgres")]
pub use store::PostgresStudentStore;
pub use types::{Gender, Student, StudentId, StudentPatch, StudentPayload};
pub use upload::{build_upload_store, UploadError, UploadStore, UploadedFile};
