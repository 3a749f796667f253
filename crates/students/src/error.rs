//! Student service error types

use thiserror::Error;

use crate::upload::UploadError;

/// Result type alias for student operations
pub type StudentsResult<T> = Result<T, StudentsError>;

/// Errors that can occur in the students service
///
/// A missing student is not an error: lookups return `Option` and deletes
/// return `bool`.
#[derive(Error, Debug)]
pub enum StudentsError {
    /// Payload failed validation
    #[error("{0}")]
    Validation(String),

    /// Backing store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Photo upload failure
    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StudentsError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for StudentsError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
