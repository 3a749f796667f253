//! Photo upload adapters
//!
//! [`UploadStore`] persists an uploaded file and returns its public URL.
//! The implementation is picked once at startup by [`build_upload_store`];
//! handlers only ever see `Arc<dyn UploadStore>`.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use config::{UploadBackend, UploadConfig};

pub mod cloudinary;
pub mod local;

pub use cloudinary::CloudinaryUploadStore;
pub use local::LocalUploadStore;

/// A file received in a multipart request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Client-supplied file name
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        }
    }

    /// Lowercased alphanumeric extension of the client file name, if any
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(str::to_ascii_lowercase)
    }
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Uploaded file is empty")]
    Empty,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upload rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid upload response: {0}")]
    InvalidResponse(String),
}

/// Persists uploaded files and returns their public URL
#[async_trait]
pub trait UploadStore: Send + Sync {
    async fn store(&self, file: UploadedFile) -> Result<String, UploadError>;

    /// Backend name for logs and metrics
    fn backend(&self) -> &'static str;
}

/// Build the adapter selected by configuration
pub fn build_upload_store(config: &UploadConfig) -> Result<Arc<dyn UploadStore>, UploadError> {
    let store: Arc<dyn UploadStore> = match &config.backend {
        UploadBackend::Local => Arc::new(LocalUploadStore::new(
            config.upload_dir.clone(),
            config.app_domain.clone(),
        )),
        UploadBackend::Cloudinary(credentials) => {
            Arc::new(CloudinaryUploadStore::new(credentials.clone())?)
        }
    };

    info!(backend = store.backend(), "Upload store configured");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::CloudinaryConfig;

    #[test]
    fn test_extension() {
        let file = UploadedFile::new("me.PNG", None, vec![1]);
        assert_eq!(file.extension().as_deref(), Some("png"));

        assert_eq!(UploadedFile::new("noext", None, vec![1]).extension(), None);
        assert_eq!(UploadedFile::new("bad.p/ng", None, vec![1]).extension(), None);
    }

    #[test]
    fn test_build_upload_store_selects_backend() {
        let mut config = UploadConfig {
            backend: UploadBackend::Local,
            upload_dir: "uploads".into(),
            app_domain: "http://localhost:3000".to_string(),
        };
        assert_eq!(build_upload_store(&config).unwrap().backend(), "local");

        config.backend = UploadBackend::Cloudinary(CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
        });
        assert_eq!(build_upload_store(&config).unwrap().backend(), "cloudinary");
    }
}
