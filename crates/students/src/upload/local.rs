//! Local disk upload store

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

use super::{UploadError, UploadStore, UploadedFile};

/// Writes files under `upload_dir`; they are served at `{app_domain}/uploads`
#[derive(Debug, Clone)]
pub struct LocalUploadStore {
    upload_dir: PathBuf,
    app_domain: String,
}

impl LocalUploadStore {
    pub fn new(upload_dir: impl Into<PathBuf>, app_domain: impl Into<String>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            app_domain: app_domain.into().trim_end_matches('/').to_string(),
        }
    }

    fn unique_name(file: &UploadedFile) -> String {
        let stem = Uuid::new_v4().simple().to_string();
        match file.extension() {
            Some(ext) => format!("{}.{}", stem, ext),
            None => stem,
        }
    }
}

#[async_trait]
impl UploadStore for LocalUploadStore {
    async fn store(&self, file: UploadedFile) -> Result<String, UploadError> {
        if file.bytes.is_empty() {
            return Err(UploadError::Empty);
        }

        tokio::fs::create_dir_all(&self.upload_dir).await?;

        let name = Self::unique_name(&file);
        let path = self.upload_dir.join(&name);
        tokio::fs::write(&path, &file.bytes).await?;

        debug!(path = %path.display(), size = file.bytes.len(), "Stored upload on disk");
        Ok(format!("{}/uploads/{}", self.app_domain, name))
    }

    fn backend(&self) -> &'static str {
        "local"
    }
}
