//! Configuration for the Students API
//!
//! All settings come from environment variables and are read exactly once at
//! startup into an [`AppConfig`], which is then passed explicitly to whatever
//! needs it.
//!
//! # Modules
//!
//! - [`env`] - environment snapshot and typed accessors
//! - [`parser`] - builds an [`AppConfig`] from an [`EnvVars`] snapshot
//! - [`validator`] - semantic checks producing a [`ValidationReport`]
//! - [`defaults`] - default values

use std::fmt;
use std::path::PathBuf;

pub mod defaults;
pub mod env;
pub mod error;
pub mod parser;
pub mod validator;

pub use env::EnvVars;
pub use error::{ConfigError, ConfigResult};
pub use parser::{load_config, LoadedConfig};
pub use validator::{
    validate_app_config, DefaultApplied, ValidationError, ValidationReport, ValidationWarning,
};

/// Variable names read by [`load_config`]
pub mod vars {
    pub const HOST: &str = "HOST";
    pub const PORT: &str = "PORT";
    pub const ENABLE_CLOUDINARY: &str = "ENABLE_CLOUDINARY";
    pub const CLOUD_NAME: &str = "CLOUD_NAME";
    pub const API_KEY: &str = "API_KEY";
    pub const API_SECRET: &str = "API_SECRET";
    pub const UPLOAD_DIR: &str = "UPLOAD_DIR";
    pub const APP_DOMAIN: &str = "APP_DOMAIN";
    pub const MAX_UPLOAD_BYTES: &str = "MAX_UPLOAD_BYTES";
    pub const CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
    pub const CORS_ENFORCE: &str = "CORS_ENFORCE";
    pub const DATABASE_URL: &str = "DATABASE_URL";
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
    pub const METRICS_PORT: &str = "METRICS_PORT";
}

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub cors: CorsConfig,
    pub upload: UploadConfig,
    pub storage: StorageConfig,
    pub observability: ObservabilityConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    /// Request body limit, applied to multipart uploads
    pub max_upload_bytes: usize,
}

/// Cross-origin policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    /// When false every origin is accepted
    pub enforce: bool,
}

impl CorsConfig {
    /// Whether `origin` may call the API under this policy
    pub fn is_allowed(&self, origin: &str) -> bool {
        !self.enforce || self.allowed_origins.iter().any(|o| o == origin)
    }
}

/// Where uploaded photos end up
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub backend: UploadBackend,
    /// Local directory for uploaded files, also served at `/uploads`
    pub upload_dir: PathBuf,
    /// Public base URL used to build local file URLs
    pub app_domain: String,
}

/// Upload adapter selection, driven by `ENABLE_CLOUDINARY`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadBackend {
    Local,
    Cloudinary(CloudinaryConfig),
}

impl UploadBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadBackend::Local => "local",
            UploadBackend::Cloudinary(_) => "cloudinary",
        }
    }
}

/// Cloudinary credentials
#[derive(Clone, PartialEq, Eq)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .finish()
    }
}

/// Backing store selection
#[derive(Clone, Default)]
pub struct StorageConfig {
    /// PostgreSQL connection string; the in-memory store is used when absent
    pub database_url: Option<String>,
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("database_url", &self.database_url.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Logging and metrics settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    pub log_format: String,
    pub metrics_port: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_is_allowed() {
        let mut cors = CorsConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            enforce: false,
        };
        assert!(cors.is_allowed("http://evil.example"));

        cors.enforce = true;
        assert!(cors.is_allowed("http://localhost:3000"));
        assert!(!cors.is_allowed("http://evil.example"));
    }

    #[test]
    fn test_secrets_are_redacted_in_debug() {
        let cloudinary = CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "123".to_string(),
            api_secret: "topsecret".to_string(),
        };
        assert!(!format!("{:?}", cloudinary).contains("topsecret"));

        let storage = StorageConfig {
            database_url: Some("postgres://user:pw@db/students".to_string()),
        };
        assert!(!format!("{:?}", storage).contains("pw@db"));
    }
}
