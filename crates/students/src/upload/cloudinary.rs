//! Cloudinary upload store
//!
//! Uses the signed upload API: the request carries `api_key`, `timestamp`
//! and a SHA-256 `signature` over the signed parameters plus the API secret.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, warn};

use config::CloudinaryConfig;

use super::{UploadError, UploadStore, UploadedFile};

const API_BASE: &str = "https://api.cloudinary.com/v1_1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct CloudinaryUploadStore {
    client: reqwest::Client,
    credentials: CloudinaryConfig,
    api_base: String,
}

impl CloudinaryUploadStore {
    pub fn new(credentials: CloudinaryConfig) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            credentials,
            api_base: API_BASE.to_string(),
        })
    }

    /// Point at a different API host
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn upload_url(&self) -> String {
        format!("{}/{}/image/upload", self.api_base, self.credentials.cloud_name)
    }

    /// Hex SHA-256 of the sorted `key=value` pairs joined by `&`, followed
    /// by the API secret
    pub fn sign(params: &[(&str, String)], api_secret: &str) -> String {
        let mut sorted: Vec<_> = params.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let to_sign = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        hex::encode(Sha256::digest(format!("{}{}", to_sign, api_secret).as_bytes()))
    }
}

/// Multipart file part; a malformed client content type is dropped
fn file_part(file: UploadedFile) -> Result<Part, UploadError> {
    let UploadedFile {
        file_name,
        content_type,
        bytes,
    } = file;
    let part = Part::bytes(bytes).file_name(file_name);

    match content_type {
        Some(content_type) if Part::text("").mime_str(&content_type).is_ok() => {
            Ok(part.mime_str(&content_type)?)
        }
        Some(content_type) => {
            warn!(%content_type, "Ignoring invalid upload content type");
            Ok(part)
        }
        None => Ok(part),
    }
}

#[async_trait]
impl UploadStore for CloudinaryUploadStore {
    async fn store(&self, file: UploadedFile) -> Result<String, UploadError> {
        if file.bytes.is_empty() {
            return Err(UploadError::Empty);
        }

        let timestamp = Utc::now().timestamp().to_string();
        let signature = Self::sign(
            &[("timestamp", timestamp.clone())],
            &self.credentials.api_secret,
        );

        let form = Form::new()
            .text("api_key", self.credentials.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
            .part("file", file_part(file)?);

        debug!(url = %self.upload_url(), "Uploading to Cloudinary");
        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;

        if !status.is_success() {
            let message = body
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| "unknown error".to_string());
            warn!(status = status.as_u16(), %message, "Cloudinary rejected upload");
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        body.secure_url
            .ok_or_else(|| UploadError::InvalidResponse("missing secure_url".to_string()))
    }

    fn backend(&self) -> &'static str {
        "cloudinary"
    }
}
