//! Request body extractors

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use serde::de::DeserializeOwned;

use super::error::ApiError;
use crate::types::StudentPayload;
use crate::upload::UploadedFile;

/// Multipart field carrying the photo file
pub const PHOTO_FIELD: &str = "photo";

/// `Json<T>` whose rejections become [`ApiError`] envelopes
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// PATCH body: student fields plus an optional photo
///
/// Accepts `multipart/form-data` (text fields and a `photo` file part) or
/// `application/json`.
#[derive(Debug, Default)]
pub struct PatchBody {
    pub payload: StudentPayload,
    pub photo: Option<UploadedFile>,
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"))
}

async fn read_multipart(mut multipart: Multipart) -> Result<PatchBody, ApiError> {
    let mut body = PatchBody::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(file_name) = field.file_name().map(str::to_string) {
            if name != PHOTO_FIELD {
                continue;
            }
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await?;
            // Browsers send an empty part when no file was picked
            if !bytes.is_empty() {
                body.photo = Some(UploadedFile::new(file_name, content_type, bytes.to_vec()));
            }
        } else {
            let value = field.text().await?;
            body.payload.set_form_field(&name, &value)?;
        }
    }

    Ok(body)
}

async fn read_json<T, S>(req: Request, state: &S) -> Result<T, ApiError>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    let Json(value) = Json::<T>::from_request(req, state).await?;
    Ok(value)
}

#[async_trait]
impl<S> FromRequest<S> for PatchBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_multipart(&req) {
            let multipart = Multipart::from_request(req, state).await?;
            read_multipart(multipart).await
        } else {
            let payload = read_json::<StudentPayload, S>(req, state).await?;
            Ok(PatchBody {
                payload,
                photo: None,
            })
        }
    }
}
