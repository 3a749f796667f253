//! API models for the students HTTP endpoints

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::types::StudentId;

/// Uniform `{status, message, data}` response body
///
/// `data` serializes as `null` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn new(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            data,
        }
    }

    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::OK, message, Some(data))
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::CREATED, message, Some(data))
    }

    pub fn student_not_found(id: &StudentId) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("Student with id {} not found", id),
            None,
        )
    }
}

impl Envelope<()> {
    /// Envelope with `data: null`
    pub fn empty(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, message, None)
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// `GET /` body
#[derive(Debug, Serialize, Deserialize)]
pub struct HelloResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_envelope_has_null_data() {
        let envelope = Envelope::<()>::student_not_found(&StudentId::new("doesnotexist"));
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["status"], 404);
        assert_eq!(json["message"], "Student with id doesnotexist not found");
        assert!(json["data"].is_null());
        assert!(json.as_object().unwrap().contains_key("data"));
    }

    #[test]
    fn test_envelope_status_drives_response() {
        let response = Envelope::created("Successfully created a student!", 1).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
