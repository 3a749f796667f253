//! API handlers for the students HTTP endpoints
//!
//! Each handler makes exactly one service call (PATCH may upload a photo
//! first) and maps the outcome to an [`Envelope`].

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::collections::HashMap;
use tracing::info;

use super::error::ApiError;
use super::extract::{ApiJson, PatchBody};
use super::models::{Envelope, HelloResponse};
use super::AppState;
use crate::params::{parse_filter_params, parse_pagination_params, parse_sort_params};
use crate::service::{StudentPage, UpdateOptions};
use crate::types::{Student, StudentId, StudentPayload};

type ApiResult<T> = Result<T, ApiError>;

/// `GET /`
pub async fn hello() -> Json<HelloResponse> {
    Json(HelloResponse {
        message: "Hello, World!".to_string(),
    })
}

/// `GET /students`
pub async fn list_students(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Envelope<StudentPage>> {
    let page = state
        .service
        .list_students(
            parse_pagination_params(&query),
            parse_sort_params(&query),
            parse_filter_params(&query),
        )
        .await?;

    Ok(Envelope::ok("Successfully found students!", page))
}

/// `GET /students/:id`
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<Student>> {
    let id = StudentId::from(id);

    Ok(match state.service.get_student_by_id(&id).await? {
        Some(student) => Envelope::ok(
            format!("Successfully found student with id {}!", id),
            student,
        ),
        None => Envelope::student_not_found(&id),
    })
}

/// `POST /students`
pub async fn create_student(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<StudentPayload>,
) -> ApiResult<Envelope<Student>> {
    let student = state.service.create_student(payload).await?;
    Ok(Envelope::created("Successfully created a student!", student))
}

/// `PUT /students/:id`, 201 when the student was created
pub async fn upsert_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<StudentPayload>,
) -> ApiResult<Envelope<Student>> {
    let id = StudentId::from(id);

    Ok(
        match state
            .service
            .update_student(&id, payload, UpdateOptions::upsert())
            .await?
        {
            Some(result) => {
                let status = if result.is_new {
                    StatusCode::CREATED
                } else {
                    StatusCode::OK
                };
                Envelope::new(status, "Successfully upserted a student!", Some(result.student))
            }
            None => Envelope::student_not_found(&id),
        },
    )
}

/// `PATCH /students/:id`, multipart or JSON
///
/// The payload is validated, then an attached photo is uploaded and its
/// URL stored in `photo`. A failed update does not remove the uploaded file.
pub async fn patch_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: PatchBody,
) -> ApiResult<Envelope<Student>> {
    let id = StudentId::from(id);
    let PatchBody { mut payload, photo } = body;

    if let Some(file) = photo {
        payload.validate()?;
        let backend = state.uploader.backend();
        let url = state
            .uploader
            .store(file)
            .await
            .map_err(|e| ApiError::Internal(format!("Photo upload failed: {}", e)))?;
        state.metrics.record_upload(backend);
        info!(%id, backend, %url, "Photo uploaded");
        payload.photo = Some(url);
    }

    Ok(
        match state
            .service
            .update_student(&id, payload, UpdateOptions::default())
            .await?
        {
            Some(result) => Envelope::ok("Successfully patched a student!", result.student),
            None => Envelope::student_not_found(&id),
        },
    )
}

/// `DELETE /students/:id`, 204 with an empty body
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id = StudentId::from(id);

    if state.service.delete_student(&id).await? {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Ok(Envelope::<()>::student_not_found(&id).into_response())
    }
}
