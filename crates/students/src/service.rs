//! Student data-access service
//!
//! Validates payloads and delegates to a [`StudentStore`]. The service keeps
//! no state of its own between calls.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::error::StudentsResult;
use crate::params::{PaginationParams, SortParams, StudentFilter};
use crate::store::{StudentQuery, StudentStore};
use crate::types::{Student, StudentId, StudentPayload};

/// A page of students plus pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPage {
    pub data: Vec<Student>,
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl StudentPage {
    pub fn new(data: Vec<Student>, pagination: PaginationParams, total_items: u64) -> Self {
        let per_page = u64::from(pagination.per_page.max(1));
        let total_pages = total_items.div_ceil(per_page);
        let page = u64::from(pagination.page);

        Self {
            data,
            page: pagination.page,
            per_page: pagination.per_page,
            total_items,
            total_pages,
            has_previous_page: page > 1,
            has_next_page: page < total_pages,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Create the student when the ID does not exist
    pub upsert: bool,
}

impl UpdateOptions {
    pub fn upsert() -> Self {
        Self { upsert: true }
    }
}

/// Outcome of [`StudentsService::update_student`]
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertResult {
    pub student: Student,
    pub is_new: bool,
}

pub struct StudentsService {
    store: Arc<dyn StudentStore>,
}

impl StudentsService {
    pub fn new(store: Arc<dyn StudentStore>) -> Self {
        Self { store }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    #[instrument(skip(self))]
    pub async fn list_students(
        &self,
        pagination: PaginationParams,
        sort: SortParams,
        filter: StudentFilter,
    ) -> StudentsResult<StudentPage> {
        let query = StudentQuery::new(pagination, sort, filter);
        let (data, total_items) =
            tokio::try_join!(self.store.list(&query), self.store.count(&query.filter))?;

        debug!(returned = data.len(), total_items, "Listed students");
        Ok(StudentPage::new(data, pagination, total_items))
    }

    #[instrument(skip(self))]
    pub async fn get_student_by_id(&self, id: &StudentId) -> StudentsResult<Option<Student>> {
        self.store.get(id).await
    }

    #[instrument(skip(self, payload))]
    pub async fn create_student(&self, payload: StudentPayload) -> StudentsResult<Student> {
        let fields = payload.into_patch()?.into_new_student()?;
        let student = self
            .store
            .insert(Student::new(StudentId::generate(), fields))
            .await?;

        info!(id = %student.id, "Student created");
        Ok(student)
    }

    /// Merge `payload` into the student with `id`.
    ///
    /// Returns `None` when the student does not exist and `options.upsert`
    /// is off. With upsert on, a missing student is created from the
    /// payload, which must then satisfy the create rules.
    #[instrument(skip(self, payload))]
    pub async fn update_student(
        &self,
        id: &StudentId,
        payload: StudentPayload,
        options: UpdateOptions,
    ) -> StudentsResult<Option<UpsertResult>> {
        let patch = payload.into_patch()?;

        if let Some(student) = self.store.update(id, &patch).await? {
            debug!(%id, "Student updated");
            return Ok(Some(UpsertResult {
                student,
                is_new: false,
            }));
        }

        if !options.upsert {
            return Ok(None);
        }

        let fields = patch.clone().into_new_student()?;
        let (student, is_new) = self
            .store
            .upsert(Student::new(id.clone(), fields), &patch)
            .await?;

        info!(%id, is_new, "Student upserted");
        Ok(Some(UpsertResult { student, is_new }))
    }

    #[instrument(skip(self))]
    pub async fn delete_student(&self, id: &StudentId) -> StudentsResult<bool> {
        let deleted = self.store.delete(id).await?;
        if deleted {
            info!(%id, "Student deleted");
        }
        Ok(deleted)
    }
}
