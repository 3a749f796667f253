//! StudentStore trait definition

use async_trait::async_trait;

use crate::error::StudentsResult;
use crate::params::{PaginationParams, SortParams, StudentFilter};
use crate::types::{Student, StudentId, StudentPatch};

/// One page of a filtered, sorted listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentQuery {
    pub filter: StudentFilter,
    pub sort: SortParams,
    pub pagination: PaginationParams,
}

impl StudentQuery {
    pub fn new(pagination: PaginationParams, sort: SortParams, filter: StudentFilter) -> Self {
        Self {
            filter,
            sort,
            pagination,
        }
    }
}

/// StudentStore trait - the interface for student storage
///
/// Implementations (in-memory, PostgreSQL) can be swapped without changing
/// the service. Absence is reported through `Option`/`bool`, never as an
/// error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Apply filter, then sort, then the pagination window
    async fn list(&self, query: &StudentQuery) -> StudentsResult<Vec<Student>>;

    /// Count students matching the filter
    async fn count(&self, filter: &StudentFilter) -> StudentsResult<u64>;

    /// Get a student by ID
    async fn get(&self, id: &StudentId) -> StudentsResult<Option<Student>>;

    /// Insert a new student
    async fn insert(&self, student: Student) -> StudentsResult<Student>;

    /// Merge `patch` into an existing student
    ///
    /// # Returns
    /// The updated student, or `None` if no student has this ID
    async fn update(&self, id: &StudentId, patch: &StudentPatch)
        -> StudentsResult<Option<Student>>;

    /// Insert `student`, or merge `patch` into the existing record with the
    /// same ID, atomically
    ///
    /// # Returns
    /// The resulting student and `true` if it was inserted
    async fn upsert(&self, student: Student, patch: &StudentPatch)
        -> StudentsResult<(Student, bool)>;

    /// Delete a student
    ///
    /// # Returns
    /// `true` if a student was removed
    async fn delete(&self, id: &StudentId) -> StudentsResult<bool>;

    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;
}
