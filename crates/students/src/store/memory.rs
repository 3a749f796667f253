//! In-memory student store

use async_trait::async_trait;
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

use crate::error::StudentsResult;
use crate::params::{SortField, SortOrder, SortParams, StudentFilter};
use crate::store::traits::{StudentQuery, StudentStore};
use crate::types::{Student, StudentId, StudentPatch};

/// In-memory student store, used when no database is configured
#[derive(Debug, Default)]
pub struct InMemoryStudentStore {
    students: RwLock<HashMap<StudentId, Student>>,
}

impl InMemoryStudentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.students.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.read().is_empty()
    }
}

/// Unset values sort after set ones in ascending order, like SQL `NULLS LAST`
fn cmp_option<T, F>(a: Option<T>, b: Option<T>, cmp: F) -> Ordering
where
    F: FnOnce(T, T) -> Ordering,
{
    match (a, b) {
        (Some(a), Some(b)) => cmp(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare(a: &Student, b: &Student, sort: &SortParams) -> Ordering {
    let ordering = match sort.field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Name => a.name.cmp(&b.name),
        SortField::Age => cmp_option(a.age, b.age, |x, y| x.cmp(&y)),
        SortField::Gender => cmp_option(a.gender, b.gender, |x, y| x.as_str().cmp(y.as_str())),
        SortField::AvgMark => cmp_option(a.avg_mark, b.avg_mark, |x, y| x.total_cmp(&y)),
        SortField::OnDuty => a.on_duty.cmp(&b.on_duty),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    };

    let ordering = match sort.order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    };

    // Stable pages for equal keys
    ordering.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl StudentStore for InMemoryStudentStore {
    async fn list(&self, query: &StudentQuery) -> StudentsResult<Vec<Student>> {
        let students = self.students.read();

        let mut matching: Vec<&Student> = students
            .values()
            .filter(|s| query.filter.matches(s))
            .collect();
        matching.sort_by(|a, b| compare(a, b, &query.sort));

        let offset = usize::try_from(query.pagination.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.pagination.limit()).unwrap_or(usize::MAX);

        Ok(matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &StudentFilter) -> StudentsResult<u64> {
        let count = self
            .students
            .read()
            .values()
            .filter(|s| filter.matches(s))
            .count();
        Ok(count as u64)
    }

    async fn get(&self, id: &StudentId) -> StudentsResult<Option<Student>> {
        Ok(self.students.read().get(id).cloned())
    }

    async fn insert(&self, student: Student) -> StudentsResult<Student> {
        debug!(id = %student.id, "Inserting student");
        self.students
            .write()
            .insert(student.id.clone(), student.clone());
        Ok(student)
    }

    async fn update(
        &self,
        id: &StudentId,
        patch: &StudentPatch,
    ) -> StudentsResult<Option<Student>> {
        let mut students = self.students.write();
        Ok(students.get_mut(id).map(|student| {
            student.apply(patch);
            student.clone()
        }))
    }

    async fn upsert(
        &self,
        student: Student,
        patch: &StudentPatch,
    ) -> StudentsResult<(Student, bool)> {
        let mut students = self.students.write();
        match students.get_mut(&student.id) {
            Some(existing) => {
                existing.apply(patch);
                Ok((existing.clone(), false))
            }
            None => {
                students.insert(student.id.clone(), student.clone());
                Ok((student, true))
            }
        }
    }

    async fn delete(&self, id: &StudentId) -> StudentsResult<bool> {
        Ok(self.students.write().remove(id).is_some())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::PaginationParams;
    use crate::types::{Gender, NewStudent};

    fn student(id: &str, name: &str, age: Option<u8>) -> Student {
        Student::new(
            StudentId::new(id),
            NewStudent {
                name: name.to_string(),
                age,
                gender: Some(Gender::Male),
                avg_mark: None,
                on_duty: false,
                photo: None,
            },
        )
    }

    async fn seeded() -> InMemoryStudentStore {
        let store = InMemoryStudentStore::new();
        store.insert(student("a", "Zed", Some(12))).await.unwrap();
        store.insert(student("b", "Amy", None)).await.unwrap();
        store.insert(student("c", "Kim", Some(8))).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_insert_get_delete() {
        let store = seeded().await;
        assert_eq!(store.len(), 3);

        let found = store.get(&StudentId::new("b")).await.unwrap().unwrap();
        assert_eq!(found.name, "Amy");

        assert!(store.delete(&StudentId::new("b")).await.unwrap());
        assert!(!store.delete(&StudentId::new("b")).await.unwrap());
        assert!(store.get(&StudentId::new("b")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_sorts_unset_last() {
        let store = seeded().await;

        let query = StudentQuery {
            sort: SortParams {
                field: SortField::Age,
                order: SortOrder::Asc,
            },
            ..Default::default()
        };
        let ids: Vec<_> = store
            .list(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id.to_string())
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);

        let query = StudentQuery {
            sort: SortParams {
                field: SortField::Name,
                order: SortOrder::Desc,
            },
            ..Default::default()
        };
        let names: Vec<_> = store
            .list(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Zed", "Kim", "Amy"]);
    }

    #[tokio::test]
    async fn test_list_paginates_after_filtering() {
        let store = seeded().await;

        let query = StudentQuery {
            filter: StudentFilter {
                min_age: Some(1),
                ..Default::default()
            },
            pagination: PaginationParams::new(2, 1),
            ..Default::default()
        };
        let page = store.list(&query).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id.as_str(), "c");
        assert_eq!(store.count(&query.filter).await.unwrap(), 2);

        let query = StudentQuery {
            pagination: PaginationParams::new(5, 10),
            ..Default::default()
        };
        assert!(store.list(&query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_upsert() {
        let store = seeded().await;
        let patch = StudentPatch {
            on_duty: Some(true),
            ..Default::default()
        };

        let updated = store.update(&StudentId::new("a"), &patch).await.unwrap();
        assert!(updated.unwrap().on_duty);
        assert!(store
            .update(&StudentId::new("missing"), &patch)
            .await
            .unwrap()
            .is_none());

        let (created, inserted) = store
            .upsert(student("d", "Lou", None), &patch)
            .await
            .unwrap();
        assert!(inserted);
        assert_eq!(created.name, "Lou");

        let (merged, inserted) = store
            .upsert(student("d", "Ignored", None), &patch)
            .await
            .unwrap();
        assert!(!inserted);
        assert_eq!(merged.name, "Lou");
        assert!(merged.on_duty);
    }
}
