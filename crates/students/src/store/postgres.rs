//! PostgreSQL student store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{FromRow, Postgres, QueryBuilder};
use tracing::{info, instrument};

use crate::error::{StudentsError, StudentsResult};
use crate::params::StudentFilter;
use crate::store::traits::{StudentQuery, StudentStore};
use crate::types::{Gender, Student, StudentId, StudentPatch};

/// Row shape of the `students` table
#[derive(Debug, Clone, FromRow)]
struct StudentRow {
    id: String,
    name: String,
    age: Option<i16>,
    gender: Option<String>,
    avg_mark: Option<f64>,
    on_duty: bool,
    photo: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StudentRow {
    fn into_domain(self) -> StudentsResult<Student> {
        let gender = match self.gender {
            Some(g) => Some(Gender::parse(&g).ok_or_else(|| {
                StudentsError::storage(format!("Invalid gender '{}' for student {}", g, self.id))
            })?),
            None => None,
        };
        let age = match self.age {
            Some(age) => Some(u8::try_from(age).map_err(|_| {
                StudentsError::storage(format!("Invalid age {} for student {}", age, self.id))
            })?),
            None => None,
        };

        Ok(Student {
            id: StudentId::new(self.id),
            name: self.name,
            age,
            gender,
            avg_mark: self.avg_mark,
            on_duty: self.on_duty,
            photo: self.photo,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    student: StudentRow,
    inserted: bool,
}

/// PostgreSQL student store
pub struct PostgresStudentStore {
    pool: PgPool,
}

impl PostgresStudentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect with a small pool
    pub async fn connect(database_url: &str) -> StudentsResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| StudentsError::storage(format!("Failed to connect: {}", e)))?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run the migration SQL to create tables.
    pub async fn run_migrations(&self) -> StudentsResult<()> {
        let migration_sql = include_str!("../../../../migrations/001_create_students.sql");
        sqlx::raw_sql(migration_sql)
            .execute(&self.pool)
            .await
            .map_err(|e| StudentsError::storage(format!("Migration failed: {}", e)))?;
        info!("Database migrations completed successfully");
        Ok(())
    }
}

/// Append `WHERE ...` for the filter
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &StudentFilter) {
    builder.push(" WHERE TRUE");

    if let Some(gender) = filter.gender {
        builder.push(" AND gender = ").push_bind(gender.as_str());
    }
    if let Some(min_age) = filter.min_age {
        builder.push(" AND age >= ").push_bind(i16::from(min_age));
    }
    if let Some(max_age) = filter.max_age {
        builder.push(" AND age <= ").push_bind(i16::from(max_age));
    }
    if let Some(min) = filter.min_avg_mark {
        builder.push(" AND avg_mark >= ").push_bind(min);
    }
    if let Some(max) = filter.max_avg_mark {
        builder.push(" AND avg_mark <= ").push_bind(max);
    }
    if let Some(on_duty) = filter.on_duty {
        builder.push(" AND on_duty = ").push_bind(on_duty);
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl StudentStore for PostgresStudentStore {
    #[instrument(skip(self))]
    async fn list(&self, query: &StudentQuery) -> StudentsResult<Vec<Student>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM students");
        push_filter(&mut builder, &query.filter);

        // Column and direction come from fixed allow-lists
        builder.push(format!(
            " ORDER BY {} {}, id ASC",
            query.sort.field.column(),
            query.sort.order.as_sql()
        ));
        builder
            .push(" LIMIT ")
            .push_bind(to_i64(query.pagination.limit()))
            .push(" OFFSET ")
            .push_bind(to_i64(query.pagination.offset()));

        let rows: Vec<StudentRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(StudentRow::into_domain).collect()
    }

    #[instrument(skip(self))]
    async fn count(&self, filter: &StudentFilter) -> StudentsResult<u64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM students");
        push_filter(&mut builder, filter);

        let count: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn get(&self, id: &StudentId) -> StudentsResult<Option<Student>> {
        let row = sqlx::query_as::<_, StudentRow>("SELECT * FROM students WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(StudentRow::into_domain).transpose()
    }

    async fn insert(&self, student: Student) -> StudentsResult<Student> {
        let row = sqlx::query_as::<_, StudentRow>(
            r#"
            INSERT INTO students (
                id, name, age, gender, avg_mark, on_duty, photo, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(student.id.as_str())
        .bind(&student.name)
        .bind(student.age.map(i16::from))
        .bind(student.gender.map(|g| g.as_str()))
        .bind(student.avg_mark)
        .bind(student.on_duty)
        .bind(&student.photo)
        .bind(student.created_at)
        .bind(student.updated_at)
        .fetch_one(&self.pool)
        .await?;

        row.into_domain()
    }

    async fn update(
        &self,
        id: &StudentId,
        patch: &StudentPatch,
    ) -> StudentsResult<Option<Student>> {
        let row = sqlx::query_as::<_, StudentRow>(
            r#"
            UPDATE students SET
                name = COALESCE($2, name),
                age = COALESCE($3, age),
                gender = COALESCE($4, gender),
                avg_mark = COALESCE($5, avg_mark),
                on_duty = COALESCE($6, on_duty),
                photo = COALESCE($7, photo),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_str())
        .bind(&patch.name)
        .bind(patch.age.map(i16::from))
        .bind(patch.gender.map(|g| g.as_str()))
        .bind(patch.avg_mark)
        .bind(patch.on_duty)
        .bind(&patch.photo)
        .fetch_optional(&self.pool)
        .await?;

        row.map(StudentRow::into_domain).transpose()
    }

    async fn upsert(
        &self,
        student: Student,
        patch: &StudentPatch,
    ) -> StudentsResult<(Student, bool)> {
        let row = sqlx::query_as::<_, UpsertRow>(
            r#"
            INSERT INTO students (
                id, name, age, gender, avg_mark, on_duty, photo, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                name = COALESCE($10, students.name),
                age = COALESCE($11, students.age),
                gender = COALESCE($12, students.gender),
                avg_mark = COALESCE($13, students.avg_mark),
                on_duty = COALESCE($14, students.on_duty),
                photo = COALESCE($15, students.photo),
                updated_at = NOW()
            RETURNING *, (xmax = 0) AS inserted
            "#,
        )
        .bind(student.id.as_str())
        .bind(&student.name)
        .bind(student.age.map(i16::from))
        .bind(student.gender.map(|g| g.as_str()))
        .bind(student.avg_mark)
        .bind(student.on_duty)
        .bind(&student.photo)
        .bind(student.created_at)
        .bind(student.updated_at)
        .bind(&patch.name)
        .bind(patch.age.map(i16::from))
        .bind(patch.gender.map(|g| g.as_str()))
        .bind(patch.avg_mark)
        .bind(patch.on_duty)
        .bind(&patch.photo)
        .fetch_one(&self.pool)
        .await?;

        Ok((row.student.into_domain()?, row.inserted))
    }

    async fn delete(&self, id: &StudentId) -> StudentsResult<bool> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{PaginationParams, SortField, SortOrder, SortParams};

    #[test]
    fn test_filter_sql() {
        let filter = StudentFilter {
            gender: Some(Gender::Female),
            min_age: Some(7),
            on_duty: Some(false),
            ..Default::default()
        };
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM students");
        push_filter(&mut builder, &filter);

        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM students WHERE TRUE AND gender = $1 AND age >= $2 AND on_duty = $3"
        );
    }

    #[test]
    fn test_row_into_domain_rejects_bad_gender() {
        let now = Utc::now();
        let row = StudentRow {
            id: "x".to_string(),
            name: "Ann".to_string(),
            age: Some(9),
            gender: Some("robot".to_string()),
            avg_mark: None,
            on_duty: false,
            photo: None,
            created_at: now,
            updated_at: now,
        };
        assert!(matches!(row.into_domain(), Err(StudentsError::Storage(_))));
    }

    #[test]
    fn test_sort_columns_are_allow_listed() {
        let sort = SortParams {
            field: SortField::AvgMark,
            order: SortOrder::Desc,
        };
        assert_eq!(sort.field.column(), "avg_mark");
        assert_eq!(sort.order.as_sql(), "DESC");
        assert_eq!(PaginationParams::new(3, 20).offset(), 40);
    }
}
