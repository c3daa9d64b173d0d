//! Course database operations
//!
//! Courses are owned by the course-catalog service; this crate keeps the
//! minimal record it needs to validate tenant ownership and to serialize
//! ordering mutations per course.

use chrono::{DateTime, Utc};
use lms_common::{Error, Result};
use sqlx::{Row, SqlitePool, Transaction};
use uuid::Uuid;

/// Course record
#[derive(Debug, Clone)]
pub struct Course {
    pub guid: Uuid,
    pub tenant_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl Course {
    pub fn new(tenant_id: Uuid, title: String) -> Self {
        Self {
            guid: Uuid::new_v4(),
            tenant_id,
            title,
            created_at: Utc::now(),
        }
    }
}

/// Save course to database
pub async fn save_course(pool: &SqlitePool, course: &Course) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO courses (guid, tenant_id, title, created_at, updated_at)
        VALUES (?, ?, ?, ?, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(course.guid.to_string())
    .bind(course.tenant_id.to_string())
    .bind(&course.title)
    .bind(course.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load course by id, tenant-scoped
pub async fn load_course(pool: &SqlitePool, course_id: Uuid, tenant_id: Uuid) -> Result<Option<Course>> {
    let row = sqlx::query(
        r#"
        SELECT guid, tenant_id, title, created_at
        FROM courses
        WHERE guid = ? AND tenant_id = ?
        "#,
    )
    .bind(course_id.to_string())
    .bind(tenant_id.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let guid_str: String = row.get("guid");
            let tenant_str: String = row.get("tenant_id");
            let created_str: String = row.get("created_at");
            Ok(Some(Course {
                guid: Uuid::parse_str(&guid_str)
                    .map_err(|e| Error::Internal(format!("Corrupt course guid: {}", e)))?,
                tenant_id: Uuid::parse_str(&tenant_str)
                    .map_err(|e| Error::Internal(format!("Corrupt tenant id: {}", e)))?,
                title: row.get("title"),
                created_at: DateTime::parse_from_rfc3339(&created_str)
                    .map(|t| t.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            }))
        }
        None => Ok(None),
    }
}

/// Take the per-course write lock inside an open transaction.
///
/// Ordering mutations (create, reorder, soft delete) write the owning course
/// row first; under SQLite this promotes the transaction to a writer before
/// any positions are read, so two ordering mutations on the same course can
/// never interleave. Doubles as the tenant-ownership check: a course that is
/// absent or belongs to another tenant yields NotFound, never Forbidden.
pub async fn lock_course(
    tx: &mut Transaction<'_, sqlx::Sqlite>,
    course_id: Uuid,
    tenant_id: Uuid,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE courses SET updated_at = CURRENT_TIMESTAMP
        WHERE guid = ? AND tenant_id = ?
        "#,
    )
    .bind(course_id.to_string())
    .bind(tenant_id.to_string())
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Course not found: {}", course_id)));
    }

    Ok(())
}
