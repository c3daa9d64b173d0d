//! Atomic lesson reordering
//!
//! The caller submits the complete desired sequence for a course. The new
//! ordinals are applied in one transaction under the course lock, so a
//! concurrent reader sees either the old sequence or the new one, never a
//! mixture, and two concurrent reorders serialize with the later commit
//! winning entirely.

use lms_common::{Error, Result};
use sqlx::SqlitePool;
use std::collections::HashSet;
use uuid::Uuid;

use crate::db::courses;

/// Renumber a course's non-deleted lessons to 1..N following `ordered_ids`.
///
/// The submitted set must exactly equal the current non-deleted lesson set
/// for the course: any omission, addition, duplicate, or foreign id fails
/// with Conflict and leaves every ordinal unchanged.
pub async fn reorder_lessons(
    pool: &SqlitePool,
    course_id: Uuid,
    tenant_id: Uuid,
    ordered_ids: &[Uuid],
) -> Result<()> {
    let mut tx = pool.begin().await?;
    courses::lock_course(&mut tx, course_id, tenant_id).await?;

    let current_rows: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT guid FROM lessons
        WHERE course_id = ? AND tenant_id = ? AND state != 'deleted'
        "#,
    )
    .bind(course_id.to_string())
    .bind(tenant_id.to_string())
    .fetch_all(&mut *tx)
    .await?;

    let current: HashSet<Uuid> = current_rows
        .iter()
        .map(|s| Uuid::parse_str(s).map_err(|e| Error::Internal(format!("Corrupt lesson guid: {}", e))))
        .collect::<Result<_>>()?;

    let submitted: HashSet<Uuid> = ordered_ids.iter().copied().collect();
    if submitted.len() != ordered_ids.len() {
        return Err(Error::Conflict(
            "Reorder list contains duplicate lesson ids".to_string(),
        ));
    }
    if submitted != current {
        return Err(Error::Conflict(format!(
            "Reorder list does not match the course's current lessons \
             (submitted {}, current {})",
            submitted.len(),
            current.len()
        )));
    }

    let now = chrono::Utc::now().to_rfc3339();
    for (index, lesson_id) in ordered_ids.iter().enumerate() {
        sqlx::query(
            r#"
            UPDATE lessons SET position = ?, updated_at = ?
            WHERE guid = ? AND tenant_id = ?
            "#,
        )
        .bind(index as i64 + 1)
        .bind(&now)
        .bind(lesson_id.to_string())
        .bind(tenant_id.to_string())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        course_id = %course_id,
        lesson_count = ordered_ids.len(),
        "Course lessons reordered"
    );

    Ok(())
}
