//! Completion record database operations
//!
//! One row per (tenant, lesson, user), written as an idempotent upsert.
//! Completion rows are never deleted; rows pointing at soft-deleted lessons
//! are simply excluded from aggregates.

use chrono::{DateTime, Utc};
use lms_common::Result;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Completion record for one user on one lesson
#[derive(Debug, Clone, Serialize)]
pub struct Completion {
    pub lesson_id: Uuid,
    pub user_id: Uuid,
    pub completed: bool,
    /// Free-form progress metadata, e.g. video watch position
    pub progress: Option<serde_json::Value>,
    pub updated_at: DateTime<Utc>,
}

impl Completion {
    /// Well-defined "not started" default returned when no record exists.
    /// Absence of progress is a valid state, not an error.
    pub fn not_started(lesson_id: Uuid, user_id: Uuid) -> Self {
        Self {
            lesson_id,
            user_id,
            completed: false,
            progress: None,
            updated_at: Utc::now(),
        }
    }
}

/// Progress payload reported by the caller. A bare report (no body, empty
/// object) means "completed".
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionPayload {
    #[serde(default = "default_completed")]
    pub completed: bool,
    #[serde(default)]
    pub progress: Option<serde_json::Value>,
}

impl Default for CompletionPayload {
    fn default() -> Self {
        Self {
            completed: true,
            progress: None,
        }
    }
}

fn default_completed() -> bool {
    true
}

/// Upsert the completion record. Last write wins on all payload fields;
/// calling twice never produces a second row.
pub async fn upsert_completion(
    pool: &SqlitePool,
    lesson_id: Uuid,
    user_id: Uuid,
    tenant_id: Uuid,
    payload: &CompletionPayload,
) -> Result<Completion> {
    let progress_json = payload
        .progress
        .as_ref()
        .map(|p| p.to_string());
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO completions (tenant_id, lesson_id, user_id, completed, progress, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(tenant_id, lesson_id, user_id) DO UPDATE SET
            completed = excluded.completed,
            progress = excluded.progress,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(tenant_id.to_string())
    .bind(lesson_id.to_string())
    .bind(user_id.to_string())
    .bind(payload.completed)
    .bind(&progress_json)
    .bind(now.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(Completion {
        lesson_id,
        user_id,
        completed: payload.completed,
        progress: payload.progress.clone(),
        updated_at: now,
    })
}

/// Load the completion record, if the user has reported any progress
pub async fn load_completion(
    pool: &SqlitePool,
    lesson_id: Uuid,
    user_id: Uuid,
    tenant_id: Uuid,
) -> Result<Option<Completion>> {
    let row = sqlx::query(
        r#"
        SELECT completed, progress, updated_at FROM completions
        WHERE tenant_id = ? AND lesson_id = ? AND user_id = ?
        "#,
    )
    .bind(tenant_id.to_string())
    .bind(lesson_id.to_string())
    .bind(user_id.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let completed: i64 = row.get("completed");
            let progress_str: Option<String> = row.get("progress");
            let updated_str: String = row.get("updated_at");
            Ok(Some(Completion {
                lesson_id,
                user_id,
                completed: completed != 0,
                progress: progress_str.and_then(|s| serde_json::from_str(&s).ok()),
                updated_at: DateTime::parse_from_rfc3339(&updated_str)
                    .map(|t| t.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            }))
        }
        None => Ok(None),
    }
}

/// Count non-deleted published lessons of the course, and how many of them
/// the user has completed. The aggregate's two inputs come from one place so
/// they can never disagree about which lessons count.
pub async fn course_completion_counts(
    pool: &SqlitePool,
    course_id: Uuid,
    user_id: Uuid,
    tenant_id: Uuid,
) -> Result<(i64, i64)> {
    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM lessons
        WHERE course_id = ? AND tenant_id = ? AND state = 'published'
        "#,
    )
    .bind(course_id.to_string())
    .bind(tenant_id.to_string())
    .fetch_one(pool)
    .await?;

    let completed: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM completions c
        JOIN lessons l ON l.guid = c.lesson_id AND l.tenant_id = c.tenant_id
        WHERE l.course_id = ? AND c.tenant_id = ? AND c.user_id = ?
          AND c.completed = 1 AND l.state = 'published'
        "#,
    )
    .bind(course_id.to_string())
    .bind(tenant_id.to_string())
    .bind(user_id.to_string())
    .fetch_one(pool)
    .await?;

    Ok((completed, total))
}
