//! Progress tracking and the derived course aggregate
//!
//! The course aggregate is computed at query time from the lesson and
//! completion tables; nothing is cached, so it cannot go stale.

use lms_common::auth::{Caller, Capability};
use lms_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::access;
use crate::db::completions::{self, Completion, CompletionPayload};
use crate::db::{courses, lessons};

/// Course-level progress for one user, derived on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CourseProgress {
    pub completed_count: i64,
    pub total_count: i64,
    /// Rounded to the nearest integer, 0.5 rounding up
    pub percentage: i64,
}

/// Record progress on a lesson for the calling user.
///
/// Upserts the (tenant, lesson, user) record; a repeat call overwrites the
/// payload rather than inserting a second row. The lesson must exist, be
/// visible to the caller, and belong to the tenant, else NotFound.
pub async fn mark_complete(
    pool: &SqlitePool,
    lesson_id: Uuid,
    tenant_id: Uuid,
    caller: &Caller,
    payload: &CompletionPayload,
) -> Result<Completion> {
    let user_id = caller.require_user(Capability::ReportProgress)?;

    let lesson = lessons::load_lesson(pool, lesson_id).await?;
    access::visible_lesson(lesson, lesson_id, tenant_id, caller)?;

    let completion = completions::upsert_completion(pool, lesson_id, user_id, tenant_id, payload).await?;

    tracing::debug!(
        lesson_id = %lesson_id,
        user_id = %user_id,
        completed = completion.completed,
        "Completion recorded"
    );

    Ok(completion)
}

/// Fetch the caller's completion state for a lesson.
///
/// Absence of progress is a valid state: a missing record comes back as the
/// "not started" default, not an error.
pub async fn get_completion(
    pool: &SqlitePool,
    lesson_id: Uuid,
    tenant_id: Uuid,
    caller: &Caller,
) -> Result<Completion> {
    let user_id = caller.require_user(Capability::ReportProgress)?;

    let lesson = lessons::load_lesson(pool, lesson_id).await?;
    access::visible_lesson(lesson, lesson_id, tenant_id, caller)?;

    Ok(completions::load_completion(pool, lesson_id, user_id, tenant_id)
        .await?
        .unwrap_or_else(|| Completion::not_started(lesson_id, user_id)))
}

/// Aggregate progress across a course's published, non-deleted lessons.
///
/// Zero published lessons yields (0, 0, 0) rather than a division fault.
/// A course that is absent or belongs to another tenant is NotFound.
pub async fn course_progress(
    pool: &SqlitePool,
    course_id: Uuid,
    tenant_id: Uuid,
    caller: &Caller,
) -> Result<CourseProgress> {
    let user_id = caller.require_user(Capability::ReportProgress)?;

    courses::load_course(pool, course_id, tenant_id)
        .await?
        .ok_or_else(|| lms_common::Error::NotFound(format!("Course not found: {}", course_id)))?;

    let (completed_count, total_count) =
        completions::course_completion_counts(pool, course_id, user_id, tenant_id).await?;

    Ok(CourseProgress {
        completed_count,
        total_count,
        percentage: percentage(completed_count, total_count),
    })
}

/// Integer percentage with half-up rounding for determinism
fn percentage(completed: i64, total: i64) -> i64 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as i64
}
