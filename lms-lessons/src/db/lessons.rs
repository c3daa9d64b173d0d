//! Lesson database operations
//!
//! Lessons are soft-deleted only: deleted rows keep their guid and their last
//! ordinal position so completion records never dangle. The ordinal positions
//! of non-deleted lessons within a (tenant, course) always form 1..N; every
//! mutation that can affect ordering runs inside a transaction holding the
//! course row lock (see [`crate::db::courses::lock_course`]).

use chrono::{DateTime, Utc};
use lms_common::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::courses;

/// Lesson lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonState {
    Draft,
    Published,
    Deleted,
}

impl LessonState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LessonState::Draft => "draft",
            LessonState::Published => "published",
            LessonState::Deleted => "deleted",
        }
    }
}

impl std::str::FromStr for LessonState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "draft" => Ok(LessonState::Draft),
            "published" => Ok(LessonState::Published),
            "deleted" => Ok(LessonState::Deleted),
            other => Err(Error::Internal(format!("Unknown lesson state: {}", other))),
        }
    }
}

/// Lesson record
#[derive(Debug, Clone, Serialize)]
pub struct Lesson {
    pub guid: Uuid,
    pub tenant_id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub content_ref: Option<String>,
    pub position: i64,
    pub state: LessonState,
    pub media_id: Option<String>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Attributes for lesson creation
#[derive(Debug, Clone, Deserialize)]
pub struct NewLesson {
    pub title: String,
    #[serde(default)]
    pub content_ref: Option<String>,
    /// Initial state; drafts by default. Deleted is not creatable.
    #[serde(default)]
    pub state: Option<LessonState>,
}

/// Partial update of mutable lesson attributes.
///
/// Ordinal position is deliberately absent: reordering is the reorder
/// operation's exclusive responsibility. Tenant and course are immutable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LessonUpdate {
    pub title: Option<String>,
    pub content_ref: Option<String>,
    pub state: Option<LessonState>,
}

/// Page request, clamped to sane bounds at use
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Page {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self { page: 1, page_size: 50 }
    }
}

impl Page {
    pub const MAX_PAGE_SIZE: u32 = 100;

    /// Clamp to page >= 1 and 1 <= page_size <= 100
    pub fn clamped(self) -> Self {
        Self {
            page: self.page.max(1),
            page_size: self.page_size.clamp(1, Self::MAX_PAGE_SIZE),
        }
    }

    fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.page_size as i64
    }
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn row_to_lesson(row: &SqliteRow) -> Result<Lesson> {
    let guid_str: String = row.get("guid");
    let tenant_str: String = row.get("tenant_id");
    let course_str: String = row.get("course_id");
    let state_str: String = row.get("state");
    let created_str: String = row.get("created_at");
    let updated_str: String = row.get("updated_at");

    Ok(Lesson {
        guid: Uuid::parse_str(&guid_str)
            .map_err(|e| Error::Internal(format!("Corrupt lesson guid: {}", e)))?,
        tenant_id: Uuid::parse_str(&tenant_str)
            .map_err(|e| Error::Internal(format!("Corrupt tenant id: {}", e)))?,
        course_id: Uuid::parse_str(&course_str)
            .map_err(|e| Error::Internal(format!("Corrupt course id: {}", e)))?,
        title: row.get("title"),
        content_ref: row.get("content_ref"),
        position: row.get("position"),
        state: state_str.parse()?,
        media_id: row.get("media_id"),
        video_url: row.get("video_url"),
        created_at: parse_timestamp(&created_str),
        updated_at: parse_timestamp(&updated_str),
    })
}

const LESSON_COLUMNS: &str = "guid, tenant_id, course_id, title, content_ref, position, \
                              state, media_id, video_url, created_at, updated_at";

/// Load a lesson row by id, regardless of tenant or lifecycle state.
///
/// Raw row access: callers go through [`crate::access::visible_lesson`],
/// which folds cross-tenant rows, soft-deleted rows, and invisible drafts
/// into one indistinguishable NotFound.
pub async fn load_lesson(pool: &SqlitePool, lesson_id: Uuid) -> Result<Option<Lesson>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM lessons WHERE guid = ?",
        LESSON_COLUMNS
    ))
    .bind(lesson_id.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(row_to_lesson(&row)?)),
        None => Ok(None),
    }
}

/// List non-deleted lessons of a course, ordered by position ascending.
///
/// Returns the page plus the total matching count for pagination UI. Rank in
/// the output is contiguous even when soft deletions have left gaps in the
/// raw ordinals. `include_drafts` is false for callers without the
/// view-drafts capability.
pub async fn list_by_course(
    pool: &SqlitePool,
    course_id: Uuid,
    tenant_id: Uuid,
    include_drafts: bool,
    page: Page,
) -> Result<(Vec<Lesson>, i64)> {
    let page = page.clamped();
    let state_filter = if include_drafts {
        "state != 'deleted'"
    } else {
        "state = 'published'"
    };

    let total: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM lessons WHERE course_id = ? AND tenant_id = ? AND {}",
        state_filter
    ))
    .bind(course_id.to_string())
    .bind(tenant_id.to_string())
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query(&format!(
        "SELECT {} FROM lessons WHERE course_id = ? AND tenant_id = ? AND {} \
         ORDER BY position ASC LIMIT ? OFFSET ?",
        LESSON_COLUMNS, state_filter
    ))
    .bind(course_id.to_string())
    .bind(tenant_id.to_string())
    .bind(page.page_size as i64)
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let lessons = rows.iter().map(row_to_lesson).collect::<Result<Vec<_>>>()?;
    Ok((lessons, total))
}

/// Create a lesson at the end of the course's sequence.
///
/// Runs inside a transaction holding the course lock so two concurrent
/// creates cannot read the same max position. The course lock also validates
/// that the course belongs to the tenant.
pub async fn create_lesson(
    pool: &SqlitePool,
    course_id: Uuid,
    tenant_id: Uuid,
    attrs: NewLesson,
) -> Result<Lesson> {
    let state = match attrs.state {
        None => LessonState::Draft,
        Some(LessonState::Deleted) => {
            return Err(Error::InvalidInput(
                "Cannot create a lesson in deleted state".to_string(),
            ))
        }
        Some(state) => state,
    };

    let mut tx = pool.begin().await?;
    courses::lock_course(&mut tx, course_id, tenant_id).await?;

    let max_position: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(MAX(position), 0) FROM lessons
        WHERE course_id = ? AND tenant_id = ? AND state != 'deleted'
        "#,
    )
    .bind(course_id.to_string())
    .bind(tenant_id.to_string())
    .fetch_one(&mut *tx)
    .await?;

    let now = Utc::now();
    let lesson = Lesson {
        guid: Uuid::new_v4(),
        tenant_id,
        course_id,
        title: attrs.title,
        content_ref: attrs.content_ref,
        position: max_position + 1,
        state,
        media_id: None,
        video_url: None,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO lessons (
            guid, tenant_id, course_id, title, content_ref, position, state,
            media_id, video_url, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, NULL, NULL, ?, ?)
        "#,
    )
    .bind(lesson.guid.to_string())
    .bind(lesson.tenant_id.to_string())
    .bind(lesson.course_id.to_string())
    .bind(&lesson.title)
    .bind(&lesson.content_ref)
    .bind(lesson.position)
    .bind(lesson.state.as_str())
    .bind(lesson.created_at.to_rfc3339())
    .bind(lesson.updated_at.to_rfc3339())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        lesson_id = %lesson.guid,
        course_id = %course_id,
        position = lesson.position,
        "Lesson created"
    );

    Ok(lesson)
}

/// Partial update of mutable attributes (title, content, draft/published
/// state). Absent fields are left untouched.
pub async fn update_lesson(
    pool: &SqlitePool,
    lesson_id: Uuid,
    tenant_id: Uuid,
    update: LessonUpdate,
) -> Result<Lesson> {
    if update.state == Some(LessonState::Deleted) {
        return Err(Error::InvalidInput(
            "Use delete to remove a lesson, not a state update".to_string(),
        ));
    }

    let result = sqlx::query(
        r#"
        UPDATE lessons SET
            title = COALESCE(?, title),
            content_ref = COALESCE(?, content_ref),
            state = COALESCE(?, state),
            updated_at = ?
        WHERE guid = ? AND tenant_id = ? AND state != 'deleted'
        "#,
    )
    .bind(&update.title)
    .bind(&update.content_ref)
    .bind(update.state.map(|s| s.as_str()))
    .bind(Utc::now().to_rfc3339())
    .bind(lesson_id.to_string())
    .bind(tenant_id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Lesson not found: {}", lesson_id)));
    }

    load_lesson(pool, lesson_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Lesson not found: {}", lesson_id)))
}

/// Soft-delete a lesson.
///
/// The row is kept, state flips to deleted, and surviving lessons keep their
/// positions; the resulting ordinal gap is tolerated at rest. Runs under the
/// course lock so it cannot interleave with a reorder reading the live set.
pub async fn soft_delete_lesson(pool: &SqlitePool, lesson_id: Uuid, tenant_id: Uuid) -> Result<()> {
    let lesson = load_lesson(pool, lesson_id)
        .await?
        .filter(|l| l.tenant_id == tenant_id && l.state != LessonState::Deleted)
        .ok_or_else(|| Error::NotFound(format!("Lesson not found: {}", lesson_id)))?;

    let mut tx = pool.begin().await?;
    courses::lock_course(&mut tx, lesson.course_id, tenant_id).await?;

    let result = sqlx::query(
        r#"
        UPDATE lessons SET state = 'deleted', updated_at = ?
        WHERE guid = ? AND tenant_id = ? AND state != 'deleted'
        "#,
    )
    .bind(Utc::now().to_rfc3339())
    .bind(lesson_id.to_string())
    .bind(tenant_id.to_string())
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        // Deleted concurrently between the load and the lock
        return Err(Error::NotFound(format!("Lesson not found: {}", lesson_id)));
    }

    tx.commit().await?;

    tracing::info!(lesson_id = %lesson_id, course_id = %lesson.course_id, "Lesson soft-deleted");

    Ok(())
}

/// Bind (or replace) the media attachment on a lesson row.
///
/// Fails with NotFound if the lesson is gone or soft-deleted; the media
/// binder uses that to trigger compensation for the already-uploaded asset.
pub async fn set_lesson_media(
    pool: &SqlitePool,
    lesson_id: Uuid,
    tenant_id: Uuid,
    media_id: &str,
    video_url: &str,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE lessons SET media_id = ?, video_url = ?, updated_at = ?
        WHERE guid = ? AND tenant_id = ? AND state != 'deleted'
        "#,
    )
    .bind(media_id)
    .bind(video_url)
    .bind(Utc::now().to_rfc3339())
    .bind(lesson_id.to_string())
    .bind(tenant_id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Lesson not found: {}", lesson_id)));
    }

    Ok(())
}
