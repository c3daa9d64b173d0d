//! Access guard helpers
//!
//! Visibility and tenant checks applied before any lesson data is handed to
//! a caller. Cross-tenant rows and invisible drafts are both reported as
//! NotFound so a probing caller learns nothing either way.

use lms_common::auth::{Caller, Capability};
use lms_common::{Error, Result};
use uuid::Uuid;

use crate::db::lessons::{Lesson, LessonState};

/// Resolve an optionally-loaded lesson row against the caller's scope.
///
/// Three failure modes collapse into one NotFound: the row belongs to a
/// different tenant than the session, the row is soft-deleted, or the row is
/// a draft and the caller lacks the view-drafts capability. A probing caller
/// cannot tell these apart from a truly absent lesson, and a tenant mismatch
/// is never reported as Forbidden.
pub fn visible_lesson(
    lesson: Option<Lesson>,
    lesson_id: Uuid,
    session_tenant: Uuid,
    caller: &Caller,
) -> Result<Lesson> {
    let not_found = || Error::NotFound(format!("Lesson not found: {}", lesson_id));

    let lesson = lesson.ok_or_else(not_found)?;
    if lesson.tenant_id != session_tenant {
        return Err(not_found());
    }
    match lesson.state {
        LessonState::Published => Ok(lesson),
        LessonState::Draft if caller.can(Capability::ViewDrafts) => Ok(lesson),
        LessonState::Draft => Err(not_found()),
        LessonState::Deleted => Err(not_found()),
    }
}
