//! Progress API handlers
//!
//! POST /lessons/:lesson_id/complete, GET /lessons/:lesson_id/completion,
//! GET /courses/:course_id/progress

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::context::RequestContext;
use crate::db::completions::{Completion, CompletionPayload};
use crate::error::ApiResult;
use crate::services::progress::{self, CourseProgress};
use crate::AppState;

/// POST /lessons/:lesson_id/complete
///
/// Body is optional: an empty payload marks the lesson completed; repeat
/// calls overwrite the previous report.
pub async fn mark_complete(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
    payload: Option<Json<CompletionPayload>>,
) -> ApiResult<Json<Completion>> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let completion =
        progress::mark_complete(&state.db, lesson_id, ctx.tenant_id, &ctx.caller, &payload).await?;
    Ok(Json(completion))
}

/// GET /lessons/:lesson_id/completion
pub async fn get_completion(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
) -> ApiResult<Json<Completion>> {
    let completion =
        progress::get_completion(&state.db, lesson_id, ctx.tenant_id, &ctx.caller).await?;
    Ok(Json(completion))
}

/// GET /courses/:course_id/progress
pub async fn course_progress(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> ApiResult<Json<CourseProgress>> {
    let aggregate =
        progress::course_progress(&state.db, course_id, ctx.tenant_id, &ctx.caller).await?;
    Ok(Json(aggregate))
}

/// Progress routes
pub fn progress_routes() -> Router<AppState> {
    Router::new()
        .route("/lessons/:lesson_id/complete", post(mark_complete))
        .route("/lessons/:lesson_id/completion", get(get_completion))
        .route("/courses/:course_id/progress", get(course_progress))
}
