//! Lesson CRUD and reorder API handlers
//!
//! POST /courses, GET/POST /courses/:course_id/lessons,
//! PUT /courses/:course_id/lessons/order,
//! GET/PATCH/DELETE /lessons/:lesson_id

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use lms_common::auth::Capability;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::context::RequestContext;
use crate::db::courses::{self, Course};
use crate::db::lessons::{self, Lesson, LessonUpdate, NewLesson, Page};
use crate::error::ApiResult;
use crate::services::reorder;
use crate::{access, AppState};

/// POST /courses request
#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
}

/// POST /courses response
#[derive(Debug, Serialize)]
pub struct CourseResponse {
    pub course_id: Uuid,
    pub title: String,
}

/// GET /courses/:course_id/lessons query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// GET /courses/:course_id/lessons response
#[derive(Debug, Serialize)]
pub struct LessonListResponse {
    pub lessons: Vec<Lesson>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

/// PUT /courses/:course_id/lessons/order request
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub lesson_ids: Vec<Uuid>,
}

/// POST /courses
///
/// Minimal course creation so lessons have an owner row; the full course
/// catalog lives in its own service.
pub async fn create_course(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(request): Json<CreateCourseRequest>,
) -> ApiResult<(StatusCode, Json<CourseResponse>)> {
    ctx.caller.require(Capability::ManageLessons)?;

    if request.title.trim().is_empty() {
        return Err(lms_common::Error::InvalidInput("Course title must not be empty".to_string()).into());
    }

    let course = Course::new(ctx.tenant_id, request.title);
    courses::save_course(&state.db, &course).await?;

    Ok((
        StatusCode::CREATED,
        Json(CourseResponse {
            course_id: course.guid,
            title: course.title,
        }),
    ))
}

/// POST /courses/:course_id/lessons
pub async fn create_lesson(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(request): Json<NewLesson>,
) -> ApiResult<(StatusCode, Json<Lesson>)> {
    ctx.caller.require(Capability::ManageLessons)?;

    if request.title.trim().is_empty() {
        return Err(lms_common::Error::InvalidInput("Lesson title must not be empty".to_string()).into());
    }

    let lesson = lessons::create_lesson(&state.db, course_id, ctx.tenant_id, request).await?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

/// GET /courses/:course_id/lessons
pub async fn list_lessons(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<LessonListResponse>> {
    let default = Page::default();
    let page = Page {
        page: query.page.unwrap_or(default.page),
        page_size: query.page_size.unwrap_or(default.page_size),
    }
    .clamped();

    let include_drafts = ctx.caller.can(Capability::ViewDrafts);
    let (lessons, total) =
        lessons::list_by_course(&state.db, course_id, ctx.tenant_id, include_drafts, page).await?;

    Ok(Json(LessonListResponse {
        lessons,
        total,
        page: page.page,
        page_size: page.page_size,
    }))
}

/// PUT /courses/:course_id/lessons/order
pub async fn reorder_lessons(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(request): Json<ReorderRequest>,
) -> ApiResult<StatusCode> {
    ctx.caller.require(Capability::ManageLessons)?;

    reorder::reorder_lessons(&state.db, course_id, ctx.tenant_id, &request.lesson_ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /lessons/:lesson_id
pub async fn get_lesson(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
) -> ApiResult<Json<Lesson>> {
    let lesson = lessons::load_lesson(&state.db, lesson_id).await?;
    let lesson = access::visible_lesson(lesson, lesson_id, ctx.tenant_id, &ctx.caller)?;
    Ok(Json(lesson))
}

/// PATCH /lessons/:lesson_id
pub async fn update_lesson(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
    Json(update): Json<LessonUpdate>,
) -> ApiResult<Json<Lesson>> {
    ctx.caller.require(Capability::ManageLessons)?;

    let lesson = lessons::update_lesson(&state.db, lesson_id, ctx.tenant_id, update).await?;
    Ok(Json(lesson))
}

/// DELETE /lessons/:lesson_id
pub async fn delete_lesson(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    ctx.caller.require(Capability::ManageLessons)?;

    lessons::soft_delete_lesson(&state.db, lesson_id, ctx.tenant_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Lesson and course routes
pub fn lesson_routes() -> Router<AppState> {
    Router::new()
        .route("/courses", post(create_course))
        .route(
            "/courses/:course_id/lessons",
            get(list_lessons).post(create_lesson),
        )
        .route("/courses/:course_id/lessons/order", put(reorder_lessons))
        .route(
            "/lessons/:lesson_id",
            get(get_lesson).patch(update_lesson).delete(delete_lesson),
        )
}
