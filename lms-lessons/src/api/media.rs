//! Media binding API handler
//!
//! PUT /lessons/:lesson_id/video: raw video bytes in the body, content type
//! from the Content-Type header, original file name from the query string.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::header::CONTENT_TYPE,
    http::HeaderMap,
    routing::put,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::context::RequestContext;
use crate::db::lessons::Lesson;
use crate::error::{ApiError, ApiResult};
use crate::services::media::{self, UploadMetadata};
use crate::AppState;

/// PUT /lessons/:lesson_id/video query parameters
#[derive(Debug, Deserialize)]
pub struct AttachVideoQuery {
    pub file_name: Option<String>,
}

/// PUT /lessons/:lesson_id/video
pub async fn attach_video(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
    Query(query): Query<AttachVideoQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Lesson>> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("Missing Content-Type header".to_string()))?
        .to_string();

    if body.is_empty() {
        return Err(ApiError::BadRequest("Empty upload body".to_string()));
    }

    let metadata = UploadMetadata {
        file_name: query.file_name.unwrap_or_else(|| format!("{}.bin", lesson_id)),
        content_type,
    };

    let lesson = media::attach_video(
        &state.db,
        state.media.as_ref(),
        lesson_id,
        ctx.tenant_id,
        &ctx.caller,
        metadata,
        body,
    )
    .await?;

    Ok(Json(lesson))
}

/// Media routes
pub fn media_routes() -> Router<AppState> {
    Router::new().route("/lessons/:lesson_id/video", put(attach_video))
}
