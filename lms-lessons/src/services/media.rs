//! Two-phase media binding
//!
//! Uploads go to the external media service first; only a completed upload is
//! ever bound to a lesson row. If the local bind fails after the upload
//! succeeded (lesson soft-deleted in the gap, persistence fault), the asset
//! is compensated with a best-effort delete, falling back to the orphan
//! ledger when the delete itself fails.

use async_trait::async_trait;
use axum::body::Bytes;
use lms_common::auth::{Caller, Capability};
use lms_common::{Error, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::access;
use crate::db::{lessons, orphans};

/// Metadata accompanying an upload
#[derive(Debug, Clone)]
pub struct UploadMetadata {
    pub file_name: String,
    pub content_type: String,
}

/// Durable identity of a completed upload
#[derive(Debug, Clone)]
pub struct UploadedMedia {
    pub media_id: String,
    pub url: String,
}

/// External media collaborator: performs the physical upload and returns a
/// durable identifier and URL. `delete` is the compensation hook.
#[async_trait]
pub trait MediaService: Send + Sync {
    async fn upload(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        metadata: &UploadMetadata,
        data: Bytes,
    ) -> Result<UploadedMedia>;

    async fn delete(&self, media_id: &str) -> Result<()>;
}

/// Media service client over HTTP
pub struct HttpMediaClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMediaClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct UploadResponse {
    media_id: String,
    url: String,
}

#[async_trait]
impl MediaService for HttpMediaClient {
    async fn upload(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        metadata: &UploadMetadata,
        data: Bytes,
    ) -> Result<UploadedMedia> {
        let response = self
            .client
            .post(format!("{}/media", self.base_url))
            .query(&[
                ("tenant_id", tenant_id.to_string()),
                ("user_id", user_id.to_string()),
                ("file_name", metadata.file_name.clone()),
            ])
            .header(reqwest::header::CONTENT_TYPE, &metadata.content_type)
            .body(data)
            .send()
            .await
            .map_err(|e| Error::Dependency(format!("Media upload failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Dependency(format!(
                "Media service returned {}",
                response.status()
            )));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| Error::Dependency(format!("Malformed media service response: {}", e)))?;

        Ok(UploadedMedia {
            media_id: body.media_id,
            url: body.url,
        })
    }

    async fn delete(&self, media_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(format!("{}/media/{}", self.base_url, media_id))
            .send()
            .await
            .map_err(|e| Error::Dependency(format!("Media delete failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Dependency(format!(
                "Media service returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}

/// Retry budget for the post-upload local bind. Only transient persistence
/// failures are retried; classified errors are deterministic and final.
const BIND_ATTEMPTS: u32 = 3;

/// Attach an uploaded video to a lesson.
///
/// Sequence: capability check, lesson visibility check, content-type check,
/// external upload, local bind. A re-attach replaces the prior binding; the
/// prior asset's retention is the media service's concern. The upload step is
/// never retried here; on a dependency failure the caller resubmits.
pub async fn attach_video(
    pool: &SqlitePool,
    media: &dyn MediaService,
    lesson_id: Uuid,
    tenant_id: Uuid,
    caller: &Caller,
    metadata: UploadMetadata,
    data: Bytes,
) -> Result<lessons::Lesson> {
    let user_id = caller.require_user(Capability::UploadMedia)?;

    let lesson = lessons::load_lesson(pool, lesson_id).await?;
    access::visible_lesson(lesson, lesson_id, tenant_id, caller)?;

    if !metadata.content_type.starts_with("video/") {
        return Err(Error::InvalidInput(format!(
            "Expected a video content type, got {}",
            metadata.content_type
        )));
    }

    let uploaded = media.upload(tenant_id, user_id, &metadata, data).await?;

    tracing::info!(
        lesson_id = %lesson_id,
        media_id = %uploaded.media_id,
        "Upload complete, binding to lesson"
    );

    if let Err(bind_err) = bind_with_retry(pool, lesson_id, tenant_id, &uploaded).await {
        compensate_upload(pool, media, lesson_id, tenant_id, &uploaded, &bind_err).await;
        return Err(bind_err);
    }

    let lesson = lessons::load_lesson(pool, lesson_id).await?;
    access::visible_lesson(lesson, lesson_id, tenant_id, caller)
}

async fn bind_with_retry(
    pool: &SqlitePool,
    lesson_id: Uuid,
    tenant_id: Uuid,
    uploaded: &UploadedMedia,
) -> Result<()> {
    let mut last_err = None;
    for attempt in 1..=BIND_ATTEMPTS {
        match lessons::set_lesson_media(pool, lesson_id, tenant_id, &uploaded.media_id, &uploaded.url)
            .await
        {
            Ok(()) => return Ok(()),
            Err(Error::Database(e)) if attempt < BIND_ATTEMPTS => {
                tracing::warn!(
                    lesson_id = %lesson_id,
                    attempt,
                    error = %e,
                    "Media bind attempt failed, retrying"
                );
                last_err = Some(Error::Database(e));
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_err.unwrap_or_else(|| Error::Internal("Media bind retry exhausted".to_string())))
}

/// Best-effort compensation for an upload whose bind step failed. The lesson
/// row is untouched at this point; the only cleanup needed is the asset.
async fn compensate_upload(
    pool: &SqlitePool,
    media: &dyn MediaService,
    lesson_id: Uuid,
    tenant_id: Uuid,
    uploaded: &UploadedMedia,
    bind_err: &Error,
) {
    match media.delete(&uploaded.media_id).await {
        Ok(()) => {
            tracing::info!(
                media_id = %uploaded.media_id,
                lesson_id = %lesson_id,
                "Compensated orphaned upload after bind failure"
            );
        }
        Err(delete_err) => {
            tracing::warn!(
                media_id = %uploaded.media_id,
                lesson_id = %lesson_id,
                error = %delete_err,
                "Compensating delete failed, recording orphan"
            );
            let reason = format!("bind failed ({}); delete failed ({})", bind_err, delete_err);
            if let Err(ledger_err) = orphans::record_orphan(
                pool,
                &uploaded.media_id,
                &uploaded.url,
                tenant_id,
                lesson_id,
                &reason,
            )
            .await
            {
                tracing::error!(
                    media_id = %uploaded.media_id,
                    error = %ledger_err,
                    "Failed to record media orphan"
                );
            }
        }
    }
}
