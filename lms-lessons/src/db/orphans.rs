//! Orphaned media ledger
//!
//! When an upload succeeds but the lesson bind fails and the compensating
//! delete also fails, the asset is recorded here for offline garbage
//! collection instead of being silently leaked.

use chrono::{DateTime, Utc};
use lms_common::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Orphaned media asset awaiting cleanup
#[derive(Debug, Clone)]
pub struct MediaOrphan {
    pub media_id: String,
    pub media_url: String,
    pub tenant_id: Uuid,
    pub lesson_id: Uuid,
    pub reason: String,
    pub recorded_at: DateTime<Utc>,
}

/// Record an orphaned asset
pub async fn record_orphan(
    pool: &SqlitePool,
    media_id: &str,
    media_url: &str,
    tenant_id: Uuid,
    lesson_id: Uuid,
    reason: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO media_orphans (media_id, media_url, tenant_id, lesson_id, reason, recorded_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(media_id) DO UPDATE SET
            reason = excluded.reason,
            recorded_at = excluded.recorded_at
        "#,
    )
    .bind(media_id)
    .bind(media_url)
    .bind(tenant_id.to_string())
    .bind(lesson_id.to_string())
    .bind(reason)
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// List recorded orphans, oldest first
pub async fn list_orphans(pool: &SqlitePool) -> Result<Vec<MediaOrphan>> {
    let rows = sqlx::query(
        r#"
        SELECT media_id, media_url, tenant_id, lesson_id, reason, recorded_at
        FROM media_orphans
        ORDER BY recorded_at ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut orphans = Vec::with_capacity(rows.len());
    for row in rows {
        let tenant_str: String = row.get("tenant_id");
        let lesson_str: String = row.get("lesson_id");
        let recorded_str: String = row.get("recorded_at");
        orphans.push(MediaOrphan {
            media_id: row.get("media_id"),
            media_url: row.get("media_url"),
            tenant_id: Uuid::parse_str(&tenant_str).unwrap_or_default(),
            lesson_id: Uuid::parse_str(&lesson_str).unwrap_or_default(),
            reason: row.get("reason"),
            recorded_at: DateTime::parse_from_rfc3339(&recorded_str)
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        });
    }

    Ok(orphans)
}
