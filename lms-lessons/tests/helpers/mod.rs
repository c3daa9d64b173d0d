//! Shared test helpers: in-memory pools, seeded courses, and a mock media
//! collaborator with programmable failure modes.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Bytes;
use lms_common::auth::{Caller, Role};
use lms_common::{Error, Result};
use lms_lessons::db::courses::{save_course, Course};
use lms_lessons::db::lessons::{create_lesson, Lesson, LessonState, NewLesson};
use lms_lessons::db::{self, init_tables};
use lms_lessons::services::media::{MediaService, UploadMetadata, UploadedMedia};
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

pub async fn setup_pool() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    init_tables(&pool).await.expect("Failed to initialize schema");
    pool
}

pub async fn seed_course(pool: &SqlitePool, tenant: Uuid) -> Uuid {
    let course = Course::new(tenant, "Test Course".to_string());
    save_course(pool, &course).await.expect("Failed to save course");
    course.guid
}

pub async fn seed_lesson(pool: &SqlitePool, course: Uuid, tenant: Uuid, title: &str) -> Lesson {
    create_lesson(
        pool,
        course,
        tenant,
        NewLesson {
            title: title.to_string(),
            content_ref: None,
            state: Some(LessonState::Published),
        },
    )
    .await
    .expect("Failed to create lesson")
}

pub fn instructor() -> Caller {
    Caller::authenticated(Uuid::new_v4(), Role::Instructor)
}

pub fn learner() -> Caller {
    Caller::authenticated(Uuid::new_v4(), Role::Learner)
}

/// Mock media collaborator.
///
/// `soft_delete_on_upload` simulates the race where the lesson is deleted
/// after the upload succeeded but before the bind step runs.
#[derive(Default)]
pub struct MockMedia {
    pub fail_upload: bool,
    pub fail_delete: bool,
    pub upload_count: AtomicUsize,
    pub deleted: Mutex<Vec<String>>,
    pub soft_delete_on_upload: Option<(SqlitePool, Uuid, Uuid)>,
}

impl MockMedia {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deleted_ids(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaService for MockMedia {
    async fn upload(
        &self,
        _tenant_id: Uuid,
        _user_id: Uuid,
        metadata: &UploadMetadata,
        _data: Bytes,
    ) -> Result<UploadedMedia> {
        if self.fail_upload {
            return Err(Error::Dependency("media service unavailable".to_string()));
        }

        self.upload_count.fetch_add(1, Ordering::SeqCst);

        if let Some((pool, lesson_id, tenant_id)) = &self.soft_delete_on_upload {
            db::lessons::soft_delete_lesson(pool, *lesson_id, *tenant_id)
                .await
                .expect("Failed to soft-delete lesson mid-upload");
        }

        let media_id = format!("media-{}", Uuid::new_v4());
        Ok(UploadedMedia {
            url: format!("https://media.example/{}/{}", media_id, metadata.file_name),
            media_id,
        })
    }

    async fn delete(&self, media_id: &str) -> Result<()> {
        if self.fail_delete {
            return Err(Error::Dependency("media delete unavailable".to_string()));
        }
        self.deleted.lock().unwrap().push(media_id.to_string());
        Ok(())
    }
}
