//! Two-phase media binding: happy path, validation, and partial-failure
//! compensation

mod helpers;

use axum::body::Bytes;
use helpers::{instructor, learner, seed_course, seed_lesson, setup_pool, MockMedia};
use lms_common::Error;
use lms_lessons::db::lessons::load_lesson;
use lms_lessons::db::orphans::list_orphans;
use lms_lessons::services::media::{attach_video, UploadMetadata};
use std::sync::atomic::Ordering;
use uuid::Uuid;

fn video_metadata() -> UploadMetadata {
    UploadMetadata {
        file_name: "lecture.mp4".to_string(),
        content_type: "video/mp4".to_string(),
    }
}

fn video_bytes() -> Bytes {
    Bytes::from_static(b"fake video payload")
}

#[tokio::test]
async fn attach_binds_media_id_and_url() {
    let pool = setup_pool().await;
    let tenant = Uuid::new_v4();
    let course = seed_course(&pool, tenant).await;
    let lesson = seed_lesson(&pool, course, tenant, "A").await;
    let media = MockMedia::new();

    let bound = attach_video(
        &pool,
        &media,
        lesson.guid,
        tenant,
        &instructor(),
        video_metadata(),
        video_bytes(),
    )
    .await
    .unwrap();

    assert!(bound.media_id.is_some());
    assert!(bound.video_url.as_deref().unwrap().starts_with("https://media.example/"));
    assert_eq!(media.upload_count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn reattach_replaces_prior_binding() {
    let pool = setup_pool().await;
    let tenant = Uuid::new_v4();
    let course = seed_course(&pool, tenant).await;
    let lesson = seed_lesson(&pool, course, tenant, "A").await;
    let media = MockMedia::new();

    let first = attach_video(
        &pool,
        &media,
        lesson.guid,
        tenant,
        &instructor(),
        video_metadata(),
        video_bytes(),
    )
    .await
    .unwrap();

    let second = attach_video(
        &pool,
        &media,
        lesson.guid,
        tenant,
        &instructor(),
        video_metadata(),
        video_bytes(),
    )
    .await
    .unwrap();

    assert_ne!(first.media_id, second.media_id);

    let stored = load_lesson(&pool, lesson.guid).await.unwrap().unwrap();
    assert_eq!(stored.media_id, second.media_id);
}

#[tokio::test]
async fn non_video_content_type_is_rejected_before_upload() {
    let pool = setup_pool().await;
    let tenant = Uuid::new_v4();
    let course = seed_course(&pool, tenant).await;
    let lesson = seed_lesson(&pool, course, tenant, "A").await;
    let media = MockMedia::new();

    let err = attach_video(
        &pool,
        &media,
        lesson.guid,
        tenant,
        &instructor(),
        UploadMetadata {
            file_name: "notes.pdf".to_string(),
            content_type: "application/pdf".to_string(),
        },
        video_bytes(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::InvalidInput(_)));
    assert_eq!(media.upload_count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn learner_cannot_upload() {
    let pool = setup_pool().await;
    let tenant = Uuid::new_v4();
    let course = seed_course(&pool, tenant).await;
    let lesson = seed_lesson(&pool, course, tenant, "A").await;
    let media = MockMedia::new();

    let err = attach_video(
        &pool,
        &media,
        lesson.guid,
        tenant,
        &learner(),
        video_metadata(),
        video_bytes(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::Forbidden(_)));
}

#[tokio::test]
async fn upload_failure_surfaces_as_dependency_error_without_binding() {
    let pool = setup_pool().await;
    let tenant = Uuid::new_v4();
    let course = seed_course(&pool, tenant).await;
    let lesson = seed_lesson(&pool, course, tenant, "A").await;
    let media = MockMedia {
        fail_upload: true,
        ..MockMedia::new()
    };

    let err = attach_video(
        &pool,
        &media,
        lesson.guid,
        tenant,
        &instructor(),
        video_metadata(),
        video_bytes(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::Dependency(_)));

    let stored = load_lesson(&pool, lesson.guid).await.unwrap().unwrap();
    assert!(stored.media_id.is_none());
}

#[tokio::test]
async fn concurrent_soft_delete_triggers_compensating_delete() {
    let pool = setup_pool().await;
    let tenant = Uuid::new_v4();
    let course = seed_course(&pool, tenant).await;
    let lesson = seed_lesson(&pool, course, tenant, "A").await;

    let media = MockMedia {
        soft_delete_on_upload: Some((pool.clone(), lesson.guid, tenant)),
        ..MockMedia::new()
    };

    let err = attach_video(
        &pool,
        &media,
        lesson.guid,
        tenant,
        &instructor(),
        video_metadata(),
        video_bytes(),
    )
    .await
    .unwrap_err();

    // The bind hit a lesson that no longer exists; the uploaded asset was
    // compensated and nothing points at it.
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(media.deleted_ids().len(), 1);
    assert!(list_orphans(&pool).await.unwrap().is_empty());

    let media_id: Option<String> = sqlx::query_scalar("SELECT media_id FROM lessons WHERE guid = ?")
        .bind(lesson.guid.to_string())
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(media_id.is_none());
}

#[tokio::test]
async fn failed_compensation_records_the_orphan() {
    let pool = setup_pool().await;
    let tenant = Uuid::new_v4();
    let course = seed_course(&pool, tenant).await;
    let lesson = seed_lesson(&pool, course, tenant, "A").await;

    let media = MockMedia {
        fail_delete: true,
        soft_delete_on_upload: Some((pool.clone(), lesson.guid, tenant)),
        ..MockMedia::new()
    };

    let err = attach_video(
        &pool,
        &media,
        lesson.guid,
        tenant,
        &instructor(),
        video_metadata(),
        video_bytes(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));

    let orphans = list_orphans(&pool).await.unwrap();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].lesson_id, lesson.guid);
    assert!(orphans[0].reason.contains("bind failed"));
}
