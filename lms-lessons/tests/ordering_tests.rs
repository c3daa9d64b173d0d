//! Ordinal sequence integrity across create, soft delete, and reorder

mod helpers;

use helpers::{seed_course, seed_lesson, setup_pool};
use lms_common::Error;
use lms_lessons::access::visible_lesson;
use lms_lessons::db::lessons::{list_by_course, load_lesson, soft_delete_lesson, Page};
use lms_lessons::services::reorder::reorder_lessons;
use sqlx::SqlitePool;
use uuid::Uuid;

async fn live_positions(pool: &SqlitePool, course: Uuid, tenant: Uuid) -> Vec<(Uuid, i64)> {
    let (lessons, _) = list_by_course(pool, course, tenant, true, Page::default())
        .await
        .unwrap();
    lessons.iter().map(|l| (l.guid, l.position)).collect()
}

#[tokio::test]
async fn creates_yield_contiguous_positions() {
    let pool = setup_pool().await;
    let tenant = Uuid::new_v4();
    let course = seed_course(&pool, tenant).await;

    for i in 0..5 {
        seed_lesson(&pool, course, tenant, &format!("Lesson {}", i)).await;
    }

    let positions: Vec<i64> = live_positions(&pool, course, tenant)
        .await
        .iter()
        .map(|(_, p)| *p)
        .collect();
    assert_eq!(positions, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn reorder_applies_submitted_sequence() {
    let pool = setup_pool().await;
    let tenant = Uuid::new_v4();
    let course = seed_course(&pool, tenant).await;

    let a = seed_lesson(&pool, course, tenant, "A").await;
    let b = seed_lesson(&pool, course, tenant, "B").await;
    let c = seed_lesson(&pool, course, tenant, "C").await;

    reorder_lessons(&pool, course, tenant, &[b.guid, c.guid, a.guid])
        .await
        .unwrap();

    let positions = live_positions(&pool, course, tenant).await;
    assert_eq!(positions, vec![(b.guid, 1), (c.guid, 2), (a.guid, 3)]);
}

#[tokio::test]
async fn reorder_set_mismatch_is_conflict_and_leaves_ordinals_unchanged() {
    let pool = setup_pool().await;
    let tenant = Uuid::new_v4();
    let course = seed_course(&pool, tenant).await;

    let a = seed_lesson(&pool, course, tenant, "A").await;
    let b = seed_lesson(&pool, course, tenant, "B").await;

    // Omission
    let err = reorder_lessons(&pool, course, tenant, &[b.guid]).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    // Foreign id
    let err = reorder_lessons(&pool, course, tenant, &[b.guid, Uuid::new_v4()])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    // Duplicate
    let err = reorder_lessons(&pool, course, tenant, &[a.guid, a.guid])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    let positions = live_positions(&pool, course, tenant).await;
    assert_eq!(positions, vec![(a.guid, 1), (b.guid, 2)]);
}

#[tokio::test]
async fn reorder_after_soft_delete_renumbers_survivors() {
    let pool = setup_pool().await;
    let tenant = Uuid::new_v4();
    let course = seed_course(&pool, tenant).await;

    let a = seed_lesson(&pool, course, tenant, "A").await;
    let b = seed_lesson(&pool, course, tenant, "B").await;
    let c = seed_lesson(&pool, course, tenant, "C").await;

    soft_delete_lesson(&pool, b.guid, tenant).await.unwrap();

    // The deleted lesson is no longer part of the reorder set
    let err = reorder_lessons(&pool, course, tenant, &[a.guid, b.guid, c.guid])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    reorder_lessons(&pool, course, tenant, &[c.guid, a.guid])
        .await
        .unwrap();

    let positions = live_positions(&pool, course, tenant).await;
    assert_eq!(positions, vec![(c.guid, 1), (a.guid, 2)]);
}

#[tokio::test]
async fn create_after_soft_delete_continues_from_live_max() {
    let pool = setup_pool().await;
    let tenant = Uuid::new_v4();
    let course = seed_course(&pool, tenant).await;

    let _a = seed_lesson(&pool, course, tenant, "A").await;
    let b = seed_lesson(&pool, course, tenant, "B").await;
    soft_delete_lesson(&pool, b.guid, tenant).await.unwrap();

    // Renumber the survivor, then create: positions stay a set {1..N}
    let a_id = live_positions(&pool, course, tenant).await[0].0;
    reorder_lessons(&pool, course, tenant, &[a_id]).await.unwrap();

    let c = seed_lesson(&pool, course, tenant, "C").await;
    assert_eq!(c.position, 2);

    let positions: Vec<i64> = live_positions(&pool, course, tenant)
        .await
        .iter()
        .map(|(_, p)| *p)
        .collect();
    assert_eq!(positions, vec![1, 2]);
}

#[tokio::test]
async fn cross_tenant_get_reads_as_absence() {
    let pool = setup_pool().await;
    let tenant = Uuid::new_v4();
    let course = seed_course(&pool, tenant).await;
    let lesson = seed_lesson(&pool, course, tenant, "A").await;

    let other_tenant = Uuid::new_v4();
    let caller = helpers::instructor();

    let cross = load_lesson(&pool, lesson.guid).await.unwrap();
    let cross_err = visible_lesson(cross, lesson.guid, other_tenant, &caller).unwrap_err();

    let absent_id = Uuid::new_v4();
    let absent = load_lesson(&pool, absent_id).await.unwrap();
    let absent_err = visible_lesson(absent, absent_id, other_tenant, &caller).unwrap_err();

    // Indistinguishable outcomes
    assert!(matches!(cross_err, Error::NotFound(_)));
    assert!(matches!(absent_err, Error::NotFound(_)));
}

#[tokio::test]
async fn list_is_paged_with_total_count() {
    let pool = setup_pool().await;
    let tenant = Uuid::new_v4();
    let course = seed_course(&pool, tenant).await;

    for i in 0..7 {
        seed_lesson(&pool, course, tenant, &format!("L{}", i)).await;
    }

    let (page1, total) = list_by_course(
        &pool,
        course,
        tenant,
        true,
        Page { page: 1, page_size: 3 },
    )
    .await
    .unwrap();
    assert_eq!(total, 7);
    assert_eq!(page1.len(), 3);
    assert_eq!(page1[0].position, 1);

    let (page3, _) = list_by_course(
        &pool,
        course,
        tenant,
        true,
        Page { page: 3, page_size: 3 },
    )
    .await
    .unwrap();
    assert_eq!(page3.len(), 1);
    assert_eq!(page3[0].position, 7);
}
