//! lms-lessons library interface
//!
//! Lesson lifecycle and progress engine for the multi-tenant course
//! platform: lesson CRUD with tenant isolation, per-user completion tracking
//! with derived course progress, atomic reordering of a course's lesson
//! sequence, and the two-phase video binding workflow.

pub mod access;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::services::media::MediaService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// External media collaborator used by the video binding workflow
    pub media: Arc<dyn MediaService>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, media: Arc<dyn MediaService>) -> Self {
        Self {
            db,
            media,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::lesson_routes())
        .merge(api::progress_routes())
        .merge(api::media_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
