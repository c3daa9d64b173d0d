//! lms-lessons - Lesson Lifecycle & Progress microservice
//!
//! Manages lesson records within courses, tracks per-learner completion and
//! aggregate course progress, reorders lesson sequences, and binds uploaded
//! video assets to lessons. Authentication and tenant resolution happen in
//! the upstream gateway; this service receives validated identity headers.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lms_lessons::config::{Config, Options};
use lms_lessons::services::media::HttpMediaClient;
use lms_lessons::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting lms-lessons microservice");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let options = Options::parse();
    let config = Config::from_options(&options)?;
    info!("Database: {}", config.db_path.display());

    let db_pool = lms_lessons::db::init_database_pool(&config.db_path).await?;
    info!("Database connection established");

    let media = Arc::new(HttpMediaClient::new(config.media_url.clone()));
    info!("Media service: {}", config.media_url);

    let state = AppState::new(db_pool, media);
    let app = lms_lessons::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on http://{}", config.bind_addr);
    info!("Health check: http://{}/health", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
