//! HTTP API handlers for lms-lessons
//!
//! The transport layer's whole job is extracting identifiers and payloads,
//! calling the core, and mapping classified errors to status codes. No
//! business rule lives here.

pub mod context;
pub mod health;
pub mod lessons;
pub mod media;
pub mod progress;

pub use health::health_routes;
pub use lessons::lesson_routes;
pub use media::media_routes;
pub use progress::progress_routes;
