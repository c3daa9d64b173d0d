//! Common error types for the LMS services

use thiserror::Error;

/// Common result type for LMS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Classified error kinds shared across LMS microservices
///
/// The first five variants are the classified kinds surfaced to callers;
/// the rest wrap ambient failures from the platform layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed identifier or payload. Caller error, never retried.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource absent, soft-deleted, or belonging to another tenant.
    /// All three cases are reported identically so existence is never
    /// leaked across a tenant boundary.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller lacks the capability for an otherwise-visible resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Concurrent-state violation, e.g. a reorder against a stale lesson set
    #[error("Conflict: {0}")]
    Conflict(String),

    /// External collaborator (media service) unavailable or erroring
    #[error("Dependency failure: {0}")]
    Dependency(String),

    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
