//! Shared types for the LMS microservices
//!
//! Carries the classified error type, the caller/capability model used by
//! every service for tenant and role enforcement, and data-directory
//! resolution.

pub mod auth;
pub mod config;
pub mod error;

pub use error::{Error, Result};
