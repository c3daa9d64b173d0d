//! Core orchestration for lesson operations
//!
//! The db layer owns row access; these modules own the multi-step contracts:
//! atomic reorder, derived progress, and the two-phase media bind with
//! compensation.

pub mod media;
pub mod progress;
pub mod reorder;
