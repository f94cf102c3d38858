//! Resource kinds and their route handlers
//!
//! Each module declares one resource: its attribute schema, its router,
//! and the thin handlers translating HTTP verbs into calls on the core
//! layer (gate → validator → store → shaper).

pub mod boat;
pub mod engineering_change;
pub mod part_change;
pub mod user;

use crate::core::error::ApiError;

/// Handler for collection-level mutations, which are never supported.
pub async fn collection_method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
