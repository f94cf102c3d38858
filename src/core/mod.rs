//! Core module containing the shared entity-access layer
//!
//! Everything the resource routes reuse lives here: the store adapter
//! traits, the response shaper, the declarative attribute validator, the
//! identity/ownership gate, and the shared extractors.

pub mod auth;
pub mod error;
pub mod extractors;
pub mod schema;
pub mod shape;
pub mod store;

pub use auth::{IdentityProvider, Subject};
pub use error::{ApiError, ApiResult};
pub use store::{EntityStore, Filter, Page, Record, StoreError};
