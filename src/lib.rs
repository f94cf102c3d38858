//! # Drydock
//!
//! A REST API backend exposing CRUD over a document store for four
//! resource kinds — Boats, Engineering Changes, Part Changes, Users —
//! gated by OAuth2/JWT identity checks for ownership.
//!
//! ## Architecture
//!
//! Every resource route is thin glue over one shared core:
//!
//! - **Entity Store Adapter** ([`core::store`]): uniform async
//!   insert/get/list/update/delete against a key-value/document store,
//!   with conjunctive equality filters and opaque store-issued cursors.
//! - **Response Shaper** ([`core::shape`]): computed `id`/`self` fields,
//!   collection `count` and `next` pagination links, page size 5.
//! - **Attribute Validator** ([`core::schema`]): one declarative schema
//!   per kind (whitelist + type + required/default) consumed by a single
//!   generic validator.
//! - **Identity & Ownership Gate** ([`core::auth`]): bearer-token
//!   verification yielding the subject claim, plus the owner comparison
//!   protecting owned resources.
//!
//! Control flow per request:
//! route handler → identity/ownership gate → attribute validator →
//! entity store adapter → response shaper → HTTP response.
//!
//! All error responses share one wire shape: `{"Error": "<message>"}`.

pub mod config;
pub mod core;
pub mod entities;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::core::auth::{
        GoogleIdentity, IdentityProvider, StaticIdentity, Subject, optional_subject,
        require_owner, require_subject,
    };
    pub use crate::core::error::{ApiError, ApiResult};
    pub use crate::core::schema::{FieldDefault, FieldSpec, FieldType, Schema};
    pub use crate::core::shape::{
        CollectionQuery, PAGE_SIZE, request_base, shape_collection, shape_entity,
    };
    pub use crate::core::store::{EntityStore, Filter, Page, Record, StoreError};
    pub use crate::server::{AppState, build_router};
    pub use crate::storage::InMemoryStore;

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
}
