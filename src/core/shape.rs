//! Response shaping: computed `id`/`self` fields and pagination links
//!
//! Entities are stored without identity or URL fields; both are derived on
//! the way out. `id` is the store key and `self` is the canonical URL under
//! the collection path. Collections additionally carry a total `count` and,
//! when truncated, a `next` URL embedding the store-issued cursor token.

use axum::http::HeaderMap;
use axum::http::header::HOST;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::core::store::{Page, Record};

/// Default page size for collection listings.
pub const PAGE_SIZE: usize = 5;

/// Query parameters accepted by collection listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionQuery {
    /// Opaque resumption token from a previous page's `next` URL.
    pub cursor: Option<String>,
}

/// `{scheme}://{host}` for the inbound request.
///
/// Scheme comes from `x-forwarded-proto` when a proxy supplies it, host
/// from the `Host` header. Falls back to `http://localhost` so shaping
/// never fails.
pub fn request_base(headers: &HeaderMap) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("{scheme}://{host}")
}

/// Attach `id` and `self` to a single entity record.
///
/// `collection` is the canonical collection path without a trailing slash,
/// e.g. `/boats`.
pub fn shape_entity(mut record: Record, key: &str, base: &str, collection: &str) -> Value {
    record.insert("id".to_string(), Value::String(key.to_string()));
    record.insert(
        "self".to_string(),
        Value::String(format!("{base}{collection}/{key}")),
    );
    Value::Object(record)
}

/// The canonical `self` URL for an entity, without shaping the record.
pub fn self_url(key: &str, base: &str, collection: &str) -> String {
    format!("{base}{collection}/{key}")
}

/// Shape one page of results into the collection envelope.
///
/// `count` is the total number of matching entities (from the unlimited
/// count query). `collection` is the canonical path used for per-entity
/// `self` URLs; `next_path` is the listing path the `next` URL resumes at
/// (they differ for nested listings such as `/owners/{id}/boats`).
/// `with_self` is false for user listings, which carry no per-entity
/// `self`.
pub fn shape_collection(
    page: Page,
    count: usize,
    base: &str,
    collection: &str,
    next_path: &str,
    with_self: bool,
) -> Value {
    let items: Vec<Value> = page
        .entities
        .into_iter()
        .map(|(key, mut record)| {
            record.insert("id".to_string(), Value::String(key.clone()));
            if with_self {
                record.insert(
                    "self".to_string(),
                    Value::String(format!("{base}{collection}/{key}")),
                );
            }
            Value::Object(record)
        })
        .collect();

    let mut envelope = json!({ "items": items, "count": count });
    if let Some(cursor) = page.next_cursor {
        envelope["next"] = Value::String(format!("{base}{next_path}?cursor={cursor}"));
    }
    envelope
}
