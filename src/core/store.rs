//! Entity store adapter traits
//!
//! [`EntityStore`] wraps the backing document store's insert/get/query/
//! update/delete primitives behind one async trait so the route layer is
//! agnostic to the storage mechanism. The store hands out string keys,
//! issues opaque cursor tokens for pagination, and fails fast: a single
//! backend failure surfaces immediately, with no retries.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// A stored entity record: a flat mapping of field name to JSON value.
pub type Record = Map<String, Value>;

/// Errors produced by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key does not exist under the given kind (also raised when a
    /// deletion affected zero records).
    #[error("no {kind} with key '{key}'")]
    NotFound { kind: String, key: String },

    /// A pagination token the store did not issue.
    #[error("unrecognized cursor token")]
    BadCursor,

    /// The backing store rejected or failed the operation.
    #[error("store backend failure: {message}")]
    Backend { message: String },
}

impl StoreError {
    pub fn not_found(kind: &str, key: &str) -> Self {
        StoreError::NotFound {
            kind: kind.to_string(),
            key: key.to_string(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        StoreError::Backend {
            message: message.into(),
        }
    }
}

/// Conjunctive equality predicates over record fields.
///
/// `Filter::new().eq("owner", "abc").eq("public", true)` matches records
/// where both fields equal the given values.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    predicates: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality predicate.
    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.predicates.push((field.to_string(), value.into()));
        self
    }

    /// True when every predicate matches the record.
    pub fn matches(&self, record: &Record) -> bool {
        self.predicates
            .iter()
            .all(|(field, value)| record.get(field) == Some(value))
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

/// One page of query results.
///
/// `next_cursor` is present iff more matching results exist beyond this
/// page. Cursor tokens are opaque and store-issued; callers only forward
/// them back unchanged.
#[derive(Debug)]
pub struct Page {
    pub entities: Vec<(String, Record)>,
    pub next_cursor: Option<String>,
}

/// Uniform async access to the backing document store.
///
/// Implementations are injected through the server state rather than held
/// as module globals, so tests can substitute their own.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Insert a record under a store-assigned key and return that key.
    async fn insert(&self, kind: &str, record: Record) -> Result<String, StoreError>;

    /// Insert a record under a caller-chosen key (used for lazily created
    /// users keyed by truncated subject).
    async fn insert_named(&self, kind: &str, key: &str, record: Record) -> Result<(), StoreError>;

    /// Fetch one record by key.
    async fn get(&self, kind: &str, key: &str) -> Result<Record, StoreError>;

    /// Query records matching the filter, in store-defined order.
    ///
    /// Insertion order is not guaranteed; callers must treat the sequence
    /// as store-defined and rely only on membership.
    async fn list(
        &self,
        kind: &str,
        filter: &Filter,
        limit: Option<usize>,
        cursor: Option<&str>,
    ) -> Result<Page, StoreError>;

    /// Full-replace an existing record.
    async fn update(&self, kind: &str, key: &str, record: Record) -> Result<(), StoreError>;

    /// Delete one record by key.
    async fn delete(&self, kind: &str, key: &str) -> Result<(), StoreError>;

    /// Count all records matching the filter (unlimited query).
    async fn count(&self, kind: &str, filter: &Filter) -> Result<usize, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = Filter::new();
        assert!(filter.is_empty());
        assert!(filter.matches(&record(&[("name", json!("Sea Witch"))])));
        assert!(filter.matches(&Record::new()));
    }

    #[test]
    fn test_single_predicate() {
        let filter = Filter::new().eq("owner", "abc");
        assert!(filter.matches(&record(&[("owner", json!("abc"))])));
        assert!(!filter.matches(&record(&[("owner", json!("xyz"))])));
        assert!(!filter.matches(&Record::new()));
    }

    #[test]
    fn test_predicates_are_conjunctive() {
        let filter = Filter::new().eq("owner", "abc").eq("public", true);
        assert!(filter.matches(&record(&[
            ("owner", json!("abc")),
            ("public", json!(true))
        ])));
        assert!(!filter.matches(&record(&[
            ("owner", json!("abc")),
            ("public", json!(false))
        ])));
    }

    #[test]
    fn test_filter_compares_types_strictly() {
        let filter = Filter::new().eq("length", 30);
        assert!(!filter.matches(&record(&[("length", json!("30"))])));
    }
}
