//! In-memory implementation of EntityStore for testing and development
//!
//! Thread-safe via RwLock, keyed by kind then record key. Keys for
//! store-assigned inserts come from a monotonic counter; iteration order is
//! the key order of the underlying map, which callers must treat as
//! store-defined. Cursor tokens are issued and parsed only here.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::core::store::{EntityStore, Filter, Page, Record, StoreError};

const CURSOR_PREFIX: &str = "ck_";

fn issue_cursor(key: &str) -> String {
    format!("{CURSOR_PREFIX}{key}")
}

fn parse_cursor(token: &str) -> Result<String, StoreError> {
    token
        .strip_prefix(CURSOR_PREFIX)
        .map(str::to_string)
        .ok_or(StoreError::BadCursor)
}

/// In-memory entity store.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    kinds: Arc<RwLock<HashMap<String, BTreeMap<String, Record>>>>,
    counter: Arc<AtomicI64>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_key(&self) -> String {
        (self.counter.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn insert(&self, kind: &str, record: Record) -> Result<String, StoreError> {
        let key = self.next_key();
        self.insert_named(kind, &key, record).await?;
        Ok(key)
    }

    async fn insert_named(&self, kind: &str, key: &str, record: Record) -> Result<(), StoreError> {
        let mut kinds = self
            .kinds
            .write()
            .map_err(|e| StoreError::backend(format!("lock poisoned: {e}")))?;
        kinds
            .entry(kind.to_string())
            .or_default()
            .insert(key.to_string(), record);
        Ok(())
    }

    async fn get(&self, kind: &str, key: &str) -> Result<Record, StoreError> {
        let kinds = self
            .kinds
            .read()
            .map_err(|e| StoreError::backend(format!("lock poisoned: {e}")))?;
        kinds
            .get(kind)
            .and_then(|records| records.get(key))
            .cloned()
            .ok_or_else(|| StoreError::not_found(kind, key))
    }

    async fn list(
        &self,
        kind: &str,
        filter: &Filter,
        limit: Option<usize>,
        cursor: Option<&str>,
    ) -> Result<Page, StoreError> {
        let start_after = cursor.map(parse_cursor).transpose()?;

        let kinds = self
            .kinds
            .read()
            .map_err(|e| StoreError::backend(format!("lock poisoned: {e}")))?;
        let empty = BTreeMap::new();
        let records = kinds.get(kind).unwrap_or(&empty);

        let limit = limit.unwrap_or(usize::MAX);
        let mut entities: Vec<(String, Record)> = Vec::new();
        let mut next_cursor = None;

        for (key, record) in records.iter().filter(|(_, r)| filter.matches(r)) {
            if let Some(after) = &start_after {
                if key.as_str() <= after.as_str() {
                    continue;
                }
            }
            if entities.len() == limit {
                // More matches remain beyond this page.
                if let Some((last_key, _)) = entities.last() {
                    next_cursor = Some(issue_cursor(last_key));
                }
                break;
            }
            entities.push((key.clone(), record.clone()));
        }

        Ok(Page {
            entities,
            next_cursor,
        })
    }

    async fn update(&self, kind: &str, key: &str, record: Record) -> Result<(), StoreError> {
        let mut kinds = self
            .kinds
            .write()
            .map_err(|e| StoreError::backend(format!("lock poisoned: {e}")))?;
        let records = kinds
            .get_mut(kind)
            .ok_or_else(|| StoreError::not_found(kind, key))?;
        if !records.contains_key(key) {
            return Err(StoreError::not_found(kind, key));
        }
        records.insert(key.to_string(), record);
        Ok(())
    }

    async fn delete(&self, kind: &str, key: &str) -> Result<(), StoreError> {
        let mut kinds = self
            .kinds
            .write()
            .map_err(|e| StoreError::backend(format!("lock poisoned: {e}")))?;
        let removed = kinds.get_mut(kind).and_then(|records| records.remove(key));
        // Zero records affected reads as NotFound.
        removed.map(|_| ()).ok_or_else(|| StoreError::not_found(kind, key))
    }

    async fn count(&self, kind: &str, filter: &Filter) -> Result<usize, StoreError> {
        let kinds = self
            .kinds
            .read()
            .map_err(|e| StoreError::backend(format!("lock poisoned: {e}")))?;
        Ok(kinds
            .get(kind)
            .map(|records| records.values().filter(|r| filter.matches(r)).count())
            .unwrap_or(0))
    }
}
