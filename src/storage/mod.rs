//! Storage backends implementing the EntityStore trait
//!
//! The remote document store engine is opaque to this crate; everything
//! behind [`EntityStore`](crate::core::store::EntityStore) is swappable.
//! The in-memory backend serves development and tests.

pub mod in_memory;

pub use in_memory::InMemoryStore;
