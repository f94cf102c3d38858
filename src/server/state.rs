//! Shared application state
//!
//! The store and identity provider are constructed at startup and injected
//! here rather than held as module globals, so tests can substitute
//! doubles for both.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::auth::IdentityProvider;
use crate::core::store::EntityStore;

/// State handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn EntityStore>,
        identity: Arc<dyn IdentityProvider>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            store,
            identity,
            config,
        }
    }
}
