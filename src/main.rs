//! Service entry point

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use drydock::config::AppConfig;
use drydock::core::auth::GoogleIdentity;
use drydock::server::{AppState, build_router};
use drydock::storage::InMemoryStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("drydock=info,tower_http=info")),
        )
        .init();

    let config = Arc::new(AppConfig::from_env()?);
    let identity = Arc::new(GoogleIdentity::new(&config)?);
    let store = Arc::new(InMemoryStore::new());

    let app = build_router(AppState::new(store, identity, config.clone()));

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
