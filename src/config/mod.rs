//! Process configuration
//!
//! Loaded once at startup from the environment and read-only thereafter.

use anyhow::{Context, Result};

pub const DEFAULT_PORT: u16 = 8080;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// OAuth2 client identifier (expected token audience).
    pub client_id: String,

    /// OAuth2 client secret.
    pub client_secret: String,

    /// Redirect URL registered with the identity provider.
    pub redirect_url: String,

    /// Port to listen on.
    pub port: u16,
}

impl AppConfig {
    /// Load configuration from `CLIENT_ID`, `CLIENT_SECRET`, `REDIRECT_URL`
    /// and `PORT` (default 8080).
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("CLIENT_ID").context("CLIENT_ID is not set")?;
        let client_secret = std::env::var("CLIENT_SECRET").context("CLIENT_SECRET is not set")?;
        let redirect_url = std::env::var("REDIRECT_URL").context("REDIRECT_URL is not set")?;
        let port = match std::env::var("PORT") {
            Ok(value) => value.parse().context("PORT is not a valid port number")?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            client_id,
            client_secret,
            redirect_url,
            port,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_url: String::new(),
            port: DEFAULT_PORT,
        }
    }
}
