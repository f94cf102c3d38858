//! Identity verification and the ownership gate
//!
//! Bearer tokens are verified against an [`IdentityProvider`], which yields
//! the stable subject claim. Ownership-checked routes then fetch the target
//! entity and compare its recorded `owner` to that subject.
//!
//! Providers are injected through the server state; [`GoogleIdentity`] talks
//! to the real endpoints, [`StaticIdentity`] is a table-driven provider for
//! development and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

use crate::config::AppConfig;
use crate::core::error::ApiError;
use crate::core::store::{EntityStore, Record};

const GOOGLE_CONSENT_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const PROFILE_SCOPE: &str = "https://www.googleapis.com/auth/userinfo.profile";

/// The verified subject claim: the stable user identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject(pub String);

impl Subject {
    /// The first 16 characters of the subject, used as the User record key.
    pub fn user_key(&self) -> String {
        self.0.chars().take(16).collect()
    }
}

/// OAuth2/OpenID Connect identity provider operations.
///
/// The token-exchange protocol itself is delegated; this trait only wires
/// the three calls the routes need.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL of the provider's consent screen (for `GET /info`).
    fn consent_url(&self) -> String;

    /// Exchange an authorization code for an identity token.
    async fn exchange_code(&self, code: &str) -> Result<String, ApiError>;

    /// Verify an identity token against the expected audience and return
    /// the subject claim.
    async fn verify(&self, token: &str) -> Result<Subject, ApiError>;
}

/// Identity provider backed by Google's OAuth2 endpoints.
pub struct GoogleIdentity {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_url: String,
    consent_url: String,
}

impl GoogleIdentity {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let consent_url = reqwest::Url::parse_with_params(
            GOOGLE_CONSENT_URL,
            &[
                ("client_id", config.client_id.as_str()),
                ("redirect_uri", config.redirect_url.as_str()),
                ("response_type", "code"),
                ("scope", PROFILE_SCOPE),
                ("access_type", "online"),
            ],
        )?
        .to_string();

        Ok(Self {
            client: reqwest::Client::new(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_url: config.redirect_url.clone(),
            consent_url,
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentity {
    fn consent_url(&self) -> String {
        self.consent_url.clone()
    }

    async fn exchange_code(&self, code: &str) -> Result<String, ApiError> {
        let params = [
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.redirect_url.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .client
            .post(GOOGLE_TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(%err, "token exchange request failed");
                ApiError::Unauthenticated
            })?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "token exchange rejected");
            return Err(ApiError::Unauthenticated);
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|_| ApiError::Unauthenticated)?;
        body["id_token"]
            .as_str()
            .map(str::to_string)
            .ok_or(ApiError::Unauthenticated)
    }

    async fn verify(&self, token: &str) -> Result<Subject, ApiError> {
        let response = self
            .client
            .get(GOOGLE_TOKENINFO_URL)
            .query(&[("id_token", token)])
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(%err, "token verification request failed");
                ApiError::Unauthenticated
            })?;

        if !response.status().is_success() {
            return Err(ApiError::Unauthenticated);
        }

        let claims: serde_json::Value = response
            .json()
            .await
            .map_err(|_| ApiError::Unauthenticated)?;

        // The token must have been minted for this application.
        if claims["aud"].as_str() != Some(self.client_id.as_str()) {
            return Err(ApiError::Unauthenticated);
        }

        claims["sub"]
            .as_str()
            .map(|sub| Subject(sub.to_string()))
            .ok_or(ApiError::Unauthenticated)
    }
}

/// Table-driven identity provider for development and tests.
///
/// Maps known token strings directly to subject claims; authorization codes
/// are treated as the tokens they would exchange for.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    subjects: HashMap<String, String>,
}

impl StaticIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: &str, subject: &str) -> Self {
        self.subjects.insert(token.to_string(), subject.to_string());
        self
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    fn consent_url(&self) -> String {
        "https://identity.invalid/consent".to_string()
    }

    async fn exchange_code(&self, code: &str) -> Result<String, ApiError> {
        if self.subjects.contains_key(code) {
            Ok(code.to_string())
        } else {
            Err(ApiError::Unauthenticated)
        }
    }

    async fn verify(&self, token: &str) -> Result<Subject, ApiError> {
        self.subjects
            .get(token)
            .map(|sub| Subject(sub.clone()))
            .ok_or(ApiError::Unauthenticated)
    }
}

/// Extract the bearer token from the `Authorization` header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Verify the request's bearer credentials or fail with 401.
pub async fn require_subject(
    identity: &dyn IdentityProvider,
    headers: &HeaderMap,
) -> Result<Subject, ApiError> {
    let token = bearer_token(headers).ok_or(ApiError::Unauthenticated)?;
    identity.verify(token).await
}

/// Verify credentials when present; an absent or invalid token yields
/// `None` so listing routes can fall back to public-only behavior.
pub async fn optional_subject(
    identity: &dyn IdentityProvider,
    headers: &HeaderMap,
) -> Option<Subject> {
    let token = bearer_token(headers)?;
    identity.verify(token).await.ok()
}

/// Fetch the target entity and confirm the subject owns it.
///
/// A missing target is 404 for every kind (the legacy 403-for-missing-boat
/// behavior is not preserved); an owner mismatch is 403.
pub async fn require_owner(
    store: &dyn EntityStore,
    kind: &'static str,
    key: &str,
    subject: &Subject,
) -> Result<Record, ApiError> {
    let record = store.get(kind, key).await?;
    let owner = record.get("owner").and_then(|v| v.as_str());
    if owner != Some(subject.0.as_str()) {
        return Err(ApiError::Forbidden { kind });
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn headers_with_bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(
            bearer_token(&headers_with_bearer("abc123")),
            Some("abc123")
        );
        assert_eq!(bearer_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_user_key_truncates_subject() {
        let subject = Subject("123456789012345678901234".to_string());
        assert_eq!(subject.user_key(), "1234567890123456");

        let short = Subject("abc".to_string());
        assert_eq!(short.user_key(), "abc");
    }

    #[tokio::test]
    async fn test_static_identity_verify() {
        let identity = StaticIdentity::new().with_token("tok-a", "subject-a");
        let subject = identity.verify("tok-a").await.unwrap();
        assert_eq!(subject.0, "subject-a");
        assert!(identity.verify("tok-b").await.is_err());
    }

    #[tokio::test]
    async fn test_require_subject_without_header_is_401() {
        let identity = StaticIdentity::new().with_token("tok-a", "subject-a");
        let err = require_subject(&identity, &HeaderMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_optional_subject_falls_back_to_none() {
        let identity = StaticIdentity::new().with_token("tok-a", "subject-a");
        assert!(optional_subject(&identity, &HeaderMap::new()).await.is_none());
        assert!(
            optional_subject(&identity, &headers_with_bearer("bad-token"))
                .await
                .is_none()
        );
        assert!(
            optional_subject(&identity, &headers_with_bearer("tok-a"))
                .await
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_require_owner_accepts_the_owner() {
        let store = InMemoryStore::new();
        let mut record = Record::new();
        record.insert("owner".to_string(), json!("subject-a"));
        let key = store.insert("boat", record).await.unwrap();

        let subject = Subject("subject-a".to_string());
        let fetched = require_owner(&store, "boat", &key, &subject).await.unwrap();
        assert_eq!(fetched["owner"], json!("subject-a"));
    }

    #[tokio::test]
    async fn test_require_owner_mismatch_is_403() {
        let store = InMemoryStore::new();
        let mut record = Record::new();
        record.insert("owner".to_string(), json!("subject-a"));
        let key = store.insert("boat", record).await.unwrap();

        let subject = Subject("subject-b".to_string());
        let err = require_owner(&store, "boat", &key, &subject)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden { kind: "boat" }));
    }

    #[tokio::test]
    async fn test_require_owner_missing_target_is_404() {
        let store = InMemoryStore::new();
        let subject = Subject("subject-a".to_string());
        let err = require_owner(&store, "boat", "999", &subject)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
    }
}
