//! Shared harness for route tests
//!
//! Builds the full router against the in-memory store and a table-driven
//! identity provider, so every test exercises the real handler stack.

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::http::header::AUTHORIZATION;
use axum_test::TestServer;
use serde_json::{Value, json};

use drydock::config::AppConfig;
use drydock::core::auth::StaticIdentity;
use drydock::server::{AppState, build_router};
use drydock::storage::InMemoryStore;

pub const ALICE_TOKEN: &str = "token-alice";
pub const ALICE_SUBJECT: &str = "alice-subject-1234567890";
pub const BOB_TOKEN: &str = "token-bob";
pub const BOB_SUBJECT: &str = "bob-subject-0987654321";

pub fn test_server() -> TestServer {
    let identity = StaticIdentity::new()
        .with_token(ALICE_TOKEN, ALICE_SUBJECT)
        .with_token(BOB_TOKEN, BOB_SUBJECT);

    let state = AppState::new(
        Arc::new(InMemoryStore::new()),
        Arc::new(identity),
        Arc::new(AppConfig::default()),
    );

    TestServer::new(build_router(state))
}

pub fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).expect("invalid bearer header")
}

pub fn auth_header() -> (axum::http::HeaderName, HeaderValue) {
    (AUTHORIZATION, bearer(ALICE_TOKEN))
}

/// A valid boat creation payload.
pub fn boat_payload(name: &str, public: bool) -> Value {
    json!({ "name": name, "type": "sloop", "length": 28.5, "public": public })
}

/// Create a boat as the given token's subject and return the shaped entity.
pub async fn create_boat(server: &TestServer, token: &str, name: &str, public: bool) -> Value {
    let response = server
        .post("/boats")
        .add_header(AUTHORIZATION, bearer(token))
        .json(&boat_payload(name, public))
        .await;
    assert_eq!(response.status_code(), axum::http::StatusCode::CREATED);
    response.json::<Value>()
}

/// Create an engineering change and return the shaped entity.
pub async fn create_change(server: &TestServer, token: &str, history: &str) -> Value {
    let response = server
        .post("/engineering_changes")
        .add_header(AUTHORIZATION, bearer(token))
        .json(&json!({ "history": history, "plan": "replace rigging" }))
        .await;
    assert_eq!(response.status_code(), axum::http::StatusCode::CREATED);
    response.json::<Value>()
}

/// Extract the path-and-query portion of an absolute `next` URL.
pub fn next_path(envelope: &Value) -> Option<String> {
    envelope.get("next").and_then(Value::as_str).map(|url| {
        let idx = url.find('/').expect("next url has no path");
        // skip past the scheme's "//" to the path
        let after_scheme = url.find("://").map(|i| i + 3).unwrap_or(0);
        let path_start = url[after_scheme..]
            .find('/')
            .map(|i| after_scheme + i)
            .unwrap_or(idx);
        url[path_start..].to_string()
    })
}
