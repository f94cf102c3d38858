//! Router assembly and the root/authentication routes

use axum::extract::{Query, State};
use axum::response::{Html, Json, Redirect};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::error::ApiError;
use crate::core::store::Record;
use crate::entities::{boat, engineering_change, part_change, user};
use crate::server::state::AppState;

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/info", get(info))
        .route("/oauth", get(oauth_callback))
        .merge(boat::router())
        .merge(engineering_change::router())
        .merge(part_change::router())
        .merge(user::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn welcome() -> Html<&'static str> {
    Html(
        "<h1>Drydock</h1>\
         <p>Visit <a href=\"/info\">/info</a> to sign in and obtain a JWT.</p>",
    )
}

/// Redirect the browser to the identity provider's consent screen.
async fn info(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.identity.consent_url())
}

#[derive(Debug, Deserialize)]
struct OauthQuery {
    code: Option<String>,
}

/// Exchange the authorization code for an identity token, lazily create
/// the User record, and hand the token back to the caller.
async fn oauth_callback(
    State(state): State<AppState>,
    Query(query): Query<OauthQuery>,
) -> Result<Json<Value>, ApiError> {
    let code = query.code.ok_or_else(|| ApiError::InvalidBody {
        message: "missing authorization code".to_string(),
    })?;

    let token = state.identity.exchange_code(&code).await?;
    let subject = state.identity.verify(&token).await?;

    // First sign-in creates the user record, keyed by truncated subject.
    let key = subject.user_key();
    if state.store.get(user::KIND, &key).await.is_err() {
        state
            .store
            .insert_named(user::KIND, &key, Record::new())
            .await?;
        tracing::info!(user = %key, "created user record");
    }

    Ok(Json(json!({ "jwt": token })))
}
