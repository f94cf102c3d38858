//! User resource
//!
//! Users are created lazily on first successful authentication, keyed by
//! the first 16 characters of the verified subject claim. The only exposed
//! operation is the paginated listing, which carries no per-entity `self`.

use axum::Router;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Json;
use axum::routing::get;
use serde_json::Value;

use crate::core::error::ApiError;
use crate::core::shape::{CollectionQuery, PAGE_SIZE, request_base, shape_collection};
use crate::core::store::Filter;
use crate::server::state::AppState;

pub const KIND: &str = "user";
const COLLECTION: &str = "/users";

pub fn router() -> Router<AppState> {
    Router::new().route("/users", get(list_users))
}

async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CollectionQuery>,
) -> Result<Json<Value>, ApiError> {
    let filter = Filter::new();

    let page = state
        .store
        .list(KIND, &filter, Some(PAGE_SIZE), query.cursor.as_deref())
        .await?;
    let count = state.store.count(KIND, &filter).await?;

    Ok(Json(shape_collection(
        page,
        count,
        &request_base(&headers),
        COLLECTION,
        COLLECTION,
        false,
    )))
}
