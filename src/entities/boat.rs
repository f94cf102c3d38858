//! Boat resource
//!
//! Boats are owned by the subject that created them. Non-public boats are
//! visible to their owner only; public boats are readable by anyone,
//! including through the per-owner listing. Mutations always require the
//! owner.

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header::LOCATION};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use serde_json::Value;

use crate::core::auth::{optional_subject, require_owner, require_subject};
use crate::core::error::ApiError;
use crate::core::extractors::{JsonBody, Representation, negotiate};
use crate::core::schema::{FieldDefault, FieldSpec, FieldType, Schema};
use crate::core::shape::{CollectionQuery, PAGE_SIZE, request_base, self_url, shape_collection, shape_entity};
use crate::core::store::Filter;
use crate::entities::collection_method_not_allowed;
use crate::server::state::AppState;

pub const KIND: &str = "boat";
const COLLECTION: &str = "/boats";

pub fn schema() -> Schema {
    Schema::new(
        KIND,
        vec![
            FieldSpec::required("name", FieldType::String),
            FieldSpec::required("type", FieldType::String),
            FieldSpec::required("length", FieldType::Number),
            FieldSpec::optional(
                "public",
                FieldType::Bool,
                FieldDefault::Literal(Value::Bool(false)),
            ),
        ],
    )
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/boats",
            get(list_boats)
                .post(create_boat)
                .put(collection_method_not_allowed)
                .delete(collection_method_not_allowed),
        )
        .route(
            "/boats/{boat_id}",
            get(get_boat)
                .put(replace_boat)
                .patch(patch_boat)
                .delete(delete_boat),
        )
        .route("/owners/{owner_id}/boats", get(list_owner_boats))
}

async fn create_boat(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: JsonBody,
) -> Result<Response, ApiError> {
    let subject = require_subject(state.identity.as_ref(), &headers).await?;

    let mut record = schema().validate_create(&body.0)?;
    record.insert("owner".to_string(), Value::String(subject.0));

    let key = state.store.insert(KIND, record).await?;
    let stored = state.store.get(KIND, &key).await?;

    let entity = shape_entity(stored, &key, &request_base(&headers), COLLECTION);
    Ok((StatusCode::CREATED, Json(entity)).into_response())
}

/// Owner's boats when authenticated, public boats otherwise.
async fn list_boats(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CollectionQuery>,
) -> Result<Json<Value>, ApiError> {
    let filter = match optional_subject(state.identity.as_ref(), &headers).await {
        Some(subject) => Filter::new().eq("owner", subject.0),
        None => Filter::new().eq("public", true),
    };

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
        true,
    )))
}

/// Public boats belonging to one owner.
async fn list_owner_boats(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(owner_id): Path<String>,
    Query(query): Query<CollectionQuery>,
) -> Result<Json<Value>, ApiError> {
    let filter = Filter::new().eq("owner", owner_id.as_str()).eq("public", true);

    let page = state
        .store
        .list(KIND, &filter, Some(PAGE_SIZE), query.cursor.as_deref())
        .await?;
    let count = state.store.count(KIND, &filter).await?;

    let next_path = format!("/owners/{owner_id}/boats");
    Ok(Json(shape_collection(
        page,
        count,
        &request_base(&headers),
        COLLECTION,
        &next_path,
        true,
    )))
}

async fn get_boat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(boat_id): Path<String>,
) -> Result<Response, ApiError> {
    let repr = negotiate(&headers, true)?;

    let record = state.store.get(KIND, &boat_id).await?;

    let is_public = record
        .get("public")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if !is_public {
        let subject = require_subject(state.identity.as_ref(), &headers).await?;
        if record.get("owner").and_then(Value::as_str) != Some(subject.0.as_str()) {
            return Err(ApiError::Forbidden { kind: KIND });
        }
    }

    let entity = shape_entity(record, &boat_id, &request_base(&headers), COLLECTION);
    match repr {
        Representation::Json => Ok(Json(entity).into_response()),
        Representation::Html => Ok(Html(html_list(&entity)).into_response()),
    }
}

async fn replace_boat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(boat_id): Path<String>,
    body: JsonBody,
) -> Result<Response, ApiError> {
    negotiate(&headers, false)?;
    let subject = require_subject(state.identity.as_ref(), &headers).await?;
    let existing = require_owner(state.store.as_ref(), KIND, &boat_id, &subject).await?;

    let mut record = schema().validate_create(&body.0)?;
    // owner survives a full replace
    if let Some(owner) = existing.get("owner") {
        record.insert("owner".to_string(), owner.clone());
    }

    state.store.update(KIND, &boat_id, record).await?;
    let stored = state.store.get(KIND, &boat_id).await?;

    let base = request_base(&headers);
    let location = self_url(&boat_id, &base, COLLECTION);
    let entity = shape_entity(stored, &boat_id, &base, COLLECTION);
    Ok((StatusCode::SEE_OTHER, [(LOCATION, location)], Json(entity)).into_response())
}

async fn patch_boat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(boat_id): Path<String>,
    body: JsonBody,
) -> Result<Response, ApiError> {
    negotiate(&headers, false)?;
    let subject = require_subject(state.identity.as_ref(), &headers).await?;
    let existing = require_owner(state.store.as_ref(), KIND, &boat_id, &subject).await?;

    let record = schema().validate_patch(&body.0, &existing)?;
    state.store.update(KIND, &boat_id, record).await?;
    let stored = state.store.get(KIND, &boat_id).await?;

    let entity = shape_entity(stored, &boat_id, &request_base(&headers), COLLECTION);
    Ok(Json(entity).into_response())
}

async fn delete_boat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(boat_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let subject = require_subject(state.identity.as_ref(), &headers).await?;
    require_owner(state.store.as_ref(), KIND, &boat_id, &subject).await?;

    state.store.delete(KIND, &boat_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Minimal HTML rendering of one boat for `Accept: text/html`.
fn html_list(entity: &Value) -> String {
    let mut out = String::from("<ul>");
    if let Some(fields) = entity.as_object() {
        for (name, value) in fields {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            out.push_str(&format!("<li>{name}: {rendered}</li>"));
        }
    }
    out.push_str("</ul>");
    out
}
