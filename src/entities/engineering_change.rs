//! Engineering change resource
//!
//! Owner-gated throughout: every operation, including listing, requires a
//! verified subject, and records are only ever visible to their owner.
//! `parts_changed` starts empty; no exposed operation links parts to a
//! change.

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header::LOCATION};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use serde_json::Value;

use crate::core::auth::{require_owner, require_subject};
use crate::core::error::ApiError;
use crate::core::extractors::{JsonBody, negotiate};
use crate::core::schema::{FieldDefault, FieldSpec, FieldType, Schema};
use crate::core::shape::{CollectionQuery, PAGE_SIZE, request_base, self_url, shape_collection, shape_entity};
use crate::core::store::Filter;
use crate::entities::collection_method_not_allowed;
use crate::server::state::AppState;

pub const KIND: &str = "engineering_change";
const COLLECTION: &str = "/engineering_changes";

pub fn schema() -> Schema {
    Schema::new(
        KIND,
        vec![
            FieldSpec::required("history", FieldType::String),
            FieldSpec::required("plan", FieldType::String),
            FieldSpec::optional(
                "type",
                FieldType::String,
                FieldDefault::Literal(Value::String("fast".to_string())),
            ),
            FieldSpec::optional("date_created", FieldType::String, FieldDefault::CurrentDate),
            FieldSpec::optional(
                "parts_changed",
                FieldType::List,
                FieldDefault::Literal(Value::Array(Vec::new())),
            ),
        ],
    )
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/engineering_changes",
            get(list_changes)
                .post(create_change)
                .put(collection_method_not_allowed)
                .delete(collection_method_not_allowed),
        )
        .route(
            "/engineering_changes/{change_id}",
            get(get_change)
                .put(replace_change)
                .patch(patch_change)
                .delete(delete_change),
        )
}

async fn create_change(
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

async fn list_changes(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CollectionQuery>,
) -> Result<Json<Value>, ApiError> {
    let subject = require_subject(state.identity.as_ref(), &headers).await?;
    let filter = Filter::new().eq("owner", subject.0);

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

async fn get_change(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(change_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    negotiate(&headers, false)?;
    let subject = require_subject(state.identity.as_ref(), &headers).await?;
    let record = require_owner(state.store.as_ref(), KIND, &change_id, &subject).await?;

    Ok(Json(shape_entity(
        record,
        &change_id,
        &request_base(&headers),
        COLLECTION,
    )))
}

async fn replace_change(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(change_id): Path<String>,
    body: JsonBody,
) -> Result<Response, ApiError> {
    negotiate(&headers, false)?;
    let subject = require_subject(state.identity.as_ref(), &headers).await?;
    let existing = require_owner(state.store.as_ref(), KIND, &change_id, &subject).await?;

    let mut record = schema().validate_create(&body.0)?;
    if let Some(owner) = existing.get("owner") {
        record.insert("owner".to_string(), owner.clone());
    }

    state.store.update(KIND, &change_id, record).await?;
    let stored = state.store.get(KIND, &change_id).await?;

    let base = request_base(&headers);
    let location = self_url(&change_id, &base, COLLECTION);
    let entity = shape_entity(stored, &change_id, &base, COLLECTION);
    Ok((StatusCode::SEE_OTHER, [(LOCATION, location)], Json(entity)).into_response())
}

async fn patch_change(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(change_id): Path<String>,
    body: JsonBody,
) -> Result<Json<Value>, ApiError> {
    negotiate(&headers, false)?;
    let subject = require_subject(state.identity.as_ref(), &headers).await?;
    let existing = require_owner(state.store.as_ref(), KIND, &change_id, &subject).await?;

    let record = schema().validate_patch(&body.0, &existing)?;
    state.store.update(KIND, &change_id, record).await?;
    let stored = state.store.get(KIND, &change_id).await?;

    Ok(Json(shape_entity(
        stored,
        &change_id,
        &request_base(&headers),
        COLLECTION,
    )))
}

async fn delete_change(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(change_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let subject = require_subject(state.identity.as_ref(), &headers).await?;
    require_owner(state.store.as_ref(), KIND, &change_id, &subject).await?;

    state.store.delete(KIND, &change_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
