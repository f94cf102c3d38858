//! Part change resource
//!
//! Part changes carry no ownership gate; any caller may read or mutate
//! them. The `engineering_change_id` back-reference is initialized to null
//! and no exposed operation ever populates it — the relationship is
//! planned but unimplemented.

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header::LOCATION};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use serde_json::Value;

use crate::core::error::ApiError;
use crate::core::extractors::{JsonBody, negotiate};
use crate::core::schema::{FieldSpec, FieldType, Schema};
use crate::core::shape::{CollectionQuery, PAGE_SIZE, request_base, self_url, shape_collection, shape_entity};
use crate::core::store::Filter;
use crate::entities::collection_method_not_allowed;
use crate::server::state::AppState;

pub const KIND: &str = "part_change";
const COLLECTION: &str = "/part_changes";

pub fn schema() -> Schema {
    Schema::new(
        KIND,
        vec![
            FieldSpec::required("file_name", FieldType::String),
            FieldSpec::required("date_created", FieldType::String),
            FieldSpec::required("revision", FieldType::String),
            FieldSpec::required("change", FieldType::String),
        ],
    )
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/part_changes",
            get(list_parts)
                .post(create_part)
                .put(collection_method_not_allowed)
                .delete(collection_method_not_allowed),
        )
        .route(
            "/part_changes/{part_id}",
            get(get_part)
                .put(replace_part)
                .patch(patch_part)
                .delete(delete_part),
        )
}

async fn create_part(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: JsonBody,
) -> Result<Response, ApiError> {
    let mut record = schema().validate_create(&body.0)?;
    record.insert("engineering_change_id".to_string(), Value::Null);

    let key = state.store.insert(KIND, record).await?;
    let stored = state.store.get(KIND, &key).await?;

    let entity = shape_entity(stored, &key, &request_base(&headers), COLLECTION);
    Ok((StatusCode::CREATED, Json(entity)).into_response())
}

async fn list_parts(
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
        true,
    )))
}

async fn get_part(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(part_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    negotiate(&headers, false)?;
    let record = state.store.get(KIND, &part_id).await?;

    Ok(Json(shape_entity(
        record,
        &part_id,
        &request_base(&headers),
        COLLECTION,
    )))
}

async fn replace_part(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(part_id): Path<String>,
    body: JsonBody,
) -> Result<Response, ApiError> {
    negotiate(&headers, false)?;
    let existing = state.store.get(KIND, &part_id).await?;

    let mut record = schema().validate_create(&body.0)?;
    // the back-reference is system-managed and survives a full replace
    if let Some(back_ref) = existing.get("engineering_change_id") {
        record.insert("engineering_change_id".to_string(), back_ref.clone());
    }

    state.store.update(KIND, &part_id, record).await?;
    let stored = state.store.get(KIND, &part_id).await?;

    let base = request_base(&headers);
    let location = self_url(&part_id, &base, COLLECTION);
    let entity = shape_entity(stored, &part_id, &base, COLLECTION);
    Ok((StatusCode::SEE_OTHER, [(LOCATION, location)], Json(entity)).into_response())
}

async fn patch_part(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(part_id): Path<String>,
    body: JsonBody,
) -> Result<Json<Value>, ApiError> {
    negotiate(&headers, false)?;
    let existing = state.store.get(KIND, &part_id).await?;

    let record = schema().validate_patch(&body.0, &existing)?;
    state.store.update(KIND, &part_id, record).await?;
    let stored = state.store.get(KIND, &part_id).await?;

    Ok(Json(shape_entity(
        stored,
        &part_id,
        &request_base(&headers),
        COLLECTION,
    )))
}

async fn delete_part(
    State(state): State<AppState>,
    Path(part_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.delete(KIND, &part_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_requires_all_four_fields() {
        let err = schema()
            .validate_create(&json!({
                "file_name": "hull.dwg", "date_created": "01/02/2024", "revision": "B"
            }))
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingRequired { field } if field == "change"));
    }

    #[test]
    fn test_back_reference_is_not_writable() {
        let err = schema()
            .validate_create(&json!({
                "file_name": "hull.dwg", "date_created": "01/02/2024",
                "revision": "B", "change": "widened keel",
                "engineering_change_id": "7"
            }))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidAttribute { .. }));
    }
}
