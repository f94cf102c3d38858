//! Typed error handling for the API layer
//!
//! Every failure a route can produce is a variant of [`ApiError`]. Each
//! variant knows its HTTP status code, and the `IntoResponse` impl turns it
//! into the wire format used by every error response:
//!
//! ```json
//! {"Error": "<message>"}
//! ```
//!
//! Store-level failures arrive as [`StoreError`](crate::core::store::StoreError)
//! and are converted at the route boundary; backend details are logged but
//! never leaked to the client.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::core::store::StoreError;

/// Errors surfaced by route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An inbound field is not in the whitelist or has the wrong type.
    #[error("Invalid attribute '{field}': {message}")]
    InvalidAttribute { field: String, message: String },

    /// A mandatory field is absent on create or full replace.
    #[error("The request object is missing the required attribute '{field}'")]
    MissingRequired { field: String },

    /// A partial update carried no fields at all.
    #[error("The request object contains no attributes to update")]
    EmptyUpdate,

    /// The request body could not be read as a JSON object.
    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },

    /// Bearer credentials are absent or failed verification.
    #[error("Missing or incorrect JWT.")]
    Unauthenticated,

    /// The verified subject does not own the target entity.
    #[error("Not the owner of this {kind}.")]
    Forbidden { kind: &'static str },

    /// The target entity does not exist.
    #[error("No {kind} with this {kind}_id exists")]
    NotFound { kind: String },

    /// The `Accept` header names no representation we can produce.
    #[error("The requested media type is not supported")]
    InvalidMediaType,

    /// The request body is not `application/json`.
    #[error("The request body must be application/json")]
    UnsupportedMediaType,

    /// Collection-level mutation, or any other unsupported verb.
    #[error("This method is not allowed on this endpoint")]
    MethodNotAllowed,

    /// The backing store failed; details stay in the logs.
    #[error("Internal datastore failure")]
    StoreWrite,
}

impl ApiError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidAttribute { .. }
            | ApiError::MissingRequired { .. }
            | ApiError::EmptyUpdate
            | ApiError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::InvalidMediaType => StatusCode::NOT_ACCEPTABLE,
            ApiError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::StoreWrite => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "Error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, .. } => ApiError::NotFound { kind },
            StoreError::BadCursor => ApiError::InvalidBody {
                message: "unrecognized cursor token".to_string(),
            },
            StoreError::Backend { message } => {
                tracing::error!(%message, "store operation failed");
                ApiError::StoreWrite
            }
        }
    }
}

/// A specialized Result type for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;
