//! Request extractors and content negotiation
//!
//! [`JsonBody`] enforces the `application/json` content type (415) and JSON
//! well-formedness (400) before a mutating handler runs, rejecting with the
//! standard `{"Error": ...}` body. [`negotiate`] checks the `Accept` header
//! for read handlers (406).

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::HeaderMap;
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;

use crate::core::error::ApiError;

/// The representation a read handler should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    Json,
    Html,
}

/// Negotiate the response representation from the `Accept` header.
///
/// A missing header or `*/*` means JSON. `text/html` is only offered by
/// routes that pass `allow_html`. Anything else is 406.
pub fn negotiate(headers: &HeaderMap, allow_html: bool) -> Result<Representation, ApiError> {
    let accept = match headers.get(ACCEPT).and_then(|v| v.to_str().ok()) {
        None => return Ok(Representation::Json),
        Some(accept) => accept,
    };

    if accept.contains("application/json") || accept.contains("*/*") {
        Ok(Representation::Json)
    } else if allow_html && accept.contains("text/html") {
        Ok(Representation::Html)
    } else {
        Err(ApiError::InvalidMediaType)
    }
}

/// Extractor for JSON request bodies.
///
/// Unlike `axum::Json`, rejections are [`ApiError`] values so the error
/// body matches every other failure in the API.
pub struct JsonBody(pub Value);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("application/json"))
            .unwrap_or(false);
        if !is_json {
            return Err(ApiError::UnsupportedMediaType);
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|err| ApiError::InvalidBody {
                message: err.to_string(),
            })?;

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|err| ApiError::InvalidBody {
                message: err.to_string(),
            })
    }
}
