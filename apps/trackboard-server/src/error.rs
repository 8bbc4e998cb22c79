//! API error taxonomy and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use trackboard_storage::StoreError;

/// Errors a handler can surface to the client.
#[derive(Debug)]
pub enum ApiError {
    /// The actor is anonymous, lacks admin rights, or the resource does not
    /// exist. All three render as 404 with an empty body so a denial never
    /// confirms that a board or permission exists.
    NotAuthorized,
    /// Field-scoped validation failure: `{"errors": {field: [codes]}}`.
    Validation {
        field: &'static str,
        codes: Vec<&'static str>,
    },
    /// Business-rule failure, not tied to a field: `{"errors": [code]}`.
    Rule(&'static str),
    /// Storage backend fault. Logged, never detailed to the client.
    Internal(String),
}

impl ApiError {
    pub fn validation(field: &'static str, code: &'static str) -> Self {
        ApiError::Validation {
            field,
            codes: vec![code],
        }
    }
}

/// Map a storage fault into the opaque internal variant.
///
/// `NotFound`/`AlreadyExists` carry meaning per call site, so handlers match
/// those explicitly; only reach for this in the fallthrough arm.
pub fn internal(e: StoreError) -> ApiError {
    ApiError::Internal(e.to_string())
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotAuthorized => (StatusCode::NOT_FOUND, ()).into_response(),
            ApiError::Validation { field, codes } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "errors": { field: codes } })),
            )
                .into_response(),
            ApiError::Rule(code) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "errors": [code] })),
            )
                .into_response(),
            ApiError::Internal(msg) => {
                tracing::error!("storage failure: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, ()).into_response()
            }
        }
    }
}
