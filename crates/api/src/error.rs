//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common::ParseIdError;
use domain::DomainError;
use record_store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    let status = match &err {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::InvalidQuantity { .. } | DomainError::ValidationFailed(_) => {
            StatusCode::BAD_REQUEST
        }
        DomainError::UsernameTaken(_) => StatusCode::CONFLICT,
        DomainError::Storage(
            StoreError::ConcurrencyConflict { .. } | StoreError::DuplicateKey { .. },
        ) => StatusCode::CONFLICT,
        DomainError::Storage(_) => {
            tracing::error!(error = %err, "storage failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<ParseIdError> for ApiError {
    fn from(err: ParseIdError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}
