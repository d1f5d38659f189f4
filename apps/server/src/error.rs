//! Server error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use task_store::TaskStoreError;

/// Machine-readable error codes carried in response bodies.
pub mod error_codes {
    pub const INVALID_REQUEST: &str = "invalid_request";
    pub const NOT_FOUND: &str = "not_found";
    pub const STORE_UNAVAILABLE: &str = "store_unavailable";
    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Invalid request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Store error, mapped to a status code per kind.
    #[error("Store error: {0}")]
    Store(#[from] TaskStoreError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            ServerError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, error_codes::INVALID_REQUEST, msg.clone())
            }
            ServerError::Store(err) => match err {
                TaskStoreError::Validation(_) => {
                    (StatusCode::BAD_REQUEST, error_codes::INVALID_REQUEST, err.to_string())
                }
                TaskStoreError::NotFound(_) => {
                    (StatusCode::NOT_FOUND, error_codes::NOT_FOUND, err.to_string())
                }
                TaskStoreError::Unavailable(_) => {
                    (StatusCode::SERVICE_UNAVAILABLE, error_codes::STORE_UNAVAILABLE, err.to_string())
                }
                TaskStoreError::Database(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, error_codes::INTERNAL_ERROR, err.to_string())
                }
            },
        };

        let body = json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });

        (status, Json(body)).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
