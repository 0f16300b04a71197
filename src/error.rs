//! Error types for the store stack
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Store Error Enum ==
/// Unified error type for stores, cache layers and the HTTP surface.
///
/// Programming errors (such as `write_through(0)`) are not represented here;
/// they panic.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Key violates the store's key constraints
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Value violates the store's value constraints
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Key has no value in the merged view
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Malformed request at the HTTP boundary
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Failure reported by an underlying store
    #[error("Backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Convenience constructor for backend failures.
    pub fn backend(message: impl Into<String>) -> Self {
        StoreError::Backend(message.into())
    }

    /// Returns true for key/value validation failures.
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::InvalidKey(_) | StoreError::InvalidValue(_))
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match &self {
            StoreError::InvalidKey(_)
            | StoreError::InvalidValue(_)
            | StoreError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the store stack.
pub type Result<T> = std::result::Result<T, StoreError>;
