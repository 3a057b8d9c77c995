//! Error types for the link shortener
//!
//! Two layers: [`StoreError`] covers everything that can go wrong inside
//! the storage backend, and [`AppError`] is the request-level taxonomy
//! that maps onto HTTP status codes via `IntoResponse`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors produced by the storage layer
#[derive(Debug, Error)]
pub enum StoreError {
    /// The code already exists among live links
    #[error("code '{0}' already exists")]
    Duplicate(String),

    /// Underlying redb failure (transaction, table, commit, ...)
    #[error("storage backend error: {0}")]
    Backend(#[from] redb::Error),

    /// A stored record could not be (de)serialized
    #[error("record serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<redb::TransactionError> for StoreError {
    fn from(err: redb::TransactionError) -> Self {
        StoreError::Backend(err.into())
    }
}

impl From<redb::TableError> for StoreError {
    fn from(err: redb::TableError) -> Self {
        StoreError::Backend(err.into())
    }
}

impl From<redb::StorageError> for StoreError {
    fn from(err: redb::StorageError) -> Self {
        StoreError::Backend(err.into())
    }
}

impl From<redb::CommitError> for StoreError {
    fn from(err: redb::CommitError) -> Self {
        StoreError::Backend(err.into())
    }
}

impl From<redb::DatabaseError> for StoreError {
    fn from(err: redb::DatabaseError) -> Self {
        StoreError::Backend(err.into())
    }
}

/// Request-level errors returned to API clients
///
/// Each variant maps to one HTTP status code. Error responses carry a JSON
/// body of the form `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum AppError {
    /// The targetUrl field did not parse as an absolute URL
    #[error("invalid targetUrl: must be an absolute URL")]
    InvalidUrl,

    /// The requested code does not match the allowed pattern
    #[error("invalid code: must be 6-8 alphanumeric characters")]
    InvalidCode,

    /// A caller-supplied code is already in use
    #[error("code '{0}' is already taken")]
    CodeTaken(String),

    /// Random code generation collided on every attempt
    #[error("failed to generate a unique code")]
    AllocationExhausted,

    /// No link exists for the requested code
    #[error("link not found")]
    NotFound,

    /// The store failed or timed out while serving the request
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(code) => AppError::CodeTaken(code),
            other => AppError::StoreUnavailable(other.to_string()),
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidUrl | AppError::InvalidCode => StatusCode::BAD_REQUEST,
            AppError::CodeTaken(_) => StatusCode::CONFLICT,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::AllocationExhausted | AppError::StoreUnavailable(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // 5xx responses indicate an operational problem worth surfacing in logs
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
