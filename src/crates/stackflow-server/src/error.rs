//! HTTP-facing error type.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Errors surfaced by the HTTP layer.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Requested resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The request itself is unusable.
    #[error("{0}")]
    BadRequest(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Upload handling or ingestion failed.
    #[error("Failed to process file: {0}")]
    Upload(String),

    /// Workflow execution failed.
    #[error("Workflow execution failed: {0}")]
    Engine(#[from] stackflow_core::StackflowError),

    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Database(_)
            | ServerError::Upload(_)
            | ServerError::Engine(_)
            | ServerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
