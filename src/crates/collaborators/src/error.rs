//! Error types for collaborator implementations.

use thiserror::Error;

/// Result type for collaborator operations.
pub type Result<T> = std::result::Result<T, CollaboratorError>;

/// Errors that can occur inside a provider client.
///
/// Most of these never reach the engine: the clients translate failures into
/// descriptive text (or empty text, for retrieval) per their contracts, and
/// the dispatcher absorbs whatever still escapes.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to serialize/deserialize data.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Required API key is not configured.
    #[error("API key not found: {0}")]
    ApiKeyNotFound(String),

    /// Provider responded with something unusable.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An external command exited unsuccessfully.
    #[error("Command failed: {0}")]
    Command(String),

    /// Operation exceeded its time bound.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Report rendering failed.
    #[error("Report rendering failed: {0}")]
    Render(String),

    /// General provider error.
    #[error("Provider error: {0}")]
    Provider(String),
}

impl From<serde_json::Error> for CollaboratorError {
    fn from(err: serde_json::Error) -> Self {
        CollaboratorError::Serialization(err.to_string())
    }
}

/// Convert into the core error so clients can implement the engine's traits.
impl From<CollaboratorError> for stackflow_core::StackflowError {
    fn from(err: CollaboratorError) -> Self {
        stackflow_core::StackflowError::Collaborator(err.to_string())
    }
}
