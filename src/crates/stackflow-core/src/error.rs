//! Error types for graph loading and workflow execution.
//!
//! The engine deliberately keeps its failure surface small: collaborator
//! failures are absorbed at the node boundary and folded into the execution
//! context as descriptive text, so the only errors that cross
//! [`WorkflowEngine::execute`](crate::engine::WorkflowEngine::execute) are a
//! missing entry node and an exhausted step bound.

use thiserror::Error;

/// Convenience result type using [`StackflowError`].
pub type Result<T> = std::result::Result<T, StackflowError>;

/// Errors produced by graph validation and workflow traversal.
#[derive(Error, Debug)]
pub enum StackflowError {
    /// Graph structure validation failed.
    #[error("Workflow validation failed: {0}")]
    Validation(String),

    /// The graph contains no query-intake node to start the walk from.
    ///
    /// This is the one precondition checked before any collaborator is
    /// invoked.
    #[error("Workflow must have a query intake node")]
    MissingEntryNode,

    /// The walk visited more nodes than the configured bound allows.
    ///
    /// Raised instead of looping forever when the definition contains a
    /// cycle.
    #[error("Workflow walk exceeded {limit} steps; the definition likely contains a cycle")]
    StepLimitExceeded {
        /// Maximum number of node visits permitted for this graph.
        limit: usize,
    },

    /// A collaborator call failed.
    ///
    /// Node behaviors normally absorb these into the execution context;
    /// the variant exists so collaborator crates have a typed error to
    /// convert into.
    #[error("Collaborator call failed: {0}")]
    Collaborator(String),

    /// A workflow definition could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StackflowError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a collaborator error.
    pub fn collaborator(message: impl Into<String>) -> Self {
        Self::Collaborator(message.into())
    }
}
