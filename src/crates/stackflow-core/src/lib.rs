//! # stackflow-core - typed-node workflow execution
//!
//! The execution engine behind Stackflow: a user assembles a small directed
//! pipeline ("stack") of typed processing nodes (query intake, document
//! retrieval, web search, repository ingestion, LLM inference, report
//! rendering) and the engine runs that pipeline against a single query.
//!
//! ## Core pieces
//!
//! - [`graph`] - the node/edge model, the typed [`NodeKind`] configuration
//!   union, and the serde view of the persisted builder definition
//! - [`context`] - the per-run [`ExecutionContext`] accumulator
//! - [`collaborators`] - the trait seams for every external service, plus
//!   the prompt-assembly policy on [`InferenceRequest`]
//! - [`engine`] - the [`WorkflowEngine`] walker
//! - [`error`] - [`StackflowError`]
//!
//! ## Execution model
//!
//! One walk is strictly sequential and single-path: starting at the first
//! query-intake node, each visited node's behavior runs to completion
//! (including any collaborator I/O) before the walk follows the node's first
//! outgoing edge. A missing edge or a dangling target ends the walk
//! normally; a cyclic definition is cut off by a step bound. Collaborator
//! failures become descriptive text in the context rather than aborting the
//! run; the only fatal conditions are a missing entry node and the step
//! bound.
//!
//! ```rust,ignore
//! use stackflow_core::{Graph, WorkflowDef, WorkflowEngine};
//!
//! let def: WorkflowDef = serde_json::from_str(stored_definition)?;
//! let graph = Graph::from_def(&def);
//! graph.validate()?;
//!
//! let engine = WorkflowEngine::new(collaborators);
//! let result = engine.execute(&graph, "summarize the repo").await?;
//! ```

pub mod collaborators;
pub mod context;
mod dispatch;
pub mod engine;
pub mod error;
pub mod graph;

pub use collaborators::{
    Collaborators, DocumentStore, InferenceModel, InferenceRequest, RepoIngestor, ReportRenderer,
    WebSearch, DEFAULT_MODEL, DEFAULT_PROMPT, DEFAULT_REPORT_FILENAME, EMPTY_RESULT_PLACEHOLDER,
};
pub use context::ExecutionContext;
pub use engine::{WorkflowEngine, NO_RESULT_FALLBACK, STEP_LIMIT_FACTOR};
pub use error::{Result, StackflowError};
pub use graph::{Edge, EdgeDef, Graph, Node, NodeData, NodeDef, NodeId, NodeKind, WorkflowDef};
