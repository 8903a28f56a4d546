//! The graph walker.
//!
//! [`WorkflowEngine::execute`] interprets one graph against one query: it
//! finds the entry node, walks the single path defined by each node's first
//! outgoing edge, dispatches every visited node against a fresh
//! [`ExecutionContext`], and returns the accumulated result.
//!
//! The walk is strictly sequential: one node per step, each collaborator
//! call awaited before the next node runs, so a later node can always rely
//! on the context its predecessors wrote. Termination is reached at a node
//! with no outgoing edge, at an edge pointing to a node that does not exist
//! (a dead end, not an error), or at the step bound.
//!
//! # Example
//!
//! ```rust,ignore
//! use stackflow_core::{Graph, NodeKind, WorkflowEngine};
//!
//! let mut graph = Graph::new();
//! graph.add_node("in", NodeKind::QueryIntake);
//! graph.add_node("llm", NodeKind::LlmInference { prompt: None, model: None });
//! graph.add_edge("in", "llm");
//!
//! let engine = WorkflowEngine::new(collaborators);
//! let answer = engine.execute(&graph, "What changed last release?").await?;
//! ```

use crate::collaborators::Collaborators;
use crate::context::ExecutionContext;
use crate::dispatch::dispatch;
use crate::error::{Result, StackflowError};
use crate::graph::Graph;

/// Multiplied by the node count to bound the number of node visits.
///
/// Linear pipelines never get near the bound; a cyclic definition hits it
/// instead of spinning forever.
pub const STEP_LIMIT_FACTOR: usize = 4;

/// Returned when a walk terminates without any node producing a result.
pub const NO_RESULT_FALLBACK: &str = "Workflow ended without a result.";

/// Executes stack graphs against injected collaborators.
///
/// Construct one engine at process start and share it; each call to
/// [`execute`](Self::execute) owns its context exclusively, so concurrent
/// executions do not interact inside the engine.
#[derive(Clone)]
pub struct WorkflowEngine {
    services: Collaborators,
}

impl WorkflowEngine {
    /// Create an engine over the given collaborators.
    pub fn new(services: Collaborators) -> Self {
        Self { services }
    }

    /// Walk `graph` for `query` and return the final result text.
    ///
    /// # Errors
    ///
    /// - [`StackflowError::MissingEntryNode`] when the graph has no
    ///   query-intake node; checked before any collaborator is called.
    /// - [`StackflowError::StepLimitExceeded`] when the walk visits more
    ///   than [`STEP_LIMIT_FACTOR`] × node-count nodes.
    ///
    /// Collaborator failures never surface here; they degrade the context
    /// and, through it, the returned text.
    #[tracing::instrument(skip(self, graph, query), fields(node_count = graph.node_count()))]
    pub async fn execute(&self, graph: &Graph, query: &str) -> Result<String> {
        let entry = graph.entry().ok_or(StackflowError::MissingEntryNode)?;
        let limit = graph.node_count().saturating_mul(STEP_LIMIT_FACTOR).max(1);

        tracing::info!(entry = %entry.id, "starting workflow walk");

        let mut ctx = ExecutionContext::new(query);
        let mut current = Some(entry.id.clone());
        let mut steps = 0usize;

        while let Some(id) = current {
            // An edge to a node that no longer exists ends the walk.
            let Some(node) = graph.node(&id) else {
                tracing::debug!(target = %id, "edge target not found, ending walk");
                break;
            };

            if steps >= limit {
                tracing::error!(limit, "step bound exhausted");
                return Err(StackflowError::StepLimitExceeded { limit });
            }
            steps += 1;

            tracing::debug!(node = %node.id, kind = node.kind.label(), "dispatching node");
            dispatch(node, &mut ctx, &self.services).await;

            current = graph.first_edge_from(&id).map(|e| e.target.clone());
        }

        tracing::info!(steps, has_result = ctx.result.is_some(), "workflow walk finished");
        Ok(ctx.result.unwrap_or_else(|| NO_RESULT_FALLBACK.to_string()))
    }
}
