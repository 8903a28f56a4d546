//! Per-run execution state threaded through the walk.

/// Mutable record accumulated across one walk of a graph.
///
/// Created fresh for every execution, mutated in place by each dispatched
/// node, and discarded once the walk ends; only [`result`](Self::result) (or
/// the engine's fallback text) survives. `None` means a context was never
/// produced, which downstream consumers treat differently from an empty
/// string a collaborator actually returned.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    /// The original user query, unchanged for the lifetime of the walk.
    pub query: String,
    /// Text contributed by a knowledge-base node.
    pub kb_context: Option<String>,
    /// Text contributed by a web-search node.
    pub web_context: Option<String>,
    /// Text contributed by a git-repo node.
    pub repo_context: Option<String>,
    /// Final answer contributed by an inference node.
    pub result: Option<String>,
}

impl ExecutionContext {
    /// Start a fresh context for the given query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}
