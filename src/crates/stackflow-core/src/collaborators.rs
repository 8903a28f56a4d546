//! Collaborator traits at the engine's service seams.
//!
//! The engine is an orchestrator, not a client library: every node behavior
//! that talks to the outside world does so through one of the traits below,
//! and concrete clients (vector store, search API, git, model providers,
//! report writers) are injected once at construction time as `Arc<dyn ...>`.
//! The `collaborators` crate ships the production implementations; tests
//! substitute mocks.
//!
//! All trait methods return [`Result`] so implementations keep a typed error,
//! but the dispatcher is the absorption boundary: a failing collaborator
//! becomes descriptive text in the execution context, never an aborted walk.

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Default persona used when an inference node configures no prompt.
pub const DEFAULT_PROMPT: &str = "You are a helpful assistant.";

/// Default model used when an inference node configures none.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

/// Default output filename for report nodes.
pub const DEFAULT_REPORT_FILENAME: &str = "report.pdf";

/// Body rendered when a report node runs before any result exists.
pub const EMPTY_RESULT_PLACEHOLDER: &str = "No result was produced by the workflow.";

/// Retrieves document snippets relevant to a query from a named collection.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Return relevant snippets as one text block.
    ///
    /// Implementations return empty text (not an error) when the collection
    /// is absent or retrieval is unconfigured.
    async fn retrieve(&self, query: &str, collection: &str) -> Result<String>;
}

/// Searches the web and summarizes the top results.
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Return the top results as repeated title/snippet pairs.
    async fn search(&self, query: &str) -> Result<String>;
}

/// Fetches a remote repository and flattens it into bounded text.
#[async_trait]
pub trait RepoIngestor: Send + Sync {
    /// Accepts a full URL or an `owner/repo` shorthand.
    async fn fetch(&self, repo_ref: &str) -> Result<String>;
}

/// Produces a free-text completion for an assembled request.
#[async_trait]
pub trait InferenceModel: Send + Sync {
    /// Run inference. Credential and upstream failures come back as
    /// descriptive text in the `Ok` channel, mirroring how the rest of the
    /// walk treats degraded context.
    async fn infer(&self, request: InferenceRequest) -> Result<String>;
}

/// Serializes text into a paginated report document.
#[async_trait]
pub trait ReportRenderer: Send + Sync {
    /// Render `content` to `filename`, returning a human-readable outcome
    /// message. The engine never reads the produced file back.
    async fn render(&self, content: &str, filename: &str) -> Result<String>;
}

/// The full set of injected collaborators an engine runs against.
#[derive(Clone)]
pub struct Collaborators {
    /// Document retrieval backend.
    pub documents: Arc<dyn DocumentStore>,
    /// Web search backend.
    pub web: Arc<dyn WebSearch>,
    /// Repository ingestion backend.
    pub repos: Arc<dyn RepoIngestor>,
    /// Language-model inference backend.
    pub inference: Arc<dyn InferenceModel>,
    /// Report rendering backend.
    pub reports: Arc<dyn ReportRenderer>,
}

/// Everything an inference collaborator needs for one completion.
///
/// Contexts are carried as separate channels; `None` is the explicit
/// "nothing was gathered" signal, distinct from an empty string a
/// collaborator actually produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceRequest {
    /// Persona / instruction prefix.
    pub prompt: String,
    /// The user's question.
    pub query: String,
    /// Knowledge-base context, if a retrieval node ran.
    pub doc_context: Option<String>,
    /// Repository context, if a git node ran.
    pub repo_context: Option<String>,
    /// Web-search context, if a search node ran.
    pub web_context: Option<String>,
    /// Model identifier to run against.
    pub model: String,
}

impl InferenceRequest {
    /// Flatten the request into the single prompt sent upstream.
    ///
    /// Document and repository contexts are emitted as labeled sections in
    /// that fixed order, joined by a line break, under one shared
    /// instruction; web results form their own section so the model can
    /// weigh them separately. Absent channels produce no section at all.
    pub fn assemble_prompt(&self) -> String {
        let mut prompt = String::with_capacity(self.prompt.len() + 256);
        prompt.push_str(&self.prompt);

        if self.doc_context.is_some() || self.repo_context.is_some() {
            prompt.push_str(
                "\n\nUse the following context to answer the user's question. \
                 If the answer is not in the context, say so.",
            );
            let mut sections = Vec::with_capacity(2);
            if let Some(doc) = &self.doc_context {
                sections.push(format!(
                    "--- DOCUMENT CONTEXT START ---\n{doc}\n--- DOCUMENT CONTEXT END ---"
                ));
            }
            if let Some(repo) = &self.repo_context {
                sections.push(format!(
                    "--- REPOSITORY CONTEXT START ---\n{repo}\n--- REPOSITORY CONTEXT END ---"
                ));
            }
            prompt.push('\n');
            prompt.push_str(&sections.join("\n"));
        }

        if let Some(web) = &self.web_context {
            prompt.push_str("\n\nYou may also use these web search results.\n");
            prompt.push_str(&format!(
                "--- WEB SEARCH RESULTS START ---\n{web}\n--- WEB SEARCH RESULTS END ---"
            ));
        }

        prompt.push_str("\n\nUser Question: ");
        prompt.push_str(&self.query);
        prompt
    }
}
