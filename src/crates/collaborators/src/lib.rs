//! # collaborators - provider clients for the Stackflow engine
//!
//! Concrete implementations of the trait seams `stackflow-core` executes
//! against:
//!
//! - [`chroma::ChromaStore`] - document retrieval and ingestion over the
//!   Chroma HTTP API, embedding with Gemini
//! - [`serpapi::SerpApiClient`] - web search summaries via SerpAPI
//! - [`git::GitIngestor`] - shallow-cloned, budget-bounded repository text
//! - [`gemini::GeminiClient`] - Gemini text generation
//! - [`report::PdfRenderer`] - paginated PDF reports via printpdf
//!
//! Each client is constructed once from its config (usually at process
//! start) and injected into the engine as an `Arc<dyn ...>`. The clients obey
//! the engine's degrade-don't-crash discipline: missing credentials and
//! upstream failures become explanatory text or empty context, never a walk
//! abort.

pub mod chroma;
pub mod config;
pub mod error;
pub mod gemini;
pub mod git;
pub mod report;
pub mod serpapi;

pub use chroma::ChromaStore;
pub use config::{ChromaConfig, GeminiConfig, GitConfig, ReportConfig, SerpApiConfig};
pub use error::{CollaboratorError, Result};
pub use gemini::{GeminiClient, GeminiEmbedder};
pub use git::GitIngestor;
pub use report::PdfRenderer;
pub use serpapi::SerpApiClient;
