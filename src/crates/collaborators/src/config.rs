//! Configuration structures for the provider clients.
//!
//! Clients whose backing service needs a credential keep the key optional:
//! an unconfigured client still constructs, and its calls answer with the
//! explanatory text its contract prescribes instead of failing the walk.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the Gemini API (inference and embeddings).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key; `None` leaves the client constructable but unconfigured.
    pub api_key: Option<String>,

    /// Base URL for the Gemini API.
    pub base_url: String,

    /// Request timeout duration.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Default Gemini API endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com/v1beta";

    /// Create a configuration with an explicit key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: default_timeout(),
        }
    }

    /// Read the key from `GOOGLE_API_KEY`; absence is not an error.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("GOOGLE_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: default_timeout(),
        }
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Configuration for the Chroma vector-store HTTP API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChromaConfig {
    /// Base URL of the Chroma server.
    pub base_url: String,

    /// Request timeout duration.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// How many documents a retrieval returns.
    #[serde(default = "default_n_results")]
    pub n_results: usize,
}

impl ChromaConfig {
    /// Create a configuration for the given server.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: default_timeout(),
            n_results: default_n_results(),
        }
    }

    /// Read `CHROMA_HOST` / `CHROMA_PORT`, defaulting to localhost:8000.
    pub fn from_env() -> Self {
        let host = std::env::var("CHROMA_HOST").unwrap_or_else(|_| "localhost".to_string());
        let port = std::env::var("CHROMA_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8000);
        Self::new(format!("http://{host}:{port}"))
    }
}

impl Default for ChromaConfig {
    fn default() -> Self {
        Self::new("http://localhost:8000")
    }
}

/// Configuration for the SerpAPI web-search client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerpApiConfig {
    /// API key; `None` leaves the client constructable but unconfigured.
    pub api_key: Option<String>,

    /// Base URL for the search API.
    pub base_url: String,

    /// Request timeout duration.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
}

impl SerpApiConfig {
    /// Default SerpAPI endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://serpapi.com";

    /// Create a configuration with an explicit key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: default_timeout(),
        }
    }

    /// Read the key from `SERPAPI_API_KEY`; absence is not an error.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("SERPAPI_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: default_timeout(),
        }
    }
}

/// Configuration for repository ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    /// Directory holding cached clones.
    pub clone_dir: PathBuf,

    /// Files above this size are skipped with a marker.
    pub max_file_bytes: u64,

    /// Total character budget across all concatenated files.
    pub max_context_chars: usize,

    /// Time bound for a fresh shallow clone.
    pub clone_timeout: Duration,

    /// Time bound for refreshing an existing clone.
    pub pull_timeout: Duration,
}

impl GitConfig {
    /// Create a configuration with the given cache directory.
    pub fn new(clone_dir: impl Into<PathBuf>) -> Self {
        Self {
            clone_dir: clone_dir.into(),
            max_file_bytes: 50_000,
            max_context_chars: 120_000,
            clone_timeout: Duration::from_secs(120),
            pull_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self::new("./cloned_repos")
    }
}

/// Configuration for report rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory generated reports are written into.
    pub output_dir: PathBuf,

    /// Title printed in each page header.
    pub title: String,
}

impl ReportConfig {
    /// Create a configuration with the given output directory.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            title: "Stackflow Report".to_string(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self::new("./generated_reports")
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_n_results() -> usize {
    3
}
