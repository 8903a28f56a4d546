//! SerpAPI-backed web search.
//!
//! Summarizes the top organic Google results as repeated title/snippet
//! pairs. An unconfigured key or a transport failure becomes explanatory
//! text rather than an error, so a search node can never sink the walk.

use crate::config::SerpApiConfig;
use crate::error::{CollaboratorError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use stackflow_core::error::Result as CoreResult;
use stackflow_core::WebSearch;
use tracing::warn;

/// How many organic results make it into the summary.
const MAX_RESULTS: usize = 3;

/// SerpAPI search client.
#[derive(Clone)]
pub struct SerpApiClient {
    config: SerpApiConfig,
    client: Client,
}

impl SerpApiClient {
    /// Create a new search client with the given configuration.
    pub fn new(config: SerpApiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    async fn top_results(&self, api_key: &str, query: &str) -> Result<Vec<OrganicResult>> {
        let url = format!("{}/search.json", self.config.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("engine", "google"), ("q", query), ("api_key", api_key)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CollaboratorError::Provider(format!(
                "SerpAPI error {}",
                response.status()
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::InvalidResponse(e.to_string()))?;

        Ok(body.organic_results)
    }
}

#[async_trait]
impl WebSearch for SerpApiClient {
    async fn search(&self, query: &str) -> CoreResult<String> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Ok("Error: SERPAPI_API_KEY is not set.".to_string());
        };

        match self.top_results(api_key, query).await {
            Ok(results) => Ok(format_results(&results)),
            Err(e) => {
                warn!(error = %e, "web search failed");
                Ok(format!("Error performing web search: {e}"))
            }
        }
    }
}

/// Format the top results into a readable summary.
fn format_results(results: &[OrganicResult]) -> String {
    let mut output = String::new();
    for result in results.iter().take(MAX_RESULTS) {
        output.push_str(&format!(
            "Title: {}\nSnippet: {}\n\n",
            result.title.as_deref().unwrap_or("N/A"),
            result.snippet.as_deref().unwrap_or("N/A"),
        ));
    }

    if output.is_empty() {
        "No web search results found.".to_string()
    } else {
        output
    }
}

// SerpAPI wire types.

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}
