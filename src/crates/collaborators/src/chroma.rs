//! Chroma-backed document retrieval and ingestion.
//!
//! Collections are named after uploaded files; names are sanitized to what
//! Chroma accepts before any call. Retrieval embeds the query with
//! [`GeminiEmbedder`] and asks the collection for the closest documents.
//!
//! The retrieval contract is deliberately soft: a missing collection, an
//! unconfigured embedder, or an unreachable server all come back as *empty
//! text*, never as an error. The walk treats "nothing retrieved" as an
//! ordinary outcome.

use crate::config::ChromaConfig;
use crate::error::{CollaboratorError, Result};
use crate::gemini::GeminiEmbedder;
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use stackflow_core::error::Result as CoreResult;
use stackflow_core::DocumentStore;
use tracing::{debug, warn};

/// Upper bound on characters per ingested chunk.
const MAX_CHUNK_CHARS: usize = 2_000;

/// Chroma vector-store client.
#[derive(Clone)]
pub struct ChromaStore {
    config: ChromaConfig,
    embedder: GeminiEmbedder,
    client: Client,
}

impl ChromaStore {
    /// Create a store over the given server and embedder.
    pub fn new(config: ChromaConfig, embedder: GeminiEmbedder) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            embedder,
            client,
        }
    }

    /// Ingest raw text into a collection, chunked by paragraph.
    ///
    /// Unlike retrieval, ingestion failures are real errors: an upload the
    /// user just performed should not silently vanish.
    pub async fn ingest(&self, text: &str, collection: &str) -> Result<usize> {
        if !self.embedder.is_configured() {
            return Err(CollaboratorError::ApiKeyNotFound("GOOGLE_API_KEY".into()));
        }

        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(CollaboratorError::InvalidResponse(
                "no text content to ingest".into(),
            ));
        }

        let name = sanitize_collection_name(collection);
        let collection_id = self.get_or_create_collection(&name).await?;

        let mut embeddings = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            embeddings.push(self.embedder.embed(chunk, "retrieval_document").await?);
        }

        let ids = (0..chunks.len())
            .map(|i| format!("{name}_{i}"))
            .collect::<Vec<_>>();

        let url = format!(
            "{}/api/v1/collections/{}/upsert",
            self.config.base_url, collection_id
        );
        let response = self
            .client
            .post(&url)
            .json(&UpsertRequest {
                ids,
                embeddings,
                documents: chunks.clone(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CollaboratorError::Provider(format!(
                "Chroma upsert failed with status {}",
                response.status()
            )));
        }

        debug!(collection = %name, chunks = chunks.len(), "ingested document");
        Ok(chunks.len())
    }

    async fn get_or_create_collection(&self, name: &str) -> Result<String> {
        let url = format!("{}/api/v1/collections", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .json(&CreateCollectionRequest {
                name: name.to_string(),
                get_or_create: true,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CollaboratorError::Provider(format!(
                "Chroma collection creation failed with status {}",
                response.status()
            )));
        }

        let body: CollectionResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::InvalidResponse(e.to_string()))?;
        Ok(body.id)
    }

    async fn lookup_collection(&self, name: &str) -> Result<Option<String>> {
        let url = format!("{}/api/v1/collections/{}", self.config.base_url, name);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(CollaboratorError::Provider(format!(
                "Chroma collection lookup failed with status {}",
                response.status()
            )));
        }

        let body: CollectionResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::InvalidResponse(e.to_string()))?;
        Ok(Some(body.id))
    }

    async fn query_collection(&self, collection_id: &str, embedding: Vec<f32>) -> Result<Vec<String>> {
        let url = format!(
            "{}/api/v1/collections/{}/query",
            self.config.base_url, collection_id
        );
        let response = self
            .client
            .post(&url)
            .json(&QueryRequest {
                query_embeddings: vec![embedding],
                n_results: self.config.n_results,
                include: vec!["documents".to_string()],
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CollaboratorError::Provider(format!(
                "Chroma query failed with status {}",
                response.status()
            )));
        }

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::InvalidResponse(e.to_string()))?;

        Ok(body.documents.into_iter().next().unwrap_or_default())
    }

    async fn retrieve_inner(&self, query: &str, collection: &str) -> Result<String> {
        let name = sanitize_collection_name(collection);
        let Some(collection_id) = self.lookup_collection(&name).await? else {
            debug!(collection = %name, "collection not found");
            return Ok(String::new());
        };

        let embedding = self.embedder.embed(query, "retrieval_query").await?;
        let documents = self.query_collection(&collection_id, embedding).await?;
        Ok(documents.join("\n"))
    }
}

#[async_trait]
impl DocumentStore for ChromaStore {
    async fn retrieve(&self, query: &str, collection: &str) -> CoreResult<String> {
        if !self.embedder.is_configured() {
            warn!("knowledge base queried without GOOGLE_API_KEY, returning no context");
            return Ok(String::new());
        }

        match self.retrieve_inner(query, collection).await {
            Ok(text) => Ok(text),
            Err(e) => {
                warn!(collection = %collection, error = %e, "retrieval failed, returning no context");
                Ok(String::new())
            }
        }
    }
}

/// Normalize an arbitrary collection name (usually a filename) to what
/// Chroma accepts: word characters, dots and dashes, 3 to 63 characters.
pub fn sanitize_collection_name(name: &str) -> String {
    let underscored = name.replace(' ', "_");
    let re = Regex::new(r"[^\w.-]").expect("valid regex");
    let mut sanitized = re.replace_all(&underscored, "").to_string();
    if sanitized.len() < 3 {
        sanitized = format!("collection_{sanitized}");
    }
    sanitized.chars().take(63).collect()
}

/// Split text into chunks of at most `max_chars`, preferring paragraph
/// boundaries.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in text.split("\n\n") {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }

        if !current.is_empty() && current.len() + paragraph.len() + 2 > max_chars {
            chunks.push(std::mem::take(&mut current));
        }

        // A single paragraph longer than the budget is split hard.
        if paragraph.len() > max_chars {
            let mut rest = paragraph;
            while rest.len() > max_chars {
                let split_at = rest
                    .char_indices()
                    .take_while(|(i, _)| *i < max_chars)
                    .last()
                    .map(|(i, c)| i + c.len_utf8())
                    .unwrap_or(rest.len());
                chunks.push(rest[..split_at].to_string());
                rest = &rest[split_at..];
            }
            if !rest.is_empty() {
                current = rest.to_string();
            }
            continue;
        }

        if !current.is_empty() {
            current.push_str("\n\n");
        }
        current.push_str(paragraph);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

// Chroma API wire types.

#[derive(Debug, Serialize)]
struct CreateCollectionRequest {
    name: String,
    get_or_create: bool,
}

#[derive(Debug, Deserialize)]
struct CollectionResponse {
    id: String,
}

#[derive(Debug, Serialize)]
struct QueryRequest {
    query_embeddings: Vec<Vec<f32>>,
    n_results: usize,
    include: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    documents: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct UpsertRequest {
    ids: Vec<String>,
    embeddings: Vec<Vec<f32>>,
    documents: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeminiConfig;

    #[test]
    fn sanitize_strips_and_pads() {
        assert_eq!(sanitize_collection_name("my report.pdf"), "my_report.pdf");
        assert_eq!(sanitize_collection_name("a b?!"), "a_b");
        assert_eq!(sanitize_collection_name("x"), "collection_x");

        let long = "a".repeat(100);
        assert_eq!(sanitize_collection_name(&long).len(), 63);
    }

    #[test]
    fn chunking_respects_paragraphs_and_budget() {
        let text = "first paragraph\n\nsecond paragraph\n\nthird";
        let chunks = chunk_text(text, 35);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].contains("first paragraph"));
        assert!(chunks[0].contains("second paragraph"));
        assert_eq!(chunks[1], "third");
    }

    #[test]
    fn oversized_paragraph_is_split_hard() {
        let text = "x".repeat(4_500);
        let chunks = chunk_text(&text, 2_000);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.len() <= 2_000));
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunk_text("\n\n  \n\n", 100).is_empty());
    }

    #[tokio::test]
    async fn unconfigured_store_retrieves_nothing() {
        let embedder = GeminiEmbedder::new(GeminiConfig {
            api_key: None,
            base_url: GeminiConfig::DEFAULT_BASE_URL.to_string(),
            timeout: std::time::Duration::from_secs(5),
        });
        let store = ChromaStore::new(ChromaConfig::default(), embedder);

        let text = store.retrieve("anything", "doc1").await.unwrap();
        assert_eq!(text, "");
    }
}
