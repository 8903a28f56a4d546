//! Google Gemini clients: text generation and embeddings.
//!
//! [`GeminiClient`] implements the engine's [`InferenceModel`] seam against
//! the `generateContent` endpoint; [`GeminiEmbedder`] produces the vectors
//! the Chroma store searches with.
//!
//! Per the inference contract, a missing key or a failed upstream call does
//! not error out of [`InferenceModel::infer`]; the reply is a descriptive
//! `Error: ...` string the walk carries forward as its (degraded) result.

use crate::config::GeminiConfig;
use crate::error::{CollaboratorError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use stackflow_core::error::Result as CoreResult;
use stackflow_core::{InferenceModel, InferenceRequest};
use tracing::warn;

/// Embedding model used for both ingestion and retrieval.
pub const EMBEDDING_MODEL: &str = "models/text-embedding-004";

/// Gemini text-generation client.
#[derive(Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

impl GeminiClient {
    /// Create a new Gemini client with the given configuration.
    pub fn new(config: GeminiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    async fn generate(&self, api_key: &str, model: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.config.base_url, model);

        let req_body = GenerateRequest {
            contents: vec![GeminiMessage {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        // Gemini takes the API key as a query parameter.
        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&req_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(if status.as_u16() == 401 || status.as_u16() == 403 {
                CollaboratorError::ApiKeyNotFound(error_text)
            } else {
                CollaboratorError::Provider(format!("Gemini API error {status}: {error_text}"))
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::InvalidResponse(e.to_string()))?;

        let candidate = body
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| CollaboratorError::InvalidResponse("no candidates returned".into()))?;

        Ok(candidate
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join(""))
    }
}

#[async_trait]
impl InferenceModel for GeminiClient {
    async fn infer(&self, request: InferenceRequest) -> CoreResult<String> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Ok("Error: GOOGLE_API_KEY is not set in the environment.".to_string());
        };

        let prompt = request.assemble_prompt();
        match self.generate(api_key, &request.model, &prompt).await {
            Ok(text) => Ok(text),
            Err(e) => {
                warn!(model = %request.model, error = %e, "Gemini call failed");
                Ok(format!(
                    "Error: could not get a response from the model. Details: {e}"
                ))
            }
        }
    }
}

/// Gemini embedding client.
#[derive(Clone)]
pub struct GeminiEmbedder {
    config: GeminiConfig,
    client: Client,
}

impl GeminiEmbedder {
    /// Create a new embedder with the given configuration.
    pub fn new(config: GeminiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Whether a key is present.
    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Embed one text with the given task type (`retrieval_query` for
    /// searches, `retrieval_document` for ingestion).
    pub async fn embed(&self, text: &str, task_type: &str) -> Result<Vec<f32>> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| CollaboratorError::ApiKeyNotFound("GOOGLE_API_KEY".into()))?;

        let url = format!("{}/{}:embedContent", self.config.base_url, EMBEDDING_MODEL);

        let req_body = EmbedRequest {
            model: EMBEDDING_MODEL.to_string(),
            content: GeminiContent {
                parts: vec![GeminiPart {
                    text: text.to_string(),
                }],
            },
            task_type: task_type.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&req_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::Provider(format!(
                "Gemini embedding error {status}: {error_text}"
            )));
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::InvalidResponse(e.to_string()))?;

        Ok(body.embedding.values)
    }
}

// Gemini API wire types.

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<GeminiMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiMessage {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiResponseContent,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    content: GeminiContent,
    #[serde(rename = "taskType")]
    task_type: String,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    #[serde(default)]
    values: Vec<f32>,
}
