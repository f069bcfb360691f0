use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when requesting an embedding
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Embedding request timed out after {0:?}")]
    Timeout(Duration),
}

/// Turns text into a fixed-length vector
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// OpenAI-compatible `/embeddings` client
pub struct OpenAiEmbeddingClient {
    base_url: String,
    path: String,
    api_key: String,
    model: String,
    client: Client,
}

impl OpenAiEmbeddingClient {
    /// Create a new embedding client
    pub fn new(
        base_url: String,
        path: String,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, EmbeddingError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            path,
            api_key,
            model,
            client,
        })
    }
}

#[async_trait]
impl EmbeddingService for OpenAiEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), self.path);

        tracing::debug!("Requesting embedding from: {} (model: {})", url, self.model);

        let body = serde_json::json!({
            "model": self.model,
            "input": text,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EmbeddingError::ApiError(format!(
                "Failed to create embedding: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        parse_embedding_response(&json)
    }
}

/// Extract `data[0].embedding` from an embeddings response
fn parse_embedding_response(json: &Value) -> Result<Vec<f32>, EmbeddingError> {
    let embedding = json
        .get("data")
        .and_then(|d| d.as_array())
        .and_then(|d| d.first())
        .and_then(|item| item.get("embedding"))
        .and_then(|e| e.as_array())
        .ok_or_else(|| EmbeddingError::InvalidResponse("Missing data[0].embedding array".into()))?;

    embedding
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|n| n as f32)
                .ok_or_else(|| EmbeddingError::InvalidResponse("Embedding value must be numeric".into()))
        })
        .collect()
}
