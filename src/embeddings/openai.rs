// OpenAI embeddings over HTTP
//
// POSTs to {api_base}/embeddings with a bearer key. The key comes in through
// the constructor; nothing here reads the environment.

use super::EmbeddingProvider;
use crate::error::{FastCmdError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_DIMENSION: usize = 1536;

pub struct OpenAiEmbeddings {
    client: Client,
    api_key: String,
    model: String,
    dimension: usize,
    api_base: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl OpenAiEmbeddings {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        dimension: usize,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            dimension,
            api_base: api_base.into(),
        }
    }

    /// ada-002 against api.openai.com
    pub fn with_defaults(api_key: impl Into<String>) -> Self {
        Self::new(api_key, DEFAULT_MODEL, DEFAULT_DIMENSION, DEFAULT_API_BASE)
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(FastCmdError::InvalidInput("description cannot be empty".to_string()));
        }
        if self.api_key.is_empty() {
            return Err(FastCmdError::EmbeddingUnavailable(
                "OpenAI API key is not set".to_string(),
            ));
        }

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: text,
            })
            .send()
            .await
            .map_err(|e| FastCmdError::EmbeddingUnavailable(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(FastCmdError::EmbeddingUnavailable(format!(
                "OpenAI API error ({}): {}",
                status, detail
            )));
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            FastCmdError::EmbeddingUnavailable(format!("failed to parse response: {}", e))
        })?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| FastCmdError::EmbeddingUnavailable("response had no data".to_string()))?;

        if embedding.len() != self.dimension {
            return Err(FastCmdError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }

        Ok(embedding)
    }
}
