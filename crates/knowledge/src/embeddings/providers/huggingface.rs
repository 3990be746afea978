//! Hugging Face feature-extraction embeddings.
//!
//! Sends batches of chunk texts to the hosted sentence-transformers
//! pipeline and returns one pooled vector per text.
//!
//! # Features
//! - Configurable batch size
//! - Automatic retry with exponential backoff on 429/5xx and network errors
//! - Dimension check on every returned vector

use crate::embeddings::{EmbeddingConfig, EmbeddingProvider};
use async_trait::async_trait;
use finqa_core::{AppError, AppResult};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Hosted feature-extraction pipeline; the model id is appended as a path.
pub const DEFAULT_HF_EMBEDDING_URL: &str =
    "https://api-inference.huggingface.co/pipeline/feature-extraction";

/// Maximum retry attempts for failed requests
const MAX_RETRIES: u32 = 3;

/// Initial backoff duration in milliseconds
const INITIAL_BACKOFF_MS: u64 = 500;

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Serialize)]
struct FeatureRequest<'a> {
    inputs: &'a [String],
    options: FeatureOptions,
}

#[derive(Debug, Serialize)]
struct FeatureOptions {
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Hosted embedding provider.
#[derive(Debug, Clone)]
pub struct HuggingFaceEmbeddings {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    dimensions: usize,
    batch_size: usize,
    initial_backoff: Duration,
}

impl HuggingFaceEmbeddings {
    pub fn new(api_key: &str, config: &EmbeddingConfig) -> AppResult<Self> {
        Self::with_base_url(DEFAULT_HF_EMBEDDING_URL, api_key, config)
    }

    pub fn with_base_url(base_url: &str, api_key: &str, config: &EmbeddingConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Llm(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            dimensions: config.dimensions,
            batch_size: config.batch_size.max(1),
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        })
    }

    /// Override the initial retry backoff.
    pub fn with_backoff(mut self, initial_backoff: Duration) -> Self {
        self.initial_backoff = initial_backoff;
        self
    }

    /// Embed one batch, retrying transient failures.
    #[instrument(skip(self, texts), fields(batch_size = texts.len(), model = %self.model))]
    async fn embed_with_retries(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let mut attempt = 0;

        loop {
            match self.embed_once(texts).await {
                Ok(vectors) => return Ok(vectors),
                Err((retryable, e)) => {
                    attempt += 1;
                    if !retryable || attempt >= MAX_RETRIES {
                        return Err(e);
                    }

                    let backoff = self.initial_backoff * 2_u32.pow(attempt - 1);
                    warn!(
                        "Embedding failed (attempt {}/{}), retrying in {}ms: {}",
                        attempt,
                        MAX_RETRIES,
                        backoff.as_millis(),
                        e
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    /// Single request. Errors carry whether a retry may help.
    async fn embed_once(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, (bool, AppError)> {
        let url = format!("{}/{}", self.base_url, self.model);
        let body = FeatureRequest {
            inputs: texts,
            options: FeatureOptions {
                wait_for_model: true,
            },
        };

        debug!("Sending embedding request to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                (
                    true,
                    AppError::Llm(format!("Failed to reach Hugging Face embeddings: {}", e)),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error)
                .unwrap_or(text);
            let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
            return Err((
                retryable,
                AppError::Llm(format!("Hugging Face embedding error ({}): {}", status, message)),
            ));
        }

        let vectors: Vec<Vec<f32>> = response.json().await.map_err(|e| {
            (
                false,
                AppError::Llm(format!("Failed to parse embedding response: {}", e)),
            )
        })?;

        if vectors.len() != texts.len() {
            return Err((
                false,
                AppError::Llm(format!(
                    "Embedding count mismatch: sent {}, received {}",
                    texts.len(),
                    vectors.len()
                )),
            ));
        }

        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimensions) {
            return Err((
                false,
                AppError::Llm(format!(
                    "Unexpected embedding dimensions: got {}, expected {}",
                    bad.len(),
                    self.dimensions
                )),
            ));
        }

        Ok(vectors)
    }
}

#[async_trait]
impl EmbeddingProvider for HuggingFaceEmbeddings {
    fn provider_name(&self) -> &str {
        "huggingface"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip(self, texts), fields(texts = texts.len(), provider = "huggingface", model = %self.model))]
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            embeddings.extend(self.embed_with_retries(batch).await?);
        }

        Ok(embeddings)
    }
}
