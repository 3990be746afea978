//! Hugging Face Inference API provider.
//!
//! Runs text2text models (e.g. `google/flan-t5-large`) on the hosted
//! inference endpoint. API: https://huggingface.co/docs/api-inference
//!
//! # Features
//! - Beam-search decoding parameters
//! - Automatic retry with exponential backoff on 429/5xx and network errors
//! - Greedy fallback when the backend rejects beam parameters

use crate::client::{DecodingConfig, LlmClient, LlmRequest, LlmResponse, LlmUsage};
use finqa_core::{AppError, AppResult};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Hosted inference base URL; the model id is appended as a path.
pub const DEFAULT_HF_URL: &str = "https://api-inference.huggingface.co/models";

/// Maximum attempts per decoding configuration
const MAX_RETRIES: u32 = 3;

/// Initial backoff duration in milliseconds
const INITIAL_BACKOFF_MS: u64 = 500;

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
    options: InferenceOptions,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    max_length: u32,
    num_beams: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    no_repeat_ngram_size: Option<u32>,
    do_sample: bool,
}

impl From<&DecodingConfig> for InferenceParameters {
    fn from(decoding: &DecodingConfig) -> Self {
        Self {
            max_length: decoding.max_length,
            num_beams: decoding.num_beams.max(1),
            no_repeat_ngram_size: (decoding.no_repeat_ngram_size > 0)
                .then_some(decoding.no_repeat_ngram_size),
            do_sample: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
struct Generated {
    generated_text: String,
}

/// The endpoint answers with either a list or a single object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Many(Vec<Generated>),
    One(Generated),
}

impl InferenceResponse {
    fn into_text(self) -> Option<String> {
        match self {
            Self::Many(items) => items.into_iter().next().map(|g| g.generated_text),
            Self::One(item) => Some(item.generated_text),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Outcome of a single failed call.
#[derive(Debug)]
enum CallError {
    /// The backend refused the request parameters (400/422)
    Rejected(String),
    /// Rate limiting, model loading, server or network failure
    Transient(String),
    /// Anything else; not worth retrying
    Fatal(String),
}

impl CallError {
    fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .map(|e| e.error)
            .unwrap_or_else(|_| body.to_string());
        let message = format!("Hugging Face API error ({}): {}", status, message);

        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
            Self::Rejected(message)
        } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            Self::Transient(message)
        } else {
            Self::Fatal(message)
        }
    }

    fn into_app_error(self) -> AppError {
        match self {
            Self::Rejected(m) | Self::Transient(m) | Self::Fatal(m) => AppError::Llm(m),
        }
    }
}

/// Hugging Face hosted generation client.
#[derive(Debug, Clone)]
pub struct HuggingFaceClient {
    client: Client,
    base_url: String,
    api_key: String,
    initial_backoff: Duration,
}

impl HuggingFaceClient {
    /// Create a client for the public inference endpoint.
    pub fn new(api_key: impl Into<String>) -> AppResult<Self> {
        Self::with_base_url(DEFAULT_HF_URL, api_key)
    }

    /// Create a client against a custom endpoint (self-hosted or test server).
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Llm(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        })
    }

    /// Override the initial retry backoff.
    pub fn with_backoff(mut self, initial_backoff: Duration) -> Self {
        self.initial_backoff = initial_backoff;
        self
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/{}", self.base_url, model)
    }

    async fn call_once(&self, request: &LlmRequest, decoding: &DecodingConfig) -> Result<String, CallError> {
        let body = InferenceRequest {
            inputs: &request.prompt,
            parameters: decoding.into(),
            options: InferenceOptions {
                wait_for_model: true,
            },
        };

        let response = self
            .client
            .post(self.model_url(&request.model))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CallError::Transient(format!("Failed to reach Hugging Face: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CallError::from_status(status, &text));
        }

        let parsed: InferenceResponse = response
            .json()
            .await
            .map_err(|e| CallError::Fatal(format!("Failed to parse Hugging Face response: {}", e)))?;

        parsed
            .into_text()
            .ok_or_else(|| CallError::Fatal("Hugging Face returned no generations".to_string()))
    }

    #[instrument(skip(self, request), fields(model = %request.model, num_beams = decoding.num_beams))]
    async fn call_with_retries(&self, request: &LlmRequest, decoding: &DecodingConfig) -> Result<String, CallError> {
        let mut attempt = 0;

        loop {
            match self.call_once(request, decoding).await {
                Ok(text) => return Ok(text),
                Err(CallError::Transient(message)) => {
                    attempt += 1;
                    if attempt >= MAX_RETRIES {
                        return Err(CallError::Transient(message));
                    }

                    let backoff = self.initial_backoff * 2_u32.pow(attempt - 1);
                    warn!(
                        "Generation failed (attempt {}/{}), retrying in {}ms: {}",
                        attempt,
                        MAX_RETRIES,
                        backoff.as_millis(),
                        message
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(other) => return Err(other),
            }
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for HuggingFaceClient {
    fn provider_name(&self) -> &str {
        "huggingface"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        info!("Sending generation request to Hugging Face");
        debug!("Request: {:?}", request);

        let mut decoding = request.decoding;
        let content = match self.call_with_retries(request, &decoding).await {
            Ok(text) => text,
            Err(CallError::Rejected(message)) if !decoding.is_greedy() => {
                warn!("Beam parameters rejected, falling back to greedy decoding: {}", message);
                decoding = decoding.greedy();
                self.call_with_retries(request, &decoding)
                    .await
                    .map_err(CallError::into_app_error)?
            }
            Err(e) => return Err(e.into_app_error()),
        };

        info!("Received generation from Hugging Face");

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::default(),
            decoding,
        })
    }
}
