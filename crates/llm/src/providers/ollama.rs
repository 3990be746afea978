//! Ollama LLM provider implementation.
//!
//! Local generation through Ollama's `/api/generate` endpoint.
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md
//!
//! Ollama has no beam search, so requests always decode greedily
//! (`temperature = 0`) and `max_length` maps to `num_predict`.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use finqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Ollama API request format.
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    options: OllamaOptions,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Ollama API response format.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    model: String,
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

/// Default local Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Ollama LLM client.
pub struct OllamaClient {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_OLLAMA_URL)
    }

    /// Point the client at another Ollama instance.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn to_ollama_request(&self, request: &LlmRequest) -> OllamaRequest {
        OllamaRequest {
            model: request.model.clone(),
            prompt: request.prompt.clone(),
            options: OllamaOptions {
                temperature: 0.0,
                num_predict: request.decoding.max_length,
            },
            stream: false,
        }
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        if !request.decoding.is_greedy() {
            tracing::debug!(
                "Ollama has no beam search; decoding greedily instead of {} beams",
                request.decoding.num_beams
            );
        }

        let url = format!("{}/api/generate", self.base_url);
        tracing::info!(model = %request.model, "Generating with Ollama");

        let response = self
            .client
            .post(&url)
            .json(&self.to_ollama_request(request))
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Ollama is unreachable at {}: {}", self.base_url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Llm(format!("Ollama generation failed ({}): {}", status, body)));
        }

        let generated: OllamaResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Malformed Ollama response: {}", e)))?;

        let usage = LlmUsage::new(
            generated.prompt_eval_count.unwrap_or(0),
            generated.eval_count.unwrap_or(0),
        );
        tracing::debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "Ollama generation finished"
        );

        Ok(LlmResponse {
            content: generated.response,
            model: generated.model,
            usage,
            decoding: request.decoding.greedy(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::DecodingConfig;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[test]
    fn test_ollama_client_creation() {
        let client = OllamaClient::new();
        assert_eq!(client.provider_name(), "ollama");
        assert_eq!(client.base_url, DEFAULT_OLLAMA_URL);
    }

    #[test]
    fn test_ollama_request_is_greedy() {
        let client = OllamaClient::new();
        let request = LlmRequest::new("Hello", "llama3.2").with_decoding(DecodingConfig::new(100, 4, 3));

        let ollama_req = client.to_ollama_request(&request);
        assert_eq!(ollama_req.model, "llama3.2");
        assert_eq!(ollama_req.prompt, "Hello");
        assert_eq!(ollama_req.options.temperature, 0.0);
        assert_eq!(ollama_req.options.num_predict, 100);
        assert!(!ollama_req.stream);
    }

    #[tokio::test]
    async fn test_complete_against_local_server() {
        let app = Router::new().route(
            "/api/generate",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["options"]["num_predict"], 64);
                assert_eq!(body["stream"], false);
                Json(json!({
                    "model": body["model"],
                    "response": "Net sales rose.",
                    "done": true,
                    "prompt_eval_count": 12,
                    "eval_count": 4
                }))
            }),
        );
        let client = OllamaClient::with_base_url(spawn(app).await);

        let request = LlmRequest::new("Context: ...", "llama3.2").with_decoding(DecodingConfig::new(64, 4, 3));
        let response = client.complete(&request).await.unwrap();

        assert_eq!(response.content, "Net sales rose.");
        assert_eq!(response.model, "llama3.2");
        assert_eq!(response.usage.completion_tokens, 4);
        assert!(response.decoding.is_greedy());
        assert_eq!(response.decoding.max_length, 64);
    }

    #[tokio::test]
    async fn test_missing_model_is_llm_error() {
        let app = Router::new().route(
            "/api/generate",
            post(|| async { (StatusCode::NOT_FOUND, "model 'llama3.2' not found") }),
        );
        let client = OllamaClient::with_base_url(spawn(app).await);

        let err = client.complete(&LlmRequest::new("hi", "llama3.2")).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(ref m) if m.contains("not found")));
    }
}
