//! Generator abstraction and request/response types.
//!
//! This module defines the core abstractions for talking to text-generation
//! backends. Decoding is deterministic: beam search or greedy, never sampling.

use finqa_core::AppResult;
use serde::{Deserialize, Serialize};

/// Beam-search decoding parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodingConfig {
    /// Maximum generated length in tokens
    pub max_length: u32,

    /// Beam width; 1 means greedy decoding
    pub num_beams: u32,

    /// Size of n-grams that may not repeat; 0 disables the constraint
    pub no_repeat_ngram_size: u32,
}

impl DecodingConfig {
    /// Create a decoding config.
    pub fn new(max_length: u32, num_beams: u32, no_repeat_ngram_size: u32) -> Self {
        Self {
            max_length,
            num_beams,
            no_repeat_ngram_size,
        }
    }

    /// Greedy decoding with the same length limit and no n-gram constraint.
    pub fn greedy(&self) -> Self {
        Self {
            max_length: self.max_length,
            num_beams: 1,
            no_repeat_ngram_size: 0,
        }
    }

    /// Whether this configuration is already plain greedy decoding.
    pub fn is_greedy(&self) -> bool {
        self.num_beams <= 1 && self.no_repeat_ngram_size == 0
    }
}

impl Default for DecodingConfig {
    fn default() -> Self {
        Self::new(512, 4, 3)
    }
}

/// Generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    /// The prompt text
    pub prompt: String,

    /// Model identifier (e.g., "google/flan-t5-large")
    pub model: String,

    /// Decoding parameters
    #[serde(default)]
    pub decoding: DecodingConfig,
}

impl LlmRequest {
    /// Create a new request with default decoding.
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            decoding: DecodingConfig::default(),
        }
    }

    /// Set the decoding parameters.
    pub fn with_decoding(mut self, decoding: DecodingConfig) -> Self {
        self.decoding = decoding;
        self
    }
}

/// Generation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    /// The generated text
    pub content: String,

    /// Model that generated the response
    pub model: String,

    /// Usage statistics
    pub usage: LlmUsage,

    /// Decoding actually used (differs from the request after a greedy fallback)
    pub decoding: DecodingConfig,
}

/// Token usage statistics.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LlmUsage {
    /// Tokens in the prompt
    #[serde(default)]
    pub prompt_tokens: u32,

    /// Tokens in the completion
    #[serde(default)]
    pub completion_tokens: u32,

    /// Total tokens used
    #[serde(default)]
    pub total_tokens: u32,
}

impl LlmUsage {
    /// Create usage stats from prompt and completion token counts.
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Trait for generation providers.
///
/// Implementations are shared across requests behind an `Arc` and must be
/// safe to call concurrently.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Get the provider name (e.g., "huggingface", "ollama").
    fn provider_name(&self) -> &str;

    /// Generate a completion for the request.
    ///
    /// Providers that reject beam parameters retry once with
    /// [`DecodingConfig::greedy`].
    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse>;
}
