//! Embedding configuration.

use finqa_core::{AppConfig, AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Embedding settings derived from the application config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "huggingface", "trigram" ("mock" is an alias)
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Maximum batch size for embedding requests
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Optional custom endpoint for hosted providers
    #[serde(default)]
    pub endpoint: Option<String>,
}

fn default_batch_size() -> usize {
    32
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            batch_size: default_batch_size(),
            endpoint: None,
        }
    }
}

impl EmbeddingConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            provider: config.embedding_provider.clone(),
            model: config.embedding_model.clone(),
            dimensions: config.embedding_dim,
            batch_size: default_batch_size(),
            endpoint: config.embedding_endpoint.clone(),
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be positive".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(AppError::Config(
                "Embedding batch size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
