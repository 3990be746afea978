//! Embedding provider trait and factory.

use crate::embeddings::config::EmbeddingConfig;
use crate::embeddings::providers::{HuggingFaceEmbeddings, TrigramProvider};
use finqa_core::{config::canonical_embedding_provider, AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "trigram", "huggingface")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    ///
    /// Returns one vector per input, in input order.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Knowledge("No embedding returned".to_string()))
    }
}

/// Create an embedding provider based on configuration.
pub fn create_provider(
    config: &EmbeddingConfig,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    config.validate()?;

    match canonical_embedding_provider(&config.provider) {
        Some("trigram") => Ok(Arc::new(TrigramProvider::new(config.dimensions))),

        Some("huggingface") => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config(
                    "Hugging Face embeddings require an API token".to_string(),
                )
            })?;
            let provider = match &config.endpoint {
                Some(url) => HuggingFaceEmbeddings::with_base_url(url, api_key, config),
                None => HuggingFaceEmbeddings::new(api_key, config),
            }?;
            Ok(Arc::new(provider))
        }

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: huggingface, trigram, mock",
            config.provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_mock_is_trigram() {
        let config = EmbeddingConfig {
            provider: "mock".to_string(),
            ..Default::default()
        };

        let provider = create_provider(&config, None).unwrap();
        assert_eq!(provider.provider_name(), "trigram");
        assert_eq!(provider.model_name(), "trigram-v1");
        assert_eq!(provider.dimensions(), 384);
    }

    #[test]
    fn test_create_unknown_provider() {
        let config = EmbeddingConfig {
            provider: "unknown".to_string(),
            ..Default::default()
        };

        let result = create_provider(&config, None);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unknown embedding provider"));
    }

    #[test]
    fn test_huggingface_requires_token() {
        let config = EmbeddingConfig {
            provider: "huggingface".to_string(),
            model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            ..Default::default()
        };

        assert!(matches!(create_provider(&config, None), Err(AppError::Config(_))));
        let provider = create_provider(&config, Some("hf_test")).unwrap();
        assert_eq!(provider.provider_name(), "huggingface");
        assert_eq!(provider.model_name(), "sentence-transformers/all-MiniLM-L6-v2");

        let alias = EmbeddingConfig {
            provider: "HF".to_string(),
            ..config
        };
        assert!(matches!(create_provider(&alias, None), Err(AppError::Config(_))));
        assert_eq!(create_provider(&alias, Some("hf_test")).unwrap().provider_name(), "huggingface");
    }

    #[tokio::test]
    async fn test_provider_embed_single() {
        let config = EmbeddingConfig::default();
        let provider = create_provider(&config, None).unwrap();

        let embedding = provider.embed("test text").await.unwrap();
        assert_eq!(embedding.len(), 384);
    }

    #[tokio::test]
    async fn test_configured_endpoint_is_used() {
        use axum::{routing::post, Json, Router};
        use serde_json::{json, Value};

        let app = Router::new().route(
            "/embed/{*model}",
            post(|Json(body): Json<Value>| async move {
                let n = body["inputs"].as_array().map(|a| a.len()).unwrap_or(0);
                Json(json!(vec![vec![0.5_f32; 8]; n]))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = EmbeddingConfig {
            provider: "huggingface".to_string(),
            model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            dimensions: 8,
            endpoint: Some(format!("http://{}/embed", addr)),
            ..Default::default()
        };
        let provider = create_provider(&config, Some("hf_test")).unwrap();

        let embedding = provider.embed("net sales").await.unwrap();
        assert_eq!(embedding, vec![0.5_f32; 8]);
    }
}
