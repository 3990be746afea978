//! Embedding generation for document chunks and queries.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};

use crate::types::Chunk;
use finqa_core::{AppError, AppResult};

/// Embed chunk texts, checking the provider returned one vector of the
/// expected dimension per chunk.
pub async fn embed_chunks(provider: &dyn EmbeddingProvider, chunks: &[Chunk]) -> AppResult<Vec<Vec<f32>>> {
    if chunks.is_empty() {
        return Ok(Vec::new());
    }

    tracing::info!(
        "Embedding {} chunks using provider '{}' (model: {})",
        chunks.len(),
        provider.provider_name(),
        provider.model_name()
    );

    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let embeddings = provider.embed_batch(&texts).await?;

    if embeddings.len() != chunks.len() {
        return Err(AppError::Knowledge(format!(
            "Embedding count mismatch: {} chunks, {} vectors",
            chunks.len(),
            embeddings.len()
        )));
    }

    if let Some(bad) = embeddings.iter().find(|e| e.len() != provider.dimensions()) {
        return Err(AppError::Knowledge(format!(
            "Unexpected embedding dimensions: got {}, expected {}",
            bad.len(),
            provider.dimensions()
        )));
    }

    tracing::debug!(
        "Generated {} embeddings of dimension {}",
        embeddings.len(),
        provider.dimensions()
    );

    Ok(embeddings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::TrigramProvider;
    use crate::types::DocumentId;

    #[tokio::test]
    async fn test_embed_chunks_trigram() {
        let doc = DocumentId::from_bytes(b"doc");
        let chunks = vec![
            Chunk::new(&doc, 0, "iphone net sales".to_string(), (0, 16)),
            Chunk::new(&doc, 1, "mac net sales".to_string(), (16, 29)),
        ];

        let provider = TrigramProvider::new(64);
        let embeddings = embed_chunks(&provider, &chunks).await.unwrap();

        assert_eq!(embeddings.len(), 2);
        assert!(embeddings.iter().all(|e| e.len() == 64));
    }

    #[tokio::test]
    async fn test_embed_no_chunks() {
        let provider = TrigramProvider::new(64);
        assert!(embed_chunks(&provider, &[]).await.unwrap().is_empty());
    }
}
