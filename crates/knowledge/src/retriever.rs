//! Query-time retrieval over a document index.

use crate::embeddings::EmbeddingProvider;
use crate::types::ScoredChunk;
use crate::vector_index::VectorIndex;
use finqa_core::AppResult;
use std::sync::Arc;

/// Ranked chunks for one query, most similar first.
#[derive(Debug, Clone, Default)]
pub struct RetrievedContext {
    pub chunks: Vec<ScoredChunk>,
}

impl RetrievedContext {
    /// Chunk texts in rank order.
    pub fn texts(&self) -> Vec<String> {
        self.chunks.iter().map(|c| c.chunk.text.clone()).collect()
    }

    /// Untruncated context, one chunk per line, for figure extraction.
    pub fn joined_lines(&self) -> String {
        self.chunks
            .iter()
            .map(|c| c.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn max_score(&self) -> f32 {
        self.chunks.first().map(|c| c.score).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Embeds queries and searches an index for the top-k chunks.
#[derive(Debug, Clone)]
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, top_k: usize) -> Self {
        Self { embedder, top_k }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub async fn retrieve(&self, index: &dyn VectorIndex, query: &str) -> AppResult<RetrievedContext> {
        if index.is_empty() {
            tracing::info!("Index is empty; nothing to retrieve");
            return Ok(RetrievedContext::default());
        }

        let query_embedding = self.embedder.embed(query).await?;
        let chunks = index.search(&query_embedding, self.top_k)?;

        let context = RetrievedContext { chunks };
        tracing::info!(
            "Retrieved {} chunks (top score: {:.3})",
            context.len(),
            context.max_score()
        );
        tracing::debug!(
            "Scores: {:?}",
            context.chunks.iter().map(|c| c.score).collect::<Vec<_>>()
        );

        Ok(context)
    }
}
