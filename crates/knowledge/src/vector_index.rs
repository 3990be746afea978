//! Vector index abstraction for document chunks.

use crate::types::ScoredChunk;
use finqa_core::AppResult;

/// Trait for vector index backends.
///
/// Implementations must support:
/// - Searching for the top-k most similar chunks
/// - Reporting size and vector dimension
pub trait VectorIndex: Send + Sync {
    /// Search for the top-k most similar chunks to the query embedding.
    ///
    /// Returns chunks ordered by descending similarity score, ties broken
    /// by document position.
    fn search(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<ScoredChunk>>;

    /// Number of indexed chunks.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimension every stored vector has.
    fn dimensions(&self) -> usize;
}
