//! In-memory per-document vector index.

use crate::types::{Chunk, DocumentId, ScoredChunk};
use crate::vector_index::VectorIndex;
use chrono::{DateTime, Utc};
use finqa_core::{AppError, AppResult};
use std::cmp::Ordering;

#[derive(Debug, Clone)]
struct IndexEntry {
    chunk: Chunk,
    vector: Vec<f32>,
}

/// Chunks of one document paired with their embeddings.
///
/// Immutable once built; shared between requests behind an `Arc`.
#[derive(Debug, Clone)]
pub struct DocumentIndex {
    document_id: DocumentId,
    entries: Vec<IndexEntry>,
    dimensions: usize,
    model: String,
    built_at: DateTime<Utc>,
}

impl DocumentIndex {
    /// Pair chunks with vectors.
    ///
    /// Fails when counts differ or any vector has the wrong dimension.
    pub fn build(
        document_id: DocumentId,
        chunks: Vec<Chunk>,
        vectors: Vec<Vec<f32>>,
        dimensions: usize,
        model: impl Into<String>,
    ) -> AppResult<Self> {
        if chunks.len() != vectors.len() {
            return Err(AppError::Knowledge(format!(
                "Cannot index {} chunks with {} vectors",
                chunks.len(),
                vectors.len()
            )));
        }

        if let Some(bad) = vectors.iter().find(|v| v.len() != dimensions) {
            return Err(AppError::Knowledge(format!(
                "Vector dimension mismatch: expected {}, got {}",
                dimensions,
                bad.len()
            )));
        }

        let entries = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexEntry { chunk, vector })
            .collect();

        Ok(Self {
            document_id,
            entries,
            dimensions,
            model: model.into(),
            built_at: Utc::now(),
        })
    }

    /// An index with no chunks, e.g. for a document without extractable text.
    pub fn empty(document_id: DocumentId, dimensions: usize, model: impl Into<String>) -> Self {
        Self {
            document_id,
            entries: Vec::new(),
            dimensions,
            model: model.into(),
            built_at: Utc::now(),
        }
    }

    pub fn document_id(&self) -> &DocumentId {
        &self.document_id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.entries.iter().map(|e| &e.chunk)
    }
}

impl VectorIndex for DocumentIndex {
    fn search(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<ScoredChunk>> {
        if query_embedding.len() != self.dimensions {
            return Err(AppError::Knowledge(format!(
                "Query dimension mismatch: expected {}, got {}",
                self.dimensions,
                query_embedding.len()
            )));
        }

        let mut scored: Vec<(&IndexEntry, f32)> = self
            .entries
            .iter()
            .map(|entry| (entry, cosine_similarity(query_embedding, &entry.vector)))
            .collect();

        scored.sort_by(|(a, sa), (b, sb)| {
            sb.partial_cmp(sa)
                .unwrap_or(Ordering::Equal)
                .then(a.chunk.position.cmp(&b.chunk.position))
        });

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(entry, score)| ScoredChunk {
                chunk: entry.chunk.clone(),
                score,
            })
            .collect())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Calculate cosine similarity between two vectors.
///
/// Zero when lengths differ or either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(doc: &DocumentId, position: u32, text: &str) -> Chunk {
        Chunk::new(doc, position, text.to_string(), (0, text.len()))
    }

    fn sample_index() -> DocumentIndex {
        let doc = DocumentId::from_bytes(b"filing");
        DocumentIndex::build(
            doc.clone(),
            vec![
                chunk(&doc, 0, "a"),
                chunk(&doc, 1, "b"),
                chunk(&doc, 2, "c"),
                chunk(&doc, 3, "d"),
            ],
            vec![
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![0.7, 0.7, 0.0],
                vec![1.0, 0.0, 0.0],
            ],
            3,
            "test-model",
        )
        .unwrap()
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_search_orders_by_score_then_position() {
        let index = sample_index();
        let results = index.search(&[1.0, 0.0, 0.0], 3).unwrap();

        let positions: Vec<u32> = results.iter().map(|r| r.chunk.position).collect();
        assert_eq!(positions, vec![0, 3, 2]);
        assert!(results[0].score >= results[1].score);
        assert!(results[1].score >= results[2].score);
    }

    #[test]
    fn test_search_top_k_bounds() {
        let index = sample_index();
        assert_eq!(index.search(&[0.0, 1.0, 0.0], 10).unwrap().len(), 4);
        assert!(index.search(&[0.0, 1.0, 0.0], 0).unwrap().is_empty());
        assert_eq!(index.search(&[0.0, 1.0, 0.0], 1).unwrap()[0].chunk.position, 1);
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let index = sample_index();
        assert!(index.search(&[1.0, 0.0], 2).is_err());
    }

    #[test]
    fn test_build_validates_vectors() {
        let doc = DocumentId::from_bytes(b"filing");
        let chunks = vec![chunk(&doc, 0, "a"), chunk(&doc, 1, "b")];

        let count = DocumentIndex::build(doc.clone(), chunks.clone(), vec![vec![1.0, 0.0]], 2, "m");
        assert!(count.is_err());

        let dims = DocumentIndex::build(doc, chunks, vec![vec![1.0, 0.0], vec![1.0]], 2, "m");
        assert!(dims.is_err());
    }

    #[test]
    fn test_empty_index() {
        let index = DocumentIndex::empty(DocumentId::from_bytes(b"blank"), 3, "m");
        assert!(index.is_empty());
        assert!(index.search(&[1.0, 0.0, 0.0], 4).unwrap().is_empty());
    }
}
