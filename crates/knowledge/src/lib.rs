//! Document knowledge pipeline for FinQA.
//!
//! Turns an uploaded filing into a searchable in-memory index and answers
//! questions about it:
//!
//! - [`ingest`]: PDF/text extraction
//! - [`normalize`] and [`chunker`]: normalized, overlapping chunks
//! - [`embeddings`]: hosted and local embedding providers
//! - [`index`], [`cache`], [`retriever`]: cosine search with a single-flight cache
//! - [`rag`]: the end-to-end answer pipeline

pub mod cache;
pub mod chunker;
pub mod embeddings;
pub mod index;
pub mod ingest;
pub mod normalize;
pub mod rag;
pub mod retriever;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use cache::IndexCache;
pub use chunker::{chunk_text, ChunkerConfig};
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use index::DocumentIndex;
pub use ingest::{Document, DocumentKind, FILE_NOT_FOUND};
pub use normalize::normalize;
pub use rag::{Capabilities, PipelineSettings, RagAnswer, RagPipeline};
pub use retriever::{RetrievedContext, Retriever};
pub use types::{Chunk, DocumentId, ScoredChunk};
pub use vector_index::VectorIndex;
