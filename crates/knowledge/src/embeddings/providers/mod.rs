//! Embedding provider implementations.

pub mod huggingface;
pub mod trigram;

pub use huggingface::HuggingFaceEmbeddings;
pub use trigram::TrigramProvider;
