//! Generation provider implementations.

pub mod huggingface;
pub mod mock;
pub mod ollama;

pub use huggingface::HuggingFaceClient;
pub use mock::MockClient;
pub use ollama::OllamaClient;
