//! Text generation crate for FinQA.
//!
//! This crate provides a provider-agnostic abstraction over text-generation
//! backends with deterministic decoding parameters.
//!
//! # Providers
//! - **Hugging Face**: hosted text2text inference (default)
//! - **Ollama**: local LLM runtime
//! - **Mock**: offline echo/canned responses
//!
//! # Example
//! ```no_run
//! use finqa_llm::{LlmClient, LlmRequest, providers::HuggingFaceClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HuggingFaceClient::new("hf_token")?;
//! let request = LlmRequest::new("What is revenue?", "google/flan-t5-large");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{DecodingConfig, LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{HuggingFaceClient, MockClient, OllamaClient};
pub use types::ProviderType;
