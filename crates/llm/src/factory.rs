//! LLM provider factory.
//!
//! This module creates generation clients from the configured provider name,
//! injecting the API token where the provider needs one.

use crate::client::LlmClient;
use crate::providers::{HuggingFaceClient, MockClient, OllamaClient};
use crate::types::ProviderType;
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("huggingface", "ollama", "mock")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API token (required for "huggingface")
///
/// # Errors
/// Returns error if:
/// - Provider is unknown
/// - Required secrets are missing
/// - Client initialization fails
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> Result<Arc<dyn LlmClient>, String> {
    let provider_type =
        ProviderType::parse(provider).ok_or_else(|| format!("Unknown provider: {}", provider))?;

    match provider_type {
        ProviderType::HuggingFace => {
            let api_key =
                api_key.ok_or_else(|| "Hugging Face provider requires API key".to_string())?;
            let client = match endpoint {
                Some(url) => HuggingFaceClient::with_base_url(url, api_key),
                None => HuggingFaceClient::new(api_key),
            }
            .map_err(|e| e.to_string())?;
            Ok(Arc::new(client))
        }
        ProviderType::Ollama => {
            let client = match endpoint {
                Some(url) => OllamaClient::with_base_url(url),
                None => OllamaClient::new(),
            };
            Ok(Arc::new(client))
        }
        ProviderType::Mock => Ok(Arc::new(MockClient::echo())),
    }
}
