//! Provider identifiers.

use finqa_core::config::canonical_provider;
use serde::{Deserialize, Serialize};

/// Provider type enum for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    HuggingFace,
    Ollama,
    Mock,
}

impl ProviderType {
    /// Parse provider type from a name or alias, same rules as config validation.
    pub fn parse(s: &str) -> Option<Self> {
        match canonical_provider(s)? {
            "huggingface" => Some(Self::HuggingFace),
            "ollama" => Some(Self::Ollama),
            "mock" => Some(Self::Mock),
            _ => None,
        }
    }

    /// Get the canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HuggingFace => "huggingface",
            Self::Ollama => "ollama",
            Self::Mock => "mock",
        }
    }

    /// Whether the provider needs an API token.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::HuggingFace)
    }
}
