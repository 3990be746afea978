//! Prompt types for FinQA.
//!
//! This module defines the domain entities for the prompt system.

use serde::{Deserialize, Serialize};

/// Placeholder the retrieved context is bound to.
pub const CONTEXT_VAR: &str = "context";

/// Placeholder the user question is bound to.
pub const QUESTION_VAR: &str = "question";

/// Built-in answer template.
pub const DEFAULT_TEMPLATE: &str = "Context: {{context}}\nQuestion: {{question}}\nAnswer:";

/// A prompt definition, built in or loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Optional free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Template string with Handlebars syntax
    pub template: String,
}

impl PromptDefinition {
    /// The built-in financial QA template.
    pub fn default_answer() -> Self {
        Self {
            id: "finqa.answer.default".to_string(),
            title: "Financial question answering".to_string(),
            api_version: "1.0".to_string(),
            description: None,
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl Default for PromptDefinition {
    fn default() -> Self {
        Self::default_answer()
    }
}

/// A fully built prompt ready for generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// Rendered prompt text
    pub text: String,

    /// The (possibly truncated) context that was interpolated
    pub context: String,

    /// Metadata about the built prompt
    pub metadata: BuiltPromptMetadata,
}

/// Metadata about a built prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPromptMetadata {
    /// Source prompt ID
    #[serde(rename = "promptId")]
    pub prompt_id: String,

    /// Context length in tokens after truncation
    #[serde(rename = "contextTokens")]
    pub context_tokens: usize,

    /// Whether the context was cut to fit the budget
    pub truncated: bool,
}
