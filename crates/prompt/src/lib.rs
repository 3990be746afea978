//! Prompt system for FinQA.
//!
//! This crate provides:
//! - YAML-based prompt definitions with a built-in default
//! - Token-budgeted context truncation (`cl100k_base`)
//! - Handlebars template rendering

pub mod budget;
pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use budget::{ContextBudget, TruncatedContext, DEFAULT_CONTEXT_BUDGET};
pub use builder::build_prompt;
pub use loader::{load_prompt_file, resolve_prompt, validate_prompt};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition, DEFAULT_TEMPLATE};
