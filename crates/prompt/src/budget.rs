//! Token-budgeted context truncation.
//!
//! Context is measured with the `cl100k_base` BPE vocabulary and cut to at
//! most `max_tokens` tokens. The cut may land in the middle of a chunk.

use finqa_core::{AppError, AppResult};
use std::sync::Arc;
use tiktoken_rs::CoreBPE;

/// Default context budget in tokens.
pub const DEFAULT_CONTEXT_BUDGET: usize = 480;

/// Context text after applying the budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncatedContext {
    pub text: String,
    pub tokens: usize,
    pub truncated: bool,
}

/// A token budget backed by a shared BPE tokenizer.
#[derive(Clone)]
pub struct ContextBudget {
    bpe: Arc<CoreBPE>,
    max_tokens: usize,
}

impl std::fmt::Debug for ContextBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextBudget")
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl ContextBudget {
    /// Load the `cl100k_base` tokenizer and wrap it with a budget.
    ///
    /// Loading parses the vocabulary, so do it once at startup and clone.
    pub fn new(max_tokens: usize) -> AppResult<Self> {
        let bpe = tiktoken_rs::cl100k_base()
            .map_err(|e| AppError::Prompt(format!("Failed to load tokenizer: {}", e)))?;
        Ok(Self::with_tokenizer(Arc::new(bpe), max_tokens))
    }

    /// Use an already loaded tokenizer.
    pub fn with_tokenizer(bpe: Arc<CoreBPE>, max_tokens: usize) -> Self {
        Self { bpe, max_tokens }
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Number of tokens in `text`.
    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }

    /// Cut `text` to the budget.
    pub fn truncate(&self, text: &str) -> AppResult<TruncatedContext> {
        let tokens = self.bpe.encode_with_special_tokens(text);
        if tokens.len() <= self.max_tokens {
            return Ok(TruncatedContext {
                text: text.to_string(),
                tokens: tokens.len(),
                truncated: false,
            });
        }

        // A cut inside a multi-byte character is not decodable; back off
        // until it is.
        let mut keep = self.max_tokens;
        loop {
            match self.bpe.decode(tokens[..keep].to_vec()) {
                Ok(decoded) => {
                    tracing::debug!(
                        "Truncated context from {} to {} tokens",
                        tokens.len(),
                        keep
                    );
                    return Ok(TruncatedContext {
                        text: decoded,
                        tokens: keep,
                        truncated: true,
                    });
                }
                Err(_) if keep > 0 => keep -= 1,
                Err(e) => {
                    return Err(AppError::Prompt(format!(
                        "Failed to decode truncated context: {}",
                        e
                    )))
                }
            }
        }
    }
}
