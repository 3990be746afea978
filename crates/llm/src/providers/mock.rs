//! Deterministic offline generator.
//!
//! Either replays a canned response or echoes the prompt back. Used by tests
//! and for running the pipeline without network access.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use finqa_core::AppResult;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mock generation client.
#[derive(Debug, Default)]
pub struct MockClient {
    response: Option<String>,
    calls: AtomicUsize,
}

impl MockClient {
    /// A client that returns the prompt unchanged.
    pub fn echo() -> Self {
        Self::default()
    }

    /// A client that always returns `response`.
    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of completions served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LlmClient for MockClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let content = self
            .response
            .clone()
            .unwrap_or_else(|| request.prompt.clone());
        let prompt_tokens = request.prompt.split_whitespace().count() as u32;
        let completion_tokens = content.split_whitespace().count() as u32;

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::new(prompt_tokens, completion_tokens),
            decoding: request.decoding,
        })
    }
}
