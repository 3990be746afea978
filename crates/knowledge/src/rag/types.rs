//! RAG response types.

use crate::types::ScoredChunk;
use finqa_figures::AnswerOrigin;
use finqa_llm::DecodingConfig;
use serde::{Deserialize, Serialize};

/// Maximum snippet length for source references.
const MAX_SNIPPET_LENGTH: usize = 150;

/// A retrieved chunk as shown to users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagSourceRef {
    /// Chunk id (`<document>:<position>`)
    pub chunk: String,

    /// Cosine similarity to the query
    pub score: f32,

    /// Leading text of the chunk, cut at a character boundary
    pub snippet: String,
}

impl From<&ScoredChunk> for RagSourceRef {
    fn from(scored: &ScoredChunk) -> Self {
        Self {
            chunk: scored.chunk.id.clone(),
            score: scored.score,
            snippet: truncate_snippet(&scored.chunk.text, MAX_SNIPPET_LENGTH),
        }
    }
}

/// Answer to one question about one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagAnswer {
    /// Final answer text
    pub response: String,

    /// Whether the text is a formatted comparison or raw generation
    pub origin: AnswerOrigin,

    /// Verbatim generator output
    pub generated: String,

    /// Content hash of the document
    pub document_id: String,

    /// The index was already built before this request
    pub cache_hit: bool,

    /// Tokens of context placed in the prompt
    pub context_tokens: usize,

    /// Context was cut to the token budget
    pub context_truncated: bool,

    /// Decoding actually used by the generator
    pub decoding: DecodingConfig,

    /// Retrieved chunks, best first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<RagSourceRef>,
}

fn truncate_snippet(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", text[..end].trim_end()),
        None => text.to_string(),
    }
}
