//! Core types for document indexing and retrieval.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Identity of an uploaded document: SHA-256 of its bytes, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Hash the document content.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(sha256_hex(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 16 hex characters, used in file names and chunk ids.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(16)]
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A bounded segment of normalized document text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// `<document short id>:<position>`
    pub id: String,

    /// Owning document
    pub document_id: DocumentId,

    /// Chunk position in document (0-indexed)
    pub position: u32,

    /// Chunk text content
    pub text: String,

    /// Byte range in the normalized text
    pub byte_range: (usize, usize),

    /// SHA-256 hash of chunk text
    pub hash: String,
}

impl Chunk {
    pub fn new(document_id: &DocumentId, position: u32, text: String, byte_range: (usize, usize)) -> Self {
        Self {
            id: format!("{}:{}", document_id.short(), position),
            document_id: document_id.clone(),
            position,
            hash: sha256_hex(text.as_bytes()),
            text,
            byte_range,
        }
    }
}

/// A chunk with its similarity to a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
