//! Error types for FinQA.
//!
//! This module defines a unified error enum that covers every failure
//! category in the answer pipeline: configuration, I/O, ingestion,
//! generation, retrieval, prompt construction and timeouts.

use thiserror::Error;

/// Unified error type for FinQA.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// Numeric post-processing is the exception: it never fails and degrades
/// to the raw generated text instead.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document ingestion errors (missing file, unreadable PDF)
    #[error("Ingestion error: {0}")]
    Ingest(String),

    /// Generation provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Chunking, embedding, index and retrieval errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// A bounded operation exceeded its deadline
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
