//! Document ingestion: bytes in, raw text out.
//!
//! PDFs are extracted page by page and the pages joined with a newline.
//! Anything else is read as UTF-8 with undecodable bytes dropped.
//! Extraction is CPU-bound and runs on the blocking pool.

use finqa_core::{AppError, AppResult};
use std::path::Path;

use crate::types::DocumentId;

/// Message returned when an input path does not exist.
pub const FILE_NOT_FOUND: &str = "Error: File not found.";

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Document formats the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
}

impl DocumentKind {
    /// Detect the kind from the file name, falling back to the content magic.
    pub fn detect(file_name: &str, bytes: &[u8]) -> Self {
        let by_name = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

        if by_name || bytes.starts_with(PDF_MAGIC) {
            Self::Pdf
        } else {
            Self::Text
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Text => "text",
        }
    }
}

/// An uploaded or on-disk document with its content identity.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    pub kind: DocumentKind,
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        Self {
            id: DocumentId::from_bytes(&bytes),
            kind: DocumentKind::detect(&name, &bytes),
            name,
            bytes,
        }
    }

    /// Read a document from disk. A missing path is an ingestion error
    /// carrying [`FILE_NOT_FOUND`].
    pub async fn read(path: &Path) -> AppResult<Self> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Document not found: {:?}", path);
                return Err(AppError::Ingest(FILE_NOT_FOUND.to_string()));
            }
            Err(e) => return Err(AppError::Io(e)),
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());

        Ok(Self::new(name, bytes))
    }
}

/// Extract raw text from a document on the blocking pool.
pub async fn extract(document: &Document) -> AppResult<String> {
    let bytes = document.bytes.clone();
    let kind = document.kind;

    let text = tokio::task::spawn_blocking(move || extract_text(&bytes, kind))
        .await
        .map_err(|e| AppError::Ingest(format!("Text extraction aborted: {}", e)))??;

    tracing::debug!(
        document = %document.id.short(),
        kind = kind.as_str(),
        chars = text.len(),
        "Extracted document text"
    );

    Ok(text)
}

/// Extract raw text synchronously.
pub fn extract_text(bytes: &[u8], kind: DocumentKind) -> AppResult<String> {
    let text = match kind {
        DocumentKind::Pdf => extract_pdf(bytes)?,
        DocumentKind::Text => decode_lossy(bytes),
    };

    if text.trim() == FILE_NOT_FOUND {
        return Err(AppError::Ingest(FILE_NOT_FOUND.to_string()));
    }

    Ok(text)
}

fn extract_pdf(bytes: &[u8]) -> AppResult<String> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| AppError::Ingest(format!("PDF extraction failed: {}", e)))?;
    Ok(pages.join("\n"))
}

/// Decode UTF-8, dropping bytes that do not decode.
pub fn decode_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).replace(char::REPLACEMENT_CHARACTER, "")
}
