//! Text chunking with configurable size and overlap.

use crate::types::{Chunk, DocumentId};
use finqa_core::{AppError, AppResult};
use text_splitter::{ChunkConfig, TextSplitter};

/// Chunk size and overlap, both in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkerConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1500,
            chunk_overlap: 300,
        }
    }
}

impl ChunkerConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> AppResult<Self> {
        let config = Self {
            chunk_size,
            chunk_overlap,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.chunk_size == 0 {
            return Err(AppError::Knowledge("Chunk size must be positive".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::Knowledge(format!(
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    fn splitter(&self) -> AppResult<TextSplitter<text_splitter::Characters>> {
        self.validate()?;
        let config = ChunkConfig::new(self.chunk_size)
            .with_overlap(self.chunk_overlap)
            .map_err(|e| AppError::Knowledge(format!("Invalid chunk configuration: {}", e)))?
            .with_trim(false);
        Ok(TextSplitter::new(config))
    }
}

/// Split normalized text into overlapping chunks.
///
/// Splits prefer paragraph, then line, then word boundaries. Text shorter
/// than the chunk size yields a single chunk equal to the input.
pub fn chunk_text(document_id: &DocumentId, text: &str, config: &ChunkerConfig) -> AppResult<Vec<Chunk>> {
    let splitter = config.splitter()?;

    let chunks: Vec<Chunk> = splitter
        .chunk_indices(text)
        .filter(|(_, piece)| !piece.trim().is_empty())
        .enumerate()
        .map(|(position, (offset, piece))| {
            Chunk::new(
                document_id,
                position as u32,
                piece.to_string(),
                (offset, offset + piece.len()),
            )
        })
        .collect();

    tracing::debug!(
        "Chunked text into {} chunks (size: {}, overlap: {})",
        chunks.len(),
        config.chunk_size,
        config.chunk_overlap
    );

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> DocumentId {
        DocumentId::from_bytes(b"test document")
    }

    #[test]
    fn test_short_text_single_chunk() {
        let text = "total net sales $ 1,000 $ 2,000";
        let chunks = chunk_text(&doc(), text, &ChunkerConfig::default()).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
        assert_eq!(chunks[0].position, 0);
        assert_eq!(chunks[0].byte_range, (0, text.len()));
    }

    #[test]
    fn test_empty_text() {
        let chunks = chunk_text(&doc(), "", &ChunkerConfig::default()).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_chunks_respect_size_and_overlap() {
        let text = "iphone net sales rose again this quarter. ".repeat(200);
        let config = ChunkerConfig::new(200, 40).unwrap();
        let chunks = chunk_text(&doc(), &text, &config).unwrap();

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 200);
            assert_eq!(&text[chunk.byte_range.0..chunk.byte_range.1], chunk.text);
        }

        for pair in chunks.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            assert!(next.byte_range.0 >= prev.byte_range.0);
            let overlap = prev.byte_range.1.saturating_sub(next.byte_range.0);
            assert!(overlap <= 40, "overlap {} exceeds 40", overlap);
        }

        let positions: Vec<u32> = chunks.iter().map(|c| c.position).collect();
        let expected: Vec<u32> = (0..chunks.len() as u32).collect();
        assert_eq!(positions, expected);
    }

    #[test]
    fn test_chunks_start_at_beginning() {
        let text = "mac net sales $ 3,000 $ 2,500\n".repeat(100);
        let config = ChunkerConfig::new(150, 30).unwrap();
        let chunks = chunk_text(&doc(), &text, &config).unwrap();

        assert_eq!(chunks[0].byte_range.0, 0);
        assert!(chunks.iter().all(|c| c.text.contains("net sales")));
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        assert!(ChunkerConfig::new(100, 100).is_err());
        assert!(ChunkerConfig::new(0, 0).is_err());
        let config = ChunkerConfig {
            chunk_size: 10,
            chunk_overlap: 20,
        };
        assert!(chunk_text(&doc(), "text", &config).is_err());
    }

    #[test]
    fn test_chunk_ids_are_stable() {
        let text = "services net sales $ 2,000 $ 1,800 ".repeat(50);
        let config = ChunkerConfig::new(100, 20).unwrap();
        let first = chunk_text(&doc(), &text, &config).unwrap();
        let second = chunk_text(&doc(), &text, &config).unwrap();
        assert_eq!(first, second);
    }
}
