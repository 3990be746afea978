//! Local trigram embeddings for offline operation and tests.

use crate::embeddings::provider::EmbeddingProvider;
use finqa_core::{AppError, AppResult};
use std::collections::HashMap;

const MODEL_NAME: &str = "trigram-v1";

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them", "what", "how",
];

/// Deterministic hashed embeddings built from word and character trigram
/// counts.
///
/// Not semantic, but texts sharing words land close together, which is
/// enough to rank chunks of a single filing against a question.
#[derive(Debug, Clone)]
pub struct TrigramProvider {
    dimensions: usize,
}

impl TrigramProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

/// Hash `text` into a unit vector of `dimensions` entries.
///
/// Empty or stop-word-only text yields the zero vector.
pub fn trigram_vector(text: &str, dimensions: usize) -> Vec<f32> {
    let mut embedding = vec![0.0f32; dimensions];
    if dimensions == 0 {
        return embedding;
    }

    let lower = text.to_lowercase();
    let mut word_freq: HashMap<&str, u32> = HashMap::new();
    for word in lower
        .split_whitespace()
        .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
    {
        *word_freq.entry(word).or_insert(0) += 1;
    }

    for (word, freq) in &word_freq {
        let chars: Vec<char> = word.chars().collect();
        for window in chars.windows(3) {
            let trigram: String = window.iter().collect();
            let idx = (fold_hash(&trigram, 37) as usize) % dimensions;
            embedding[idx] += (*freq as f32).sqrt();
        }

        let idx = (fold_hash(word, 31) as usize) % dimensions;
        embedding[idx] += *freq as f32;
    }

    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in &mut embedding {
            *v /= norm;
        }
    }

    embedding
}

fn fold_hash(s: &str, multiplier: u64) -> u64 {
    s.bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(multiplier).wrapping_add(b as u64))
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        MODEL_NAME
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let texts = texts.to_vec();
        let dimensions = self.dimensions;

        tokio::task::spawn_blocking(move || {
            texts
                .iter()
                .map(|text| trigram_vector(text, dimensions))
                .collect()
        })
        .await
        .map_err(|e| AppError::Knowledge(format!("Embedding task failed: {}", e)))
    }
}
