//! Mock embedder for testing.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel, ModelInfo};

/// Mock embedder that generates deterministic vectors.
///
/// Useful for testing the style extractor and merge reranker without
/// loading the Candle model. Texts without a registered vector get a
/// deterministic pseudo-random unit vector derived from their hash, so the
/// same text always embeds identically within and across runs.
pub struct MockEmbedder {
    info: ModelInfo,
    overrides: HashMap<String, Vec<f32>>,
}

impl MockEmbedder {
    /// Create a mock embedder with the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            info: ModelInfo {
                name: "mock".to_string(),
                dimension,
                max_sequence_length: 128,
            },
            overrides: HashMap::new(),
        }
    }

    /// Register a fixed (unnormalized) vector for a specific text.
    pub fn with_vector(mut self, text: impl Into<String>, values: Vec<f32>) -> Self {
        self.overrides.insert(text.into(), values);
        self
    }

    fn hash_vector(&self, text: &str) -> Vec<f32> {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        text.hash(&mut hasher);
        let mut state = hasher.finish() | 1;

        // xorshift over the hash seed, mapped into [-1, 1]
        (0..self.info.dimension)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state as f32 / u64::MAX as f32) * 2.0 - 1.0
            })
            .collect()
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(8)
    }
}

impl EmbeddingModel for MockEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let values = self
            .overrides
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.hash_vector(text));

        if values.len() != self.info.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.info.dimension,
                actual: values.len(),
            });
        }

        Ok(Embedding::new(values))
    }
}
