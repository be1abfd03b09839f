//! Embedding model trait and types.
//!
//! Defines the interface the style extractor and merge reranker use to turn
//! text into vectors. Implementations must preserve input order and return
//! unit-normalized vectors.

use crate::error::EmbeddingError;

/// Vector embedding - a unit-normalized float array.
#[derive(Debug, Clone)]
pub struct Embedding {
    /// The embedding vector (normalized to unit length)
    pub values: Vec<f32>,
}

impl Embedding {
    /// Create a new embedding from raw values, normalizing to unit length.
    /// A zero vector is left unchanged to avoid division by zero.
    pub fn new(values: Vec<f32>) -> Self {
        let norm: f32 = values.iter().map(|x| x * x).sum::<f32>().sqrt();
        let normalized = if norm > 0.0 {
            values.iter().map(|x| x / norm).collect()
        } else {
            values
        };
        Self { values: normalized }
    }

    /// Create embedding without normalization (for pre-normalized vectors).
    pub fn from_normalized(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Get the embedding dimension.
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Compute cosine similarity with another embedding.
    /// Returns value in [-1, 1] range (1 = identical), 0.0 on dimension
    /// mismatch.
    pub fn cosine_similarity(&self, other: &Embedding) -> f32 {
        self.dot(&other.values)
    }

    /// Dot product against a raw vector of the same dimension.
    /// Since embeddings are normalized, this equals cosine similarity.
    pub fn dot(&self, other: &[f32]) -> f32 {
        if self.values.len() != other.len() {
            return 0.0;
        }
        self.values
            .iter()
            .zip(other.iter())
            .map(|(a, b)| a * b)
            .sum()
    }
}

/// Compute the renormalized mean of a set of embeddings.
///
/// Each aggregation step in the style pipeline (sentences -> diary,
/// diaries -> user) averages vectors and renormalizes the result.
/// Fails on an empty set or mismatched dimensions.
pub fn mean_embedding(embeddings: &[Embedding]) -> Result<Embedding, EmbeddingError> {
    let first = embeddings
        .first()
        .ok_or_else(|| EmbeddingError::InvalidInput("cannot average zero embeddings".into()))?;
    let dim = first.dimension();

    let mut sum = vec![0.0f32; dim];
    for emb in embeddings {
        if emb.dimension() != dim {
            return Err(EmbeddingError::DimensionMismatch {
                expected: dim,
                actual: emb.dimension(),
            });
        }
        for (acc, v) in sum.iter_mut().zip(emb.values.iter()) {
            *acc += v;
        }
    }

    let n = embeddings.len() as f32;
    for acc in &mut sum {
        *acc /= n;
    }

    Ok(Embedding::new(sum))
}

/// Model information
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Model name (e.g., "paraphrase-multilingual-MiniLM-L12-v2")
    pub name: String,
    /// Embedding dimension
    pub dimension: usize,
    /// Maximum sequence length in tokens
    pub max_sequence_length: usize,
}

/// Trait for embedding models.
///
/// Implementations must be thread-safe (Send + Sync): the embedder is
/// constructed once at process start and shared read-only across requests.
pub trait EmbeddingModel: Send + Sync {
    /// Get model information
    fn info(&self) -> &ModelInfo;

    /// Generate embedding for a single text.
    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError>;

    /// Generate embeddings for multiple texts (batch), preserving order.
    /// Default implementation calls embed() for each text.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    /// Generate embeddings for multiple owned strings.
    fn embed_texts(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        let refs: Vec<&str> = texts.iter().map(|s| s.as_str()).collect();
        self.embed_batch(&refs)
    }
}
