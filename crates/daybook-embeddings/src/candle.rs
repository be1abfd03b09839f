//! Candle-based embedding implementation.
//!
//! Uses paraphrase-multilingual-MiniLM-L12-v2 (BERT architecture) for
//! 384-dimensional sentence embeddings with mean pooling.

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::cache::{get_or_download_model, ModelCache};
use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel, ModelInfo};

/// Embedding dimension for paraphrase-multilingual-MiniLM-L12-v2
pub const EMBEDDING_DIM: usize = 384;

/// Maximum sequence length
pub const MAX_SEQ_LENGTH: usize = 128;

/// Default batch size for embedding
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Candle-based sentence embedder.
pub struct CandleEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    info: ModelInfo,
}

impl CandleEmbedder {
    /// Load the embedding model from cache (downloading if needed).
    pub fn load(cache: &ModelCache) -> Result<Self, EmbeddingError> {
        let paths = get_or_download_model(cache)?;
        Self::load_from_paths(&paths.config, &paths.tokenizer, &paths.weights)
    }

    /// Load with default cache settings
    pub fn load_default() -> Result<Self, EmbeddingError> {
        let cache = ModelCache::default();
        Self::load(&cache)
    }

    /// Load from explicit file paths
    pub fn load_from_paths(
        config_path: &std::path::Path,
        tokenizer_path: &std::path::Path,
        weights_path: &std::path::Path,
    ) -> Result<Self, EmbeddingError> {
        info!("Loading embedding model...");

        // CPU inference only; GPU support would come in behind a feature flag
        let device = Device::Cpu;

        let config_str = std::fs::read_to_string(config_path)?;
        let config: BertConfig = serde_json::from_str(&config_str)
            .map_err(|e| EmbeddingError::ModelNotFound(format!("Invalid config: {}", e)))?;

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path.to_path_buf()], DType::F32, &device)?
        };

        let model = BertModel::load(vb, &config)?;

        info!(
            dim = EMBEDDING_DIM,
            max_seq = MAX_SEQ_LENGTH,
            "Model loaded successfully"
        );

        Ok(Self {
            model,
            tokenizer,
            device,
            info: ModelInfo {
                name: "paraphrase-multilingual-MiniLM-L12-v2".to_string(),
                dimension: EMBEDDING_DIM,
                max_sequence_length: MAX_SEQ_LENGTH,
            },
        })
    }

    /// Mean pooling over token embeddings (excluding padding)
    fn mean_pooling(
        &self,
        embeddings: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor, EmbeddingError> {
        let mask = attention_mask
            .unsqueeze(2)?
            .broadcast_as(embeddings.shape())?;
        let mask_f32 = mask.to_dtype(DType::F32)?;

        let masked = embeddings.broadcast_mul(&mask_f32)?;
        let sum = masked.sum(1)?;

        // Divide by number of real tokens, clamped to avoid division by zero
        let mask_sum = mask_f32.sum(1)?;
        let mask_sum = mask_sum.clamp(1e-9, f64::MAX)?;

        let mean = sum.broadcast_div(&mask_sum)?;
        Ok(mean)
    }

    /// Embed one bounded-size chunk of texts.
    fn embed_chunk(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;

        // Pad to the longest sequence in the chunk
        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0)
            .min(MAX_SEQ_LENGTH);

        let mut input_ids: Vec<Vec<u32>> = Vec::new();
        let mut attention_masks: Vec<Vec<u32>> = Vec::new();

        for encoding in &encodings {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();

            let truncated_len = ids.len().min(max_len);
            let mut padded_ids = ids[..truncated_len].to_vec();
            let mut padded_mask = mask[..truncated_len].to_vec();

            padded_ids.resize(max_len, 0);
            padded_mask.resize(max_len, 0);

            input_ids.push(padded_ids);
            attention_masks.push(padded_mask);
        }

        let batch_size = texts.len();
        let input_ids_flat: Vec<u32> = input_ids.into_iter().flatten().collect();
        let mask_flat: Vec<u32> = attention_masks.into_iter().flatten().collect();

        let input_ids = Tensor::from_vec(input_ids_flat, (batch_size, max_len), &self.device)?;
        let attention_mask = Tensor::from_vec(mask_flat, (batch_size, max_len), &self.device)?;
        let token_type_ids = Tensor::zeros_like(&input_ids)?;

        let output = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        let pooled = self.mean_pooling(&output, &attention_mask)?;

        let pooled_vec: Vec<Vec<f32>> = pooled.to_vec2()?;

        Ok(pooled_vec.into_iter().map(Embedding::new).collect())
    }
}

impl EmbeddingModel for CandleEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let mut embeddings = self.embed_batch(&[text])?;
        embeddings
            .pop()
            .ok_or_else(|| EmbeddingError::InvalidInput("empty embedding batch".into()))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        debug!(count = texts.len(), "Embedding batch");

        let mut embeddings = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(DEFAULT_BATCH_SIZE) {
            embeddings.extend(self.embed_chunk(chunk)?);
        }

        debug!(
            count = embeddings.len(),
            dim = EMBEDDING_DIM,
            "Batch complete"
        );

        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Note: Integration tests require model download, run with:
    // cargo test -p daybook-embeddings -- --ignored

    #[test]
    #[ignore = "requires model download"]
    fn test_load_model() {
        let embedder = CandleEmbedder::load_default().unwrap();
        assert_eq!(embedder.info().dimension, EMBEDDING_DIM);
    }

    #[test]
    #[ignore = "requires model download"]
    fn test_embed_batch_preserves_order_and_norm() {
        let embedder = CandleEmbedder::load_default().unwrap();
        let texts = vec!["아침으로 빵을 먹었다.", "저녁을 가족과 먹었다.", "Hello"];
        let embeddings = embedder.embed_batch(&texts).unwrap();
        assert_eq!(embeddings.len(), 3);
        for emb in &embeddings {
            assert_eq!(emb.dimension(), EMBEDDING_DIM);
            let norm: f32 = emb.values.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-3);
        }
    }

    #[test]
    #[ignore = "requires model download"]
    fn test_similar_texts_high_similarity() {
        let embedder = CandleEmbedder::load_default().unwrap();
        let emb1 = embedder.embed("The cat sat on the mat").unwrap();
        let emb2 = embedder.embed("A cat is sitting on a mat").unwrap();
        let emb3 = embedder.embed("Python programming language").unwrap();

        let sim_similar = emb1.cosine_similarity(&emb2);
        let sim_different = emb1.cosine_similarity(&emb3);

        assert!(sim_similar > sim_different);
    }
}
