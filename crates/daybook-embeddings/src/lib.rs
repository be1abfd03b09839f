//! # daybook-embeddings
//!
//! Local sentence-embedding generation for Daybook using Candle.
//!
//! This crate turns diary sentences and candidate paragraphs into
//! unit-normalized vectors, enabling the style extractor and the merge
//! reranker to compare text by cosine similarity without external API calls.
//!
//! ## Features
//! - Local inference via Candle (no Python, no API)
//! - Multilingual MiniLM sentence-transformer (384 dimensions), so Korean
//!   and English diaries embed into the same space
//! - Automatic model file caching
//! - Batch embedding for throughput

pub mod cache;
pub mod candle;
pub mod error;
pub mod mock;
pub mod model;

pub use crate::candle::CandleEmbedder;
pub use cache::{get_or_download_model, ModelCache, ModelPaths, DEFAULT_MODEL_REPO, MODEL_FILES};
pub use error::EmbeddingError;
pub use mock::MockEmbedder;
pub use model::{mean_embedding, Embedding, EmbeddingModel, ModelInfo};
