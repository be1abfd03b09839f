//! # daybook-style
//!
//! Writing-style signature extraction.
//!
//! A user's style signature has three parts, refreshed together from their
//! diary corpus:
//! - a unit-norm **style vector** (aggregate of per-diary embeddings)
//! - **style examples**: representative sentences closest to that vector
//! - a qualitative **style profile** produced by a language-model call
//!
//! The merge pipeline consumes all three: the profile and examples steer
//! generation, the vector reranks candidates.

mod error;
mod extractor;
mod profiler;

pub use error::StyleError;
pub use extractor::{compute_style_vector, diary_embedding, extract_style_examples};
pub use profiler::StyleProfiler;

use std::sync::Arc;

use daybook_embeddings::EmbeddingModel;
use daybook_types::{StyleProfile, StyleVector};

/// A user's complete style signature.
#[derive(Debug, Clone)]
pub struct StyleSignature {
    pub vector: StyleVector,
    pub examples: Vec<String>,
    pub profile: StyleProfile,
}

/// Number of representative sentences selected by default.
pub const DEFAULT_EXAMPLE_COUNT: usize = 4;

/// Extract the full style signature from a diary corpus.
///
/// Runs the vector computation and example selection locally, then one
/// profiling call against the chat model.
pub async fn extract_style(
    embedder: &Arc<dyn EmbeddingModel>,
    profiler: &StyleProfiler,
    diaries: &[String],
) -> Result<StyleSignature, StyleError> {
    let vector = compute_style_vector(embedder.as_ref(), diaries)?;
    let examples =
        extract_style_examples(embedder.as_ref(), diaries, &vector, DEFAULT_EXAMPLE_COUNT)?;
    let profile = profiler.profile(diaries).await?;

    Ok(StyleSignature {
        vector,
        examples,
        profile,
    })
}
