//! # daybook-merge
//!
//! Style-conditioned memo-merging pipeline.
//!
//! Expands an ordered list of memos into continuous diary prose, one
//! paragraph per memo, steered by the user's style signature:
//! - **Candidate generation**: per memo, the chat model produces several
//!   candidate paragraphs bounded by computed sentence-count limits
//! - **Reranking**: candidates are embedded and the one closest to the
//!   user's style vector wins
//! - **Sequential orchestration**: the growing diary is fed back into every
//!   subsequent generation call so paragraphs read as one narrative
//!
//! Two modes: [`MergeEngine::merge`] (batch, k candidates, rerank) and
//! [`MergeEngine::merge_stream`] (one candidate per memo, token deltas
//! forwarded live, no reranking).

mod engine;
mod error;
mod prompts;
mod rerank;
mod text;

pub use engine::{MergeEngine, MergeOptions, StyleContext};
pub use error::MergeError;
pub use rerank::{choose_best_candidate, split_candidates, CANDIDATE_SEPARATOR};
pub use text::{count_sentences, sentence_bounds};

/// Paragraph boundary marker in the accumulated diary.
///
/// Downstream parsing relies on this being consistent across both modes.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";
