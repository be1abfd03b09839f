//! Style extraction error types.

use thiserror::Error;

use daybook_embeddings::EmbeddingError;
use daybook_llm::ChatError;

/// Errors that can occur while extracting a style signature.
#[derive(Debug, Error)]
pub enum StyleError {
    /// A diary had no usable sentences after filtering
    #[error("Diary contains no usable sentences")]
    EmptyDiary,

    /// Fewer diaries than the operation requires
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Embedding layer failure
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Chat model failure during profiling
    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),
}
