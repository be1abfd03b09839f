//! Merge pipeline error types.

use thiserror::Error;

use daybook_embeddings::EmbeddingError;
use daybook_llm::ChatError;

/// Errors that can occur during a merge run.
///
/// A memo whose generation yields no usable candidates is NOT an error;
/// the orchestrator skips it silently.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Missing or malformed request data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Chat model transport/auth failure; aborts the whole merge
    #[error("Chat error: {0}")]
    Chat(ChatError),

    /// Embedding layer failure during reranking
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// The streaming consumer disconnected mid-merge
    #[error("Merge cancelled: stream consumer disconnected")]
    Cancelled,
}

impl From<ChatError> for MergeError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Cancelled => MergeError::Cancelled,
            other => MergeError::Chat(other),
        }
    }
}
