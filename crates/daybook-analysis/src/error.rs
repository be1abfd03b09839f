//! Analysis error types.

use thiserror::Error;

use daybook_llm::ChatError;

/// Errors that can occur during analysis or summarization.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Missing or insufficient input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Chat model failure
    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),

    /// Model reply did not match the expected schema
    #[error("Failed to parse analysis reply: {0}")]
    Parse(String),
}
