//! Chat-model trait and error type.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Error type for chat-model operations.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("API request failed: {0}")]
    Api(String),

    #[error("Failed to parse API response: {0}")]
    Parse(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// The API rejected the request itself; repeating it cannot succeed.
    #[error("Request rejected: {0}")]
    InvalidRequest(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Stream consumer disconnected")]
    Cancelled,
}

/// Pluggable chat-completion model.
///
/// Implementations are constructed once at process start and shared
/// read-only across requests.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one completion and return the full reply text.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, ChatError>;

    /// Run one completion, forwarding token deltas to `tx` as they arrive.
    ///
    /// Returns the accumulated reply text. A closed receiver means the
    /// consumer went away; implementations stop reading and return
    /// [`ChatError::Cancelled`].
    async fn complete_stream(
        &self,
        system: &str,
        prompt: &str,
        tx: mpsc::Sender<String>,
    ) -> Result<String, ChatError>;
}
