//! Mock chat model for testing.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::chat::{ChatError, ChatModel};

/// Mock chat model that replays scripted replies in order.
///
/// Useful for testing the merge orchestrator and analysis services without
/// network calls. Records every prompt it receives so tests can assert on
/// prompt contents.
pub struct MockChat {
    replies: Mutex<VecDeque<Result<String, ChatError>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockChat {
    /// Create a mock with no scripted replies (every call errors).
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock scripted with the given replies, in call order.
    pub fn with_replies(replies: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mock = Self::new();
        {
            let mut queue = mock.replies.lock().unwrap();
            for reply in replies {
                queue.push_back(Ok(reply.into()));
            }
        }
        mock
    }

    /// Queue one more reply.
    pub fn push_reply(&self, reply: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(reply.into()));
    }

    /// Queue a failure.
    pub fn push_error(&self, message: impl Into<String>) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(ChatError::Api(message.into())));
    }

    /// All prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn next_reply(&self, prompt: &str) -> Result<String, ChatError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ChatError::Api("mock replies exhausted".to_string())))
    }
}

impl Default for MockChat {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatModel for MockChat {
    async fn complete(&self, _system: &str, prompt: &str) -> Result<String, ChatError> {
        self.next_reply(prompt)
    }

    async fn complete_stream(
        &self,
        _system: &str,
        prompt: &str,
        tx: mpsc::Sender<String>,
    ) -> Result<String, ChatError> {
        let reply = self.next_reply(prompt)?;

        // Stream word by word to exercise token accumulation
        let mut first = true;
        for word in reply.split(' ') {
            let token = if first {
                word.to_string()
            } else {
                format!(" {}", word)
            };
            first = false;
            if tx.send(token).await.is_err() {
                return Err(ChatError::Cancelled);
            }
        }

        Ok(reply)
    }
}
