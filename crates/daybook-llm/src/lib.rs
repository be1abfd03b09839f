//! # daybook-llm
//!
//! Chat-completion client for Daybook.
//!
//! Provides:
//! - A pluggable [`ChatModel`] trait used by the style profiler, the merge
//!   orchestrator, and the analysis services
//! - An OpenAI-compatible implementation over reqwest, with retrying
//!   blocking calls and SSE token streaming
//! - A scripted [`MockChat`] for tests

mod chat;
mod json;
mod mock;
mod openai;
mod sse;

pub use chat::{ChatError, ChatModel};
pub use json::extract_json;
pub use mock::MockChat;
pub use openai::{OpenAiChat, OpenAiChatConfig};
