//! Qualitative style profiling via a language-model call.

use std::sync::Arc;

use tracing::debug;

use daybook_llm::{extract_json, ChatModel};
use daybook_types::StyleProfile;

use crate::error::StyleError;

const PROFILE_SYSTEM: &str = "You are a writing-style analyst specialized in personal diaries.";

const PROFILE_PROMPT: &str = r#"Read the following diary entries and analyze the writer's stylistic
habits precisely. Focus on HOW they write, not WHAT they write about.

Output format (JSON):
{
  "tone": "overall tone and mood of the writing",
  "formality": "formal / casual / colloquial / literary / mixed",
  "sentence_length": "short / medium / long",
  "sentence_structure": "simple sentences / compound with connectives / descriptive / fragmented",
  "sentence_endings": ["representative sentence-ending expressions"],
  "lexical_choice": "word choice tendencies",
  "common_phrases": ["expressions repeated with notable frequency"],
  "emotional_tone": "intensity and direction of emotional expression",
  "irony_or_sarcasm": "use of irony or sarcasm",
  "slang_or_dialect": "use of slang, internet language, or dialect",
  "pacing": "sentence rhythm (fast / moderate / slow)",
  "overall_style_summary": "synthesis of the elements above"
}

Return ONLY the JSON object. Respond in the same language as the diaries.

Diaries:
{TEXT}"#;

/// Produces a structured style description from a diary corpus.
///
/// One chat call with a fixed analytical prompt; the reply is JSON-decoded
/// into a [`StyleProfile`], falling back to a raw-text wrapper when the
/// model does not return valid JSON.
pub struct StyleProfiler {
    chat: Arc<dyn ChatModel>,
}

impl StyleProfiler {
    /// Create a new profiler over the given chat model.
    pub fn new(chat: Arc<dyn ChatModel>) -> Self {
        Self { chat }
    }

    /// Analyze the corpus and return a style profile.
    pub async fn profile(&self, diaries: &[String]) -> Result<StyleProfile, StyleError> {
        if diaries.is_empty() {
            return Err(StyleError::InvalidInput(
                "at least 1 diary is required".to_string(),
            ));
        }

        let text = diaries.join("\n");
        let prompt = PROFILE_PROMPT.replace("{TEXT}", &text);

        let reply = self.chat.complete(PROFILE_SYSTEM, &prompt).await?;
        debug!(reply_len = reply.len(), "Style profile reply received");

        Ok(StyleProfile::from_model_reply(&extract_json(&reply)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daybook_llm::MockChat;

    #[tokio::test]
    async fn test_profile_parses_json_reply() {
        let chat = Arc::new(MockChat::with_replies([
            r#"{"tone": "reflective", "pacing": "slow"}"#,
        ]));
        let profiler = StyleProfiler::new(chat.clone());

        let profile = profiler.profile(&["오늘은 조용했다.".to_string()]).await.unwrap();
        assert_eq!(profile.0["tone"], "reflective");

        // The diary text must be embedded in the prompt
        assert!(chat.prompts()[0].contains("오늘은 조용했다."));
    }

    #[tokio::test]
    async fn test_profile_falls_back_on_prose_reply() {
        let chat = Arc::new(MockChat::with_replies([
            "The writer keeps things short and wry.",
        ]));
        let profiler = StyleProfiler::new(chat);

        let profile = profiler.profile(&["일기".to_string()]).await.unwrap();
        assert_eq!(
            profile.0["style_summary"],
            "The writer keeps things short and wry."
        );
    }

    #[tokio::test]
    async fn test_profile_propagates_chat_failure() {
        let chat = Arc::new(MockChat::new());
        chat.push_error("network down");
        let profiler = StyleProfiler::new(chat);

        assert!(matches!(
            profiler.profile(&["일기".to_string()]).await,
            Err(StyleError::Chat(_))
        ));
    }

    #[tokio::test]
    async fn test_profile_requires_diaries() {
        let profiler = StyleProfiler::new(Arc::new(MockChat::new()));
        assert!(matches!(
            profiler.profile(&[]).await,
            Err(StyleError::InvalidInput(_))
        ));
    }
}
