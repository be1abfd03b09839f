//! Single-diary analysis.

use std::sync::Arc;

use tracing::debug;

use daybook_llm::{extract_json, ChatModel};
use daybook_types::DiaryAnalysis;

use crate::error::AnalysisError;

const ANALYZE_SYSTEM: &str = "You are an analysis assistant for a diary app.";

const ANALYZE_PROMPT: &str = r#"Here is the user's daily diary. Analyze it and produce:

1. a list of keywords summarizing the diary (min 1, max 5)
2. an emoji representing the diary
3. an emotion score, criteria: happiness (-1.0 to 1.0)
4. one line of feedback for the user

Return ONLY a JSON object with exactly these fields:
{"keywords": [...], "emoji": "...", "emotion_score": 0.0, "feedback": "..."}

Respond in the same language as the user's input.
---
Diary:
{DIARY}"#;

/// Analyzes a finished diary: keywords, emoji, emotion score, feedback.
pub struct DiaryAnalyzer {
    chat: Arc<dyn ChatModel>,
}

impl DiaryAnalyzer {
    /// Create a new analyzer over the given chat model.
    pub fn new(chat: Arc<dyn ChatModel>) -> Self {
        Self { chat }
    }

    /// Analyze one diary. Fails on empty/whitespace input.
    pub async fn analyze(&self, diary: &str) -> Result<DiaryAnalysis, AnalysisError> {
        if diary.trim().is_empty() {
            return Err(AnalysisError::InvalidInput(
                "diary text is required".to_string(),
            ));
        }

        let prompt = ANALYZE_PROMPT.replace("{DIARY}", diary);
        let reply = self.chat.complete(ANALYZE_SYSTEM, &prompt).await?;
        debug!(reply_len = reply.len(), "Diary analysis reply received");

        serde_json::from_str(&extract_json(&reply)).map_err(|e| AnalysisError::Parse(e.to_string()))
    }
}
