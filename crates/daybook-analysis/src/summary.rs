//! Weekly and monthly summaries.

use std::sync::Arc;

use tracing::debug;

use daybook_llm::{extract_json, ChatModel};
use daybook_types::{MonthSummary, WeekSummary};

use crate::error::AnalysisError;

/// Minimum diaries for a weekly summary.
pub const MIN_DIARIES_PER_WEEK: usize = 3;

/// Minimum week summaries for a monthly summary.
pub const MIN_WEEKS_PER_MONTH: usize = 2;

const WEEK_SYSTEM: &str =
    "You are an AI summarization assistant specialized in emotional diary analysis.";

const WEEK_PROMPT: &str = r#"Analyze the following diaries written by a user over a week.
Summarize emotional and thematic trends, identify emerging topics,
and extract 1-3 key highlights (meaningful days).

Return ONLY a JSON object with exactly these fields:
{
  "title": "concise title for the week",
  "overview": "2-3 sentences on the week's emotional and behavioral trend",
  "emerging_topics": ["2-5 recurring or emerging themes"],
  "trend": "increasing | stable | decreasing",
  "dominant_emoji": "one emoji for the week's overall tone",
  "highlights": [{"date": "YYYY-MM-DD", "summary": "one-line summary"}],
  "emotion_cycle": "emotional flow across the week, max 3 stages",
  "advice": "personalized advice from the week's trends"
}

Do not include extra text or explanations. Respond in the same language as the user's input.

---
Diaries:
{DIARIES}"#;

const MONTH_SYSTEM: &str =
    "You are an AI summarization assistant specialized in emotional pattern tracking.";

const MONTH_PROMPT: &str = r#"Based on the provided week summaries, generate a single monthly overview
that captures the emotional and behavioral trends of the entire month.
Extract emerging topics, summarize emotional cycles, and offer reflective advice.

Return ONLY a JSON object with exactly these fields:
{
  "title": "concise title for the month",
  "overview": "2-5 sentences on the month's emotional and behavioral trend",
  "dominant_emoji": "one emoji for the month's overall tone",
  "emerging_topics": ["2-5 recurring or emerging themes"],
  "emotion_cycle": "emotional flow across the month, max 5 stages",
  "advice": "personalized advice from the month's trends"
}

Do not include extra text or explanations. Respond in the same language as the user's input.

---
Week summaries:
{WEEKS}"#;

/// Summarizes diaries over weekly and monthly windows.
pub struct SummaryService {
    chat: Arc<dyn ChatModel>,
}

impl SummaryService {
    /// Create a new summary service over the given chat model.
    pub fn new(chat: Arc<dyn ChatModel>) -> Self {
        Self { chat }
    }

    /// Summarize one week of diaries. Requires at least
    /// [`MIN_DIARIES_PER_WEEK`] entries.
    pub async fn summarize_week(&self, diaries: &[String]) -> Result<WeekSummary, AnalysisError> {
        if diaries.len() < MIN_DIARIES_PER_WEEK {
            return Err(AnalysisError::InvalidInput(format!(
                "at least {} diaries are required for a weekly summary",
                MIN_DIARIES_PER_WEEK
            )));
        }

        let diaries_text = diaries
            .iter()
            .enumerate()
            .map(|(i, d)| format!("{}. {}", i + 1, d))
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = WEEK_PROMPT.replace("{DIARIES}", &diaries_text);
        let reply = self.chat.complete(WEEK_SYSTEM, &prompt).await?;
        debug!(reply_len = reply.len(), "Week summary reply received");

        serde_json::from_str(&extract_json(&reply)).map_err(|e| AnalysisError::Parse(e.to_string()))
    }

    /// Summarize one month from its week summaries. Requires at least
    /// [`MIN_WEEKS_PER_MONTH`] summaries.
    pub async fn summarize_month(
        &self,
        weeks: &[WeekSummary],
    ) -> Result<MonthSummary, AnalysisError> {
        if weeks.len() < MIN_WEEKS_PER_MONTH {
            return Err(AnalysisError::InvalidInput(format!(
                "at least {} week summaries are required for a monthly summary",
                MIN_WEEKS_PER_MONTH
            )));
        }

        let weeks_json = serde_json::to_string_pretty(weeks)
            .map_err(|e| AnalysisError::Parse(e.to_string()))?;

        let prompt = MONTH_PROMPT.replace("{WEEKS}", &weeks_json);
        let reply = self.chat.complete(MONTH_SYSTEM, &prompt).await?;
        debug!(reply_len = reply.len(), "Month summary reply received");

        serde_json::from_str(&extract_json(&reply)).map_err(|e| AnalysisError::Parse(e.to_string()))
    }
}
