//! Result schemas for diary analysis and weekly/monthly summaries.
//!
//! These mirror the JSON shapes requested from the language model; the
//! analysis services deserialize model replies directly into them.

use serde::{Deserialize, Serialize};

/// Analysis of a single finished diary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryAnalysis {
    /// Keywords summarizing the diary (1-5)
    pub keywords: Vec<String>,
    /// An emoji representing the diary
    pub emoji: String,
    /// Happiness score in [-1.0, 1.0]
    pub emotion_score: f32,
    /// One-line feedback for the user
    pub feedback: String,
}

/// A significant day within a summarized week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    /// Date of the day (YYYY-MM-DD)
    pub date: String,
    /// One-line summary of the day
    pub summary: String,
}

/// Weekly summary over a set of diaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSummary {
    /// Concise title capturing the week's essence
    pub title: String,
    /// 2-3 sentences on the week's emotional and behavioral trend
    pub overview: String,
    /// Recurring or emerging themes (2-5)
    pub emerging_topics: Vec<String>,
    /// Sentiment trend: increasing, stable, or decreasing
    pub trend: String,
    /// Emoji for the week's overall emotional tone
    pub dominant_emoji: String,
    /// Significant daily highlights (1-3)
    pub highlights: Vec<Highlight>,
    /// Short description of the emotional flow across the week
    pub emotion_cycle: String,
    /// Personalized advice derived from the week's trends
    pub advice: String,
}

/// Monthly summary over a set of week summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSummary {
    /// Concise title capturing the month's essence
    pub title: String,
    /// 2-5 sentences on the month's emotional and behavioral trend
    pub overview: String,
    /// Emoji for the month's overall emotional tone
    pub dominant_emoji: String,
    /// Recurring or emerging themes (2-5)
    pub emerging_topics: Vec<String>,
    /// Short description of the emotional flow across the month
    pub emotion_cycle: String,
    /// Personalized advice derived from the month's trends
    pub advice: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diary_analysis_roundtrip() {
        let json = r#"{
            "keywords": ["friends", "lunch"],
            "emoji": "😊",
            "emotion_score": 0.7,
            "feedback": "A warm day with people you care about."
        }"#;
        let analysis: DiaryAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(analysis.keywords.len(), 2);
        assert!((analysis.emotion_score - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_week_summary_deserializes_highlights() {
        let json = r#"{
            "title": "A steady week",
            "overview": "Mood held steady.",
            "emerging_topics": ["work", "rest"],
            "trend": "stable",
            "dominant_emoji": "😌",
            "highlights": [{"date": "2025-10-27", "summary": "Quiet walk"}],
            "emotion_cycle": "Calm throughout",
            "advice": "Keep the evening walks."
        }"#;
        let week: WeekSummary = serde_json::from_str(json).unwrap();
        assert_eq!(week.highlights.len(), 1);
        assert_eq!(week.highlights[0].date, "2025-10-27");
    }
}
