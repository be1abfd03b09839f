//! # daybook-analysis
//!
//! Diary sentiment/keyword analysis and weekly/monthly summaries.
//!
//! These services are prompt/schema wrappers over the chat model: each
//! operation is one call whose JSON reply deserializes into the schemas in
//! `daybook-types`. The only local logic is input-count validation and
//! reply parsing.

mod diary;
mod error;
mod summary;

pub use diary::DiaryAnalyzer;
pub use error::AnalysisError;
pub use summary::{SummaryService, MIN_DIARIES_PER_WEEK, MIN_WEEKS_PER_MONTH};
