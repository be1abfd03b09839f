//! # daybook-types
//!
//! Shared domain types for the Daybook diary assistant.
//!
//! This crate defines the core data structures used throughout the system:
//! - Memos: Fragmented user notes to be merged into diary prose
//! - Style: Vector and profile representations of a user's writing voice
//! - Analysis: Diary analysis and weekly/monthly summary schemas
//! - Settings: Configuration types
//!
//! ## Usage
//!
//! ```rust
//! use daybook_types::Memo;
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod memo;
pub mod style;

pub use analysis::{DiaryAnalysis, Highlight, MonthSummary, WeekSummary};
pub use config::{ChatSettings, EmbeddingSettings, MergeSettings, Settings};
pub use error::DaybookError;
pub use memo::Memo;
pub use style::{StyleProfile, StyleVector};
