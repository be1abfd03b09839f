//! Memo type: a fragmented user note consumed by the merge pipeline.

use serde::{Deserialize, Serialize};

/// A short user note to be expanded into diary prose.
///
/// Memos are created by the caller per request and consumed once by the
/// merge orchestrator; `order` is the sole relationship between them.
/// Content is immutable once submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memo {
    /// Caller-assigned identifier
    pub id: u64,
    /// The note text
    pub content: String,
    /// Position within the day; memos are merged in ascending order
    pub order: u32,
}

impl Memo {
    /// Create a new memo.
    pub fn new(id: u64, content: impl Into<String>, order: u32) -> Self {
        Self {
            id,
            content: content.into(),
            order,
        }
    }
}

/// Sort memos by their `order` field, stable for equal orders.
pub fn sort_by_order(memos: &mut [Memo]) {
    memos.sort_by_key(|m| m.order);
}
