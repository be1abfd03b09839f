//! Sequential merge orchestrator.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use daybook_embeddings::EmbeddingModel;
use daybook_llm::ChatModel;
use daybook_types::memo::sort_by_order;
use daybook_types::{MergeSettings, Memo, StyleProfile, StyleVector};

use crate::error::MergeError;
use crate::prompts::{rerank_prompt, stream_prompt, PromptContext, SYSTEM_MESSAGE};
use crate::rerank::{choose_best_candidate, split_candidates};
use crate::text::{count_sentences, sentence_bounds};
use crate::PARAGRAPH_SEPARATOR;

/// Style signature inputs for one merge run.
#[derive(Debug, Clone)]
pub struct StyleContext {
    pub profile: StyleProfile,
    pub examples: Vec<String>,
    pub vector: StyleVector,
}

/// Tuning knobs for the merge orchestrator.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Candidate paragraphs requested per memo in rerank mode
    pub num_candidates: usize,
    /// Upper elaboration bound relative to the memo's sentence count
    pub growth_factor: f32,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            num_candidates: 3,
            growth_factor: 1.5,
        }
    }
}

impl From<&MergeSettings> for MergeOptions {
    fn from(settings: &MergeSettings) -> Self {
        Self {
            num_candidates: settings.num_candidates,
            growth_factor: settings.growth_factor,
        }
    }
}

/// Drives the per-memo candidate-generation/rerank loop.
///
/// Model handles are shared read-only; each merge call carries its own
/// accumulator, so one engine serves concurrent requests.
pub struct MergeEngine {
    chat: Arc<dyn ChatModel>,
    embedder: Arc<dyn EmbeddingModel>,
    options: MergeOptions,
}

impl MergeEngine {
    /// Create a new engine over the given model handles.
    pub fn new(
        chat: Arc<dyn ChatModel>,
        embedder: Arc<dyn EmbeddingModel>,
        options: MergeOptions,
    ) -> Self {
        Self {
            chat,
            embedder,
            options,
        }
    }

    fn prepare(
        &self,
        memos: &[Memo],
        style: &StyleContext,
    ) -> Result<(Vec<Memo>, PromptContext, StyleVector), MergeError> {
        if memos.is_empty() {
            return Err(MergeError::InvalidInput(
                "at least 1 memo is required".to_string(),
            ));
        }

        let mut memos = memos.to_vec();
        sort_by_order(&mut memos);

        let ctx = PromptContext::new(style.profile.to_prompt_text(), &style.examples, &memos);

        let mut style_vec = style.vector.clone();
        style_vec.normalize();

        Ok((memos, ctx, style_vec))
    }

    /// Merge memos into a diary in batch/rerank mode.
    ///
    /// Per memo: one chat call producing `num_candidates` candidates, the
    /// one closest to the style vector is appended. A memo whose response
    /// yields no usable candidates contributes nothing; a chat transport
    /// failure aborts the whole run without retry.
    pub async fn merge(&self, memos: &[Memo], style: &StyleContext) -> Result<String, MergeError> {
        let (memos, ctx, style_vec) = self.prepare(memos, style)?;

        let mut accumulated = String::new();

        for (idx, memo) in memos.iter().enumerate() {
            let base = count_sentences(&memo.content).max(1);
            let (min_s, max_s) = sentence_bounds(base, self.options.growth_factor);

            let prompt = rerank_prompt(
                &ctx,
                &accumulated,
                idx + 1,
                &memo.content,
                min_s,
                max_s,
                self.options.num_candidates,
            );

            let raw = self.chat.complete(SYSTEM_MESSAGE, &prompt).await?;
            let candidates = split_candidates(&raw);

            if candidates.is_empty() {
                warn!(memo_id = memo.id, "No usable candidates, skipping memo");
                continue;
            }

            let Some(best) = choose_best_candidate(self.embedder.as_ref(), &candidates, &style_vec)?
            else {
                continue;
            };

            // The model sometimes echoes a previous paragraph verbatim
            if accumulated.contains(best) {
                debug!(memo_id = memo.id, "Duplicate paragraph, skipping memo");
                continue;
            }

            if !accumulated.is_empty() {
                accumulated.push_str(PARAGRAPH_SEPARATOR);
            }
            accumulated.push_str(best.trim());
        }

        info!(
            memos = memos.len(),
            diary_len = accumulated.len(),
            "Merge complete"
        );

        Ok(accumulated)
    }

    /// Merge memos in streaming mode: one candidate per memo, token deltas
    /// forwarded to `tx` as they arrive. No reranking; this trades quality
    /// for latency.
    ///
    /// A closed receiver cancels the run between token emissions. Returns
    /// the accumulated diary for callers that also want the final text.
    pub async fn merge_stream(
        &self,
        memos: &[Memo],
        style: &StyleContext,
        tx: mpsc::Sender<String>,
    ) -> Result<String, MergeError> {
        let (memos, ctx, _style_vec) = self.prepare(memos, style)?;

        let mut accumulated = String::new();

        for (idx, memo) in memos.iter().enumerate() {
            let base = count_sentences(&memo.content).max(1);
            let (min_s, max_s) = sentence_bounds(base, self.options.growth_factor);

            let prompt = stream_prompt(&ctx, &accumulated, idx + 1, &memo.content, min_s, max_s);

            let needs_separator = !accumulated.is_empty();
            let (memo_tx, memo_rx) = mpsc::channel(32);
            let forwarder = tokio::spawn(forward_paragraph(memo_rx, tx.clone(), needs_separator));

            let result = self
                .chat
                .complete_stream(SYSTEM_MESSAGE, &prompt, memo_tx)
                .await;
            let delivered = forwarder.await.unwrap_or(false);
            let paragraph = result?;
            if !delivered {
                return Err(MergeError::Cancelled);
            }

            if paragraph.trim().is_empty() {
                warn!(memo_id = memo.id, "Empty streamed paragraph, skipping memo");
                continue;
            }

            if needs_separator {
                accumulated.push_str(PARAGRAPH_SEPARATOR);
            }
            accumulated.push_str(&paragraph);
        }

        info!(
            memos = memos.len(),
            diary_len = accumulated.len(),
            "Streaming merge complete"
        );

        Ok(accumulated)
    }
}

/// Relays one memo's tokens to the caller, holding back the paragraph
/// separator and any leading whitespace until real content arrives. A
/// memo whose reply carries no content emits nothing downstream, so the
/// skip policy of batch mode also holds for the streamed text.
///
/// Returns false once the caller's receiver is gone.
async fn forward_paragraph(
    mut rx: mpsc::Receiver<String>,
    tx: mpsc::Sender<String>,
    needs_separator: bool,
) -> bool {
    let mut held = Vec::new();
    let mut live = false;
    while let Some(token) = rx.recv().await {
        if !live {
            if token.trim().is_empty() {
                held.push(token);
                continue;
            }
            if needs_separator && tx.send(PARAGRAPH_SEPARATOR.to_string()).await.is_err() {
                return false;
            }
            for earlier in held.drain(..) {
                if tx.send(earlier).await.is_err() {
                    return false;
                }
            }
            live = true;
        }
        if tx.send(token).await.is_err() {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use daybook_embeddings::MockEmbedder;
    use daybook_llm::MockChat;
    use serde_json::json;

    fn style() -> StyleContext {
        StyleContext {
            profile: StyleProfile(json!({"tone": "calm"})),
            examples: vec!["조용한 하루였다".to_string()],
            vector: StyleVector::from_normalized(vec![1.0, 0.0]),
        }
    }

    fn engine(chat: Arc<MockChat>, embedder: MockEmbedder) -> MergeEngine {
        MergeEngine::new(chat, Arc::new(embedder), MergeOptions::default())
    }

    #[tokio::test]
    async fn test_merge_picks_best_candidate_per_memo() {
        let chat = Arc::new(MockChat::with_replies([
            "plain breakfast paragraph\n###\nstyled breakfast paragraph",
            "styled lunch paragraph\n###\nplain lunch paragraph",
        ]));
        let embedder = MockEmbedder::new(2)
            .with_vector("plain breakfast paragraph", vec![0.0, 1.0])
            .with_vector("styled breakfast paragraph", vec![1.0, 0.0])
            .with_vector("styled lunch paragraph", vec![1.0, 0.0])
            .with_vector("plain lunch paragraph", vec![0.0, 1.0]);
        let engine = engine(chat, embedder);

        let memos = vec![Memo::new(1, "breakfast", 0), Memo::new(2, "lunch", 1)];
        let diary = engine.merge(&memos, &style()).await.unwrap();

        assert_eq!(
            diary,
            "styled breakfast paragraph\n\nstyled lunch paragraph"
        );
    }

    #[tokio::test]
    async fn test_merge_sorts_memos_by_order() {
        let chat = Arc::new(MockChat::with_replies(["first paragraph", "second paragraph"]));
        let engine = engine(chat.clone(), MockEmbedder::new(2));

        let memos = vec![Memo::new(2, "저녁을 먹었다.", 1), Memo::new(1, "아침을 먹었다.", 0)];
        engine.merge(&memos, &style()).await.unwrap();

        let prompts = chat.prompts();
        assert!(prompts[0].contains("memo #1"));
        assert!(prompts[0].contains(r#""""아침을 먹었다.""""#));
        assert!(prompts[1].contains(r#""""저녁을 먹었다.""""#));
    }

    #[tokio::test]
    async fn test_merge_skips_memo_with_no_candidates() {
        let chat = Arc::new(MockChat::with_replies([
            "breakfast paragraph",
            "###\n   \n###",
            "dinner paragraph",
        ]));
        let engine = engine(chat, MockEmbedder::new(2));

        let memos = vec![
            Memo::new(1, "breakfast", 0),
            Memo::new(2, "lunch", 1),
            Memo::new(3, "dinner", 2),
        ];
        let diary = engine.merge(&memos, &style()).await.unwrap();

        assert_eq!(diary, "breakfast paragraph\n\ndinner paragraph");
    }

    #[tokio::test]
    async fn test_merge_deduplicates_echoed_paragraph() {
        let chat = Arc::new(MockChat::with_replies([
            "the same paragraph",
            "the same paragraph",
        ]));
        let engine = engine(chat, MockEmbedder::new(2));

        let memos = vec![Memo::new(1, "a", 0), Memo::new(2, "b", 1)];
        let diary = engine.merge(&memos, &style()).await.unwrap();

        assert_eq!(diary, "the same paragraph");
    }

    #[tokio::test]
    async fn test_merge_aborts_on_chat_failure() {
        let chat = Arc::new(MockChat::new());
        chat.push_reply("first paragraph");
        chat.push_error("auth failure");
        let engine = engine(chat, MockEmbedder::new(2));

        let memos = vec![Memo::new(1, "a", 0), Memo::new(2, "b", 1)];
        assert!(matches!(
            engine.merge(&memos, &style()).await,
            Err(MergeError::Chat(_))
        ));
    }

    #[tokio::test]
    async fn test_merge_requires_memos() {
        let engine = engine(Arc::new(MockChat::new()), MockEmbedder::new(2));
        assert!(matches!(
            engine.merge(&[], &style()).await,
            Err(MergeError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_merge_prompt_carries_length_bounds() {
        let chat = Arc::new(MockChat::with_replies(["a paragraph"]));
        let engine = engine(chat.clone(), MockEmbedder::new(2));

        // Two sentences: ceil(2*1.3)=3, ceil(2*1.5)=3
        let memos = vec![Memo::new(1, "밥을 먹었다. 산책을 했다.", 0)];
        engine.merge(&memos, &style()).await.unwrap();

        assert!(chat.prompts()[0].contains("between 3 and 3 sentences"));
    }

    #[tokio::test]
    async fn test_stream_forwards_tokens_and_separators() {
        let chat = Arc::new(MockChat::with_replies([
            "first streamed paragraph",
            "second streamed paragraph",
        ]));
        let engine = engine(chat, MockEmbedder::new(2));

        let memos = vec![Memo::new(1, "a", 0), Memo::new(2, "b", 1)];
        let (tx, mut rx) = mpsc::channel(64);

        let diary = engine.merge_stream(&memos, &style(), tx).await.unwrap();
        assert_eq!(
            diary,
            "first streamed paragraph\n\nsecond streamed paragraph"
        );

        let mut streamed = String::new();
        while let Some(t) = rx.recv().await {
            streamed.push_str(&t);
        }
        assert_eq!(streamed, diary);
    }

    #[tokio::test]
    async fn test_stream_empty_paragraph_leaves_no_separator() {
        let chat = Arc::new(MockChat::with_replies([
            "first streamed paragraph",
            "",
            "third streamed paragraph",
        ]));
        let engine = engine(chat, MockEmbedder::new(2));

        let memos = vec![
            Memo::new(1, "a", 0),
            Memo::new(2, "b", 1),
            Memo::new(3, "c", 2),
        ];
        let (tx, mut rx) = mpsc::channel(64);

        let diary = engine.merge_stream(&memos, &style(), tx).await.unwrap();
        assert_eq!(diary, "first streamed paragraph\n\nthird streamed paragraph");

        let mut streamed = String::new();
        while let Some(t) = rx.recv().await {
            streamed.push_str(&t);
        }
        assert_eq!(streamed, diary);
    }

    #[tokio::test]
    async fn test_stream_cancelled_when_receiver_drops() {
        let chat = Arc::new(MockChat::with_replies(["a paragraph"]));
        let engine = engine(chat, MockEmbedder::new(2));

        let memos = vec![Memo::new(1, "a", 0)];
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        assert!(matches!(
            engine.merge_stream(&memos, &style(), tx).await,
            Err(MergeError::Cancelled)
        ));
    }
}
