//! Prompt assembly for the per-memo generation calls.

use daybook_types::Memo;

use crate::rerank::CANDIDATE_SEPARATOR;

/// System message shared by both modes.
///
/// The priority order is strict: factual faithfulness to the memos first,
/// chronology second, style last.
pub(crate) const SYSTEM_MESSAGE: &str = "\
You are a diary-writing assistant.

Your priorities are, in this exact order:
1) FAITHFULLY reflect the concrete events from the memos.
2) Keep the chronological order of the memos.
3) Then, softly adjust tone and style to match the user's profile.

You MUST NOT invent events that are not clearly implied by the memos.
Every paragraph you write must be grounded in the given focus memo.
You are currently writing the diary ONE MEMO AT A TIME, memo by memo.";

/// Inputs shared by every generation call of one merge run.
pub(crate) struct PromptContext {
    pub profile_text: String,
    pub examples_text: String,
    pub indexed_memos: String,
}

impl PromptContext {
    pub(crate) fn new(profile_text: String, examples: &[String], memos: &[Memo]) -> Self {
        let examples_text = if examples.is_empty() {
            "- (none)".to_string()
        } else {
            examples
                .iter()
                .map(|s| format!("- {}", s))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let indexed_memos = memos
            .iter()
            .enumerate()
            .map(|(i, m)| format!("{}. {}", i + 1, m.content))
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            profile_text,
            examples_text,
            indexed_memos,
        }
    }
}

/// Shared body: style signature, global memo context, diary so far, the
/// focus memo, and the length rule.
fn prompt_body(
    ctx: &PromptContext,
    accumulated: &str,
    focus_idx: usize,
    focus_memo: &str,
    min_sentences: usize,
    max_sentences: usize,
) -> String {
    let current_diary_block = if accumulated.trim().is_empty() {
        "(nothing yet)"
    } else {
        accumulated
    };

    format!(
        r#"You are a diary writing assistant.

You will be given:
- ONE memo: a fragmented note the user wrote today
- style profile: JSON describing the user's writing tone, phrasing preference, pacing, common expressions
- style examples: several representative sentences the user has written before
- the diary text that has already been written for previous memos

Your PRIMARY job for THIS STEP:
- Take the given memo and rewrite/expand it into a short diary-style paragraph.
- Preserve the concrete events and facts from the memo (time, place, actions, feelings).
- Do NOT invent new events that are not clearly implied by the memo.

Your SECONDARY job:
- Softly adjust the tone, rhythm, and sentence endings to match the style profile and examples.
- Style should never override the factual content of the memo.

---

STYLE PROFILE (JSON):
{profile}

STYLE EXAMPLES (for tone only, NOT for events):
{examples}

---

ALL MEMOS (IN ORDER, WITH INDEX):
{memos}

CURRENT DIARY SO FAR (previous memos already processed):
{diary}

FOCUS MEMO FOR THIS STEP (memo #{focus_idx}):
"""{focus_memo}"""

---

LENGTH RULE FOR THIS MEMO:
- The rewritten paragraph for this memo should be between {min_sentences} and {max_sentences} sentences.
- It should feel concise and natural, not repetitive.
- It should primarily focus on the events and feelings from the FOCUS MEMO.
"#,
        profile = ctx.profile_text,
        examples = ctx.examples_text,
        memos = ctx.indexed_memos,
        diary = current_diary_block,
        focus_idx = focus_idx,
        focus_memo = focus_memo,
        min_sentences = min_sentences,
        max_sentences = max_sentences,
    )
}

/// Prompt for batch/rerank mode: requests `num_candidates` separator-delimited
/// candidate paragraphs in one call.
pub(crate) fn rerank_prompt(
    ctx: &PromptContext,
    accumulated: &str,
    focus_idx: usize,
    focus_memo: &str,
    min_sentences: usize,
    max_sentences: usize,
    num_candidates: usize,
) -> String {
    let body = prompt_body(
        ctx,
        accumulated,
        focus_idx,
        focus_memo,
        min_sentences,
        max_sentences,
    );

    format!(
        r#"{body}
Now generate {num_candidates} DIFFERENT candidate diary-style paragraphs
that rewrite ONLY this focus memo in a natural diary style.

Output format (IMPORTANT):
- Each candidate paragraph must be separated by a line containing only: {sep}
- Inside each candidate, just write the sentences, no numbering, no extra commentary.
"#,
        body = body,
        num_candidates = num_candidates,
        sep = CANDIDATE_SEPARATOR,
    )
}

/// Prompt for streaming mode: requests exactly one paragraph.
pub(crate) fn stream_prompt(
    ctx: &PromptContext,
    accumulated: &str,
    focus_idx: usize,
    focus_memo: &str,
    min_sentences: usize,
    max_sentences: usize,
) -> String {
    let body = prompt_body(
        ctx,
        accumulated,
        focus_idx,
        focus_memo,
        min_sentences,
        max_sentences,
    );

    let start_hint = if accumulated.trim().is_empty() {
        "This will be the first paragraph of the diary."
    } else {
        "This paragraph continues naturally from the current diary."
    };

    format!(
        r#"{body}
{start_hint}
Now write ONE diary-style paragraph for ONLY this focus memo.
Output only the sentences of the paragraph, with no explanations and no numbering.
"#,
        body = body,
        start_hint = start_hint,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> PromptContext {
        PromptContext::new(
            r#"{"tone": "calm"}"#.to_string(),
            &["조용한 하루였다".to_string()],
            &[
                Memo::new(1, "아침으로 빵을 먹었다.", 0),
                Memo::new(2, "점심은 친구와 먹었다.", 1),
            ],
        )
    }

    #[test]
    fn test_rerank_prompt_contains_all_sections() {
        let prompt = rerank_prompt(&ctx(), "", 1, "아침으로 빵을 먹었다.", 2, 3, 3);
        assert!(prompt.contains(r#""tone": "calm""#));
        assert!(prompt.contains("- 조용한 하루였다"));
        assert!(prompt.contains("1. 아침으로 빵을 먹었다."));
        assert!(prompt.contains("2. 점심은 친구와 먹었다."));
        assert!(prompt.contains("(nothing yet)"));
        assert!(prompt.contains("memo #1"));
        assert!(prompt.contains("between 2 and 3 sentences"));
        assert!(prompt.contains("generate 3 DIFFERENT"));
        assert!(prompt.contains(CANDIDATE_SEPARATOR));
    }

    #[test]
    fn test_accumulated_diary_included() {
        let prompt = rerank_prompt(&ctx(), "빵을 먹으며 하루를 열었다.", 2, "점심", 2, 3, 3);
        assert!(prompt.contains("빵을 먹으며 하루를 열었다."));
        assert!(!prompt.contains("(nothing yet)"));
    }

    #[test]
    fn test_stream_prompt_start_hints() {
        let first = stream_prompt(&ctx(), "", 1, "아침", 2, 3);
        assert!(first.contains("first paragraph"));

        let later = stream_prompt(&ctx(), "이미 쓴 단락.", 2, "점심", 2, 3);
        assert!(later.contains("continues naturally"));
    }
}
