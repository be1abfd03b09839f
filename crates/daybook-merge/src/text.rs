//! Sentence counting and paragraph-length bounds.

/// Lower elaboration bound relative to the memo's sentence count.
const MIN_GROWTH: f32 = 1.3;

/// Count the sentences in a memo.
///
/// Splits on terminal punctuation (`.`, `!`, `?`) or newlines, discarding
/// empty fragments. Non-empty text counts as at least one sentence even
/// without terminal punctuation.
pub fn count_sentences(text: &str) -> usize {
    text.split(['.', '!', '?', '\n'])
        .filter(|s| !s.trim().is_empty())
        .count()
}

/// Compute the target paragraph length range for a memo.
///
/// `base` is the memo's sentence count (minimum 1). The bounds limit how
/// far the model may elaborate: without an upper bound it pads
/// indefinitely, without a lower bound it parrots the memo verbatim.
pub fn sentence_bounds(base: usize, growth_factor: f32) -> (usize, usize) {
    let base = base.max(1);
    let min_sentences = ((base as f32) * MIN_GROWTH).ceil() as usize;
    let min_sentences = min_sentences.max(1);
    let max_sentences = ((base as f32) * growth_factor).ceil() as usize;
    (min_sentences, max_sentences.max(min_sentences))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_terminal_punctuation() {
        assert_eq!(count_sentences("아침을 먹었다. 그리고 걸었다."), 2);
        assert_eq!(count_sentences("정말? 그래! 좋다."), 3);
    }

    #[test]
    fn test_count_newlines() {
        assert_eq!(count_sentences("첫 줄\n둘째 줄\n셋째 줄"), 3);
    }

    #[test]
    fn test_count_no_terminal_punctuation() {
        assert_eq!(count_sentences("마침표 없는 메모"), 1);
    }

    #[test]
    fn test_count_empty() {
        assert_eq!(count_sentences(""), 0);
        assert_eq!(count_sentences("  \n  "), 0);
    }

    #[test]
    fn test_bounds_single_sentence() {
        // ceil(1 * 1.3) = 2, ceil(1 * 1.5) = 2
        assert_eq!(sentence_bounds(1, 1.5), (2, 2));
    }

    #[test]
    fn test_bounds_three_sentences() {
        // ceil(3 * 1.3) = 4, ceil(3 * 1.5) = 5
        assert_eq!(sentence_bounds(3, 1.5), (4, 5));
    }

    #[test]
    fn test_bounds_max_never_below_min() {
        let (min_s, max_s) = sentence_bounds(4, 1.0);
        assert!(max_s >= min_s);
    }

    #[test]
    fn test_bounds_zero_clamped_to_one() {
        assert_eq!(sentence_bounds(0, 1.5), sentence_bounds(1, 1.5));
    }
}
