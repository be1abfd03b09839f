//! Style vector computation and representative-example selection.

use tracing::debug;

use daybook_embeddings::{mean_embedding, Embedding, EmbeddingModel};
use daybook_types::StyleVector;

use crate::error::StyleError;

/// Fragments shorter than this (in characters) are too short to carry style.
const MIN_EXAMPLE_CHARS: usize = 8;

/// Embed one diary as the renormalized mean of its per-line embeddings.
///
/// Lines are trimmed and empty ones dropped; a diary with no surviving
/// lines is an error.
pub fn diary_embedding(
    embedder: &dyn EmbeddingModel,
    diary_text: &str,
) -> Result<Embedding, StyleError> {
    let sentences: Vec<&str> = diary_text
        .lines()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if sentences.is_empty() {
        return Err(StyleError::EmptyDiary);
    }

    let embeddings = embedder.embed_batch(&sentences)?;
    Ok(mean_embedding(&embeddings)?)
}

/// Compute a user's aggregate style vector from their diary corpus.
///
/// Averages per-diary embeddings and renormalizes. Requires at least one
/// diary; the result does not depend on the order of the diary list.
pub fn compute_style_vector(
    embedder: &dyn EmbeddingModel,
    diaries: &[String],
) -> Result<StyleVector, StyleError> {
    if diaries.is_empty() {
        return Err(StyleError::InvalidInput(
            "at least 1 diary is required".to_string(),
        ));
    }

    let diary_vecs = diaries
        .iter()
        .map(|d| diary_embedding(embedder, d))
        .collect::<Result<Vec<_>, _>>()?;

    let user_vec = mean_embedding(&diary_vecs)?;

    debug!(
        diaries = diaries.len(),
        dim = user_vec.dimension(),
        "Computed style vector"
    );

    Ok(StyleVector::from_normalized(user_vec.values))
}

/// Split diary text into candidate example sentences.
///
/// Paragraphs are newline-delimited; sentences split on terminal
/// punctuation. Fragments shorter than [`MIN_EXAMPLE_CHARS`] characters are
/// discarded.
fn candidate_sentences(diaries: &[String]) -> Vec<String> {
    let text = diaries.join("\n");

    let mut candidates = Vec::new();
    for paragraph in text.lines() {
        let paragraph = paragraph.trim();
        if paragraph.chars().count() < 2 {
            continue;
        }
        for sentence in paragraph.split(['.', '!', '?']) {
            let sentence = sentence.trim();
            if sentence.chars().count() >= MIN_EXAMPLE_CHARS {
                candidates.push(sentence.to_string());
            }
        }
    }
    candidates
}

/// Select the `n` sentences most similar to the style vector.
///
/// If the candidate pool has at most `n` entries it is returned unranked.
/// Otherwise candidates are embedded and ranked by dot product against the
/// (renormalized) style vector, descending; ties keep original order.
pub fn extract_style_examples(
    embedder: &dyn EmbeddingModel,
    diaries: &[String],
    style_vector: &StyleVector,
    n: usize,
) -> Result<Vec<String>, StyleError> {
    let candidates = candidate_sentences(diaries);

    if candidates.len() <= n {
        return Ok(candidates);
    }

    let mut style_vec = style_vector.clone();
    style_vec.normalize();

    let embeddings = embedder.embed_texts(&candidates)?;
    let sims: Vec<f32> = embeddings.iter().map(|e| style_vec.dot(&e.values)).collect();

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    // Stable sort keeps original candidate order for equal similarities
    order.sort_by(|&a, &b| sims[b].partial_cmp(&sims[a]).unwrap_or(std::cmp::Ordering::Equal));

    debug!(
        pool = candidates.len(),
        selected = n,
        "Ranked style example candidates"
    );

    Ok(order
        .into_iter()
        .take(n)
        .map(|i| candidates[i].clone())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use daybook_embeddings::MockEmbedder;

    fn diaries() -> Vec<String> {
        vec![
            "오늘은 친구를 만났다.\n같이 점심을 먹고 오래 걸었다.".to_string(),
            "하루 종일 비가 왔다.\n창밖을 보며 커피를 마셨다.".to_string(),
            "가족과 저녁을 먹었다.\n오랜만에 웃음이 많은 하루였다.".to_string(),
        ]
    }

    #[test]
    fn test_diary_embedding_unit_norm() {
        let embedder = MockEmbedder::new(8);
        let emb = diary_embedding(&embedder, "첫 번째 문장이다.\n두 번째 문장이다.").unwrap();
        let norm: f32 = emb.values.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_diary_embedding_empty_is_error() {
        let embedder = MockEmbedder::new(8);
        assert!(matches!(
            diary_embedding(&embedder, "   \n  \n"),
            Err(StyleError::EmptyDiary)
        ));
    }

    #[test]
    fn test_style_vector_requires_diaries() {
        let embedder = MockEmbedder::new(8);
        assert!(matches!(
            compute_style_vector(&embedder, &[]),
            Err(StyleError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_style_vector_permutation_invariant() {
        let embedder = MockEmbedder::new(8);
        let forward = diaries();
        let mut reversed = diaries();
        reversed.reverse();

        let v1 = compute_style_vector(&embedder, &forward).unwrap();
        let v2 = compute_style_vector(&embedder, &reversed).unwrap();

        for (a, b) in v1.0.iter().zip(v2.0.iter()) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn test_examples_full_pool_when_small() {
        let embedder = MockEmbedder::new(8);
        let diaries = vec!["짧은 글.\n여기 문장이 하나 있다.".to_string()];
        let vector = compute_style_vector(&embedder, &diaries).unwrap();

        let examples = extract_style_examples(&embedder, &diaries, &vector, 10).unwrap();
        assert_eq!(examples, vec!["여기 문장이 하나 있다".to_string()]);
    }

    #[test]
    fn test_examples_capped_at_n() {
        let embedder = MockEmbedder::new(8);
        let corpus = diaries();
        let vector = compute_style_vector(&embedder, &corpus).unwrap();

        let examples = extract_style_examples(&embedder, &corpus, &vector, 2).unwrap();
        assert_eq!(examples.len(), 2);
    }

    #[test]
    fn test_examples_ranked_by_similarity() {
        // Style vector points along the first axis; "aligned sentence" is
        // the only candidate embedded along the same axis.
        let embedder = MockEmbedder::new(2)
            .with_vector("aligned sentence here", vec![1.0, 0.0])
            .with_vector("orthogonal sentence one", vec![0.0, 1.0])
            .with_vector("opposite sentence here", vec![-1.0, 0.0]);

        let diaries =
            vec!["aligned sentence here. orthogonal sentence one. opposite sentence here.".to_string()];
        let vector = StyleVector::from_normalized(vec![1.0, 0.0]);

        let examples = extract_style_examples(&embedder, &diaries, &vector, 2).unwrap();
        assert_eq!(examples[0], "aligned sentence here");
        assert_eq!(examples[1], "orthogonal sentence one");
    }

    #[test]
    fn test_short_fragments_discarded() {
        let candidates = candidate_sentences(&["네. 아주 긴 문장이 여기에 있다.".to_string()]);
        assert_eq!(candidates, vec!["아주 긴 문장이 여기에 있다".to_string()]);
    }
}
