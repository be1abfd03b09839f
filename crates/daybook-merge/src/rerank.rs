//! Candidate splitting and style-vector reranking.

use tracing::debug;

use daybook_embeddings::EmbeddingModel;
use daybook_types::StyleVector;

use crate::error::MergeError;

/// Separator token sequence delimiting candidate paragraphs in the raw
/// model response: a line containing only this string.
pub const CANDIDATE_SEPARATOR: &str = "###";

/// Split a raw model response into candidate paragraphs.
///
/// Splits on the separator, trims, and drops empty results. An empty
/// return value means this memo produced nothing usable.
pub fn split_candidates(raw: &str) -> Vec<String> {
    raw.split(CANDIDATE_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pick the candidate whose embedding is most similar to the style vector.
///
/// Candidates are embedded (unit-normalized), so dot product against the
/// unit-normalized style vector is cosine similarity. Returns `None` for an
/// empty candidate list. Ties: first occurrence wins.
pub fn choose_best_candidate<'a>(
    embedder: &dyn EmbeddingModel,
    candidates: &'a [String],
    style_vec: &StyleVector,
) -> Result<Option<&'a str>, MergeError> {
    if candidates.is_empty() {
        return Ok(None);
    }

    let embeddings = embedder.embed_texts(candidates)?;

    let mut best_idx = 0;
    let mut best_sim = f32::NEG_INFINITY;
    for (idx, emb) in embeddings.iter().enumerate() {
        let sim = style_vec.dot(&emb.values);
        if sim > best_sim {
            best_sim = sim;
            best_idx = idx;
        }
    }

    debug!(
        candidates = candidates.len(),
        best_idx, best_sim, "Reranked candidates"
    );

    Ok(Some(&candidates[best_idx]))
}
