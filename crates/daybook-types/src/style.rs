//! Style signature types: the aggregate style vector and the qualitative
//! style profile.

use serde::{Deserialize, Serialize};

/// Unit-normalized embedding summarizing a user's aggregate writing style.
///
/// Invariant: L2 norm == 1 within floating tolerance, except the zero
/// vector, which normalization leaves unchanged to avoid division by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleVector(pub Vec<f32>);

impl StyleVector {
    /// Create a style vector, normalizing to unit length.
    pub fn new(values: Vec<f32>) -> Self {
        let mut v = Self(values);
        v.normalize();
        v
    }

    /// Wrap values that are already unit-normalized.
    pub fn from_normalized(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// Vector dimensionality.
    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// L2 norm of the vector.
    pub fn l2_norm(&self) -> f32 {
        self.0.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Normalize in place to unit length. The zero vector is left unchanged.
    pub fn normalize(&mut self) {
        let norm = self.l2_norm();
        if norm > 0.0 {
            for x in &mut self.0 {
                *x /= norm;
            }
        }
    }

    /// Dot product against another vector of the same dimension.
    ///
    /// Returns 0.0 on dimension mismatch, matching the cosine-similarity
    /// convention used by the embedding layer.
    pub fn dot(&self, other: &[f32]) -> f32 {
        if self.0.len() != other.len() {
            return 0.0;
        }
        self.0.iter().zip(other.iter()).map(|(a, b)| a * b).sum()
    }
}

/// Structured qualitative description of a user's tone and phrasing habits.
///
/// Produced by a language-model call. The attribute set is open-ended
/// (tone, formality, sentence endings, common phrases, ...), so the profile
/// is held as JSON rather than a fixed struct. When the model reply is not
/// valid JSON the profile degrades to a raw-text wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleProfile(pub serde_json::Value);

impl StyleProfile {
    /// Parse a model reply; fall back to a `style_summary` wrapper when the
    /// reply is not valid JSON.
    pub fn from_model_reply(raw: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(value) if value.is_object() => Self(value),
            _ => Self::from_raw(raw),
        }
    }

    /// Wrap raw text as `{"style_summary": <text>}`.
    pub fn from_raw(raw: &str) -> Self {
        Self(serde_json::json!({ "style_summary": raw }))
    }

    /// Serialize for inclusion in a generation prompt.
    pub fn to_prompt_text(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_vector_normalization() {
        let v = StyleVector::new(vec![3.0, 4.0]);
        // 3-4-5 triangle: normalized should be [0.6, 0.8]
        assert!((v.0[0] - 0.6).abs() < 1e-3);
        assert!((v.0[1] - 0.8).abs() < 1e-3);
        assert!((v.l2_norm() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_vector_unchanged() {
        let v = StyleVector::new(vec![0.0, 0.0, 0.0]);
        assert_eq!(v.0, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_dot_dimension_mismatch() {
        let v = StyleVector::new(vec![1.0, 0.0]);
        assert_eq!(v.dot(&[1.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_profile_from_json_reply() {
        let profile = StyleProfile::from_model_reply(r#"{"tone": "calm"}"#);
        assert_eq!(profile.0["tone"], "calm");
    }

    #[test]
    fn test_profile_fallback_on_invalid_json() {
        let profile = StyleProfile::from_model_reply("not json at all");
        assert_eq!(profile.0["style_summary"], "not json at all");
    }

    #[test]
    fn test_profile_fallback_on_non_object() {
        let profile = StyleProfile::from_model_reply("42");
        assert_eq!(profile.0["style_summary"], "42");
    }
}
