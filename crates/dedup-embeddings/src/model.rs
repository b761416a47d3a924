//! Embedding provider trait and types.
//!
//! Defines the interface for turning message content into vectors.

use async_trait::async_trait;

use crate::error::EmbeddingError;

/// Vector embedding of one message content.
///
/// Values are kept as the provider returned them; cosine similarity does
/// not need them normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Get the embedding dimension
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Cosine similarity with another embedding. See [`cosine_similarity`].
    pub fn cosine_similarity(&self, other: &Embedding) -> f32 {
        cosine_similarity(&self.values, &other.values)
    }

}

/// Cosine similarity, i.e. `1 - cosine distance`, in [-1, 1].
///
/// Returns 0 for mismatched lengths or empty input, and NaN when either
/// side has zero norm, matching pgvector's `<=>`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return f32::NAN;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())) as f32
}

/// External embedding provider.
///
/// `embed` returns exactly one embedding per input, in input order, or an
/// error. Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model name sent with every request
    fn model(&self) -> &str;

    /// Embed a list of texts.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_identical() {
        let emb1 = Embedding::new(vec![1.0, 2.0, 3.0]);
        let emb2 = Embedding::new(vec![2.0, 4.0, 6.0]);
        assert!((emb1.cosine_similarity(&emb2) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let emb1 = Embedding::new(vec![1.0, 0.0]);
        let emb2 = Embedding::new(vec![0.0, 1.0]);
        assert!(emb1.cosine_similarity(&emb2).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let emb1 = Embedding::new(vec![1.0, 0.0]);
        let emb2 = Embedding::new(vec![-3.0, 0.0]);
        assert!((emb1.cosine_similarity(&emb2) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_degenerate() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_cosine_similarity_zero_norm_is_nan() {
        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).is_nan());
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 0.0]).is_nan());
    }
}
