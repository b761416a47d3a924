//! Deterministic embedder for offline runs and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingProvider};

/// Embedder that derives each vector from a hash of the content.
///
/// Equal contents always get equal vectors; different contents get
/// unrelated pseudo-random vectors, which are close to orthogonal at
/// realistic dimensions. Individual contents can be pinned to a vector
/// with [`MockEmbedder::with_vector`].
pub struct MockEmbedder {
    dimension: usize,
    overrides: HashMap<String, Vec<f32>>,
    calls: AtomicUsize,
    call_sizes: Mutex<Vec<usize>>,
}

impl MockEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            overrides: HashMap::new(),
            calls: AtomicUsize::new(0),
            call_sizes: Mutex::new(Vec::new()),
        }
    }

    /// Pin `content` to `vector`.
    pub fn with_vector(mut self, content: impl Into<String>, vector: Vec<f32>) -> Self {
        self.overrides.insert(content.into(), vector);
        self
    }

    /// Number of `embed` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Input count of every `embed` call, in call order.
    pub fn call_sizes(&self) -> Vec<usize> {
        self.call_sizes
            .lock()
            .map(|sizes| sizes.clone())
            .unwrap_or_default()
    }

    fn vector_for(&self, content: &str) -> Vec<f32> {
        if let Some(vector) = self.overrides.get(content) {
            return vector.clone();
        }
        // FNV-1a seed, xorshift stream
        let mut state = content
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325u64, |hash, byte| {
                (hash ^ byte as u64).wrapping_mul(0x0100_0000_01b3)
            })
            | 1;
        (0..self.dimension)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state >> 40) as f32 / (1u64 << 23) as f32 - 1.0
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    fn model(&self) -> &str {
        "mock"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut sizes) = self.call_sizes.lock() {
            sizes.push(texts.len());
        }
        Ok(texts
            .iter()
            .map(|text| Embedding::new(self.vector_for(text)))
            .collect())
    }
}
