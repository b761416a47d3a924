//! Similarity gate.
//!
//! One nearest-neighbour lookup per message against the filtered store,
//! then a strict threshold comparison.

use std::sync::Arc;

use tracing::debug;

use dedup_embeddings::Embedding;
use dedup_store::{FilterPredicate, Neighbor, StoreError, VectorStore};

/// Outcome of gating one message.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// Novel enough; `similarity` is the nearest match, or 0 with no match
    Accept { similarity: f32 },
    /// Near duplicate of `neighbor`
    Reject { similarity: f32, neighbor: Neighbor },
}

impl GateDecision {
    pub fn is_accept(&self) -> bool {
        matches!(self, GateDecision::Accept { .. })
    }

    pub fn similarity(&self) -> f32 {
        match self {
            GateDecision::Accept { similarity } | GateDecision::Reject { similarity, .. } => {
                *similarity
            }
        }
    }
}

/// Nearest-neighbour threshold gate.
#[derive(Clone)]
pub struct SimilarityGate {
    store: Arc<dyn VectorStore>,
}

impl SimilarityGate {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    /// Decide one message.
    ///
    /// Accepts iff the nearest filtered row is strictly less similar than
    /// `threshold`. A similarity equal to the threshold is a duplicate. An
    /// empty filtered set counts as similarity 0.
    pub async fn evaluate(
        &self,
        table: &str,
        predicate: &FilterPredicate,
        embedding: &Embedding,
        threshold: f32,
    ) -> Result<GateDecision, StoreError> {
        let nearest = self
            .store
            .nearest(table, predicate, &embedding.values)
            .await?;

        let decision = match nearest {
            None => GateDecision::Accept { similarity: 0.0 },
            Some(neighbor) if neighbor.similarity < threshold => GateDecision::Accept {
                similarity: neighbor.similarity,
            },
            Some(neighbor) => GateDecision::Reject {
                similarity: neighbor.similarity,
                neighbor,
            },
        };
        debug!(
            similarity = decision.similarity(),
            threshold,
            accepted = decision.is_accept(),
            "Gate decision"
        );
        Ok(decision)
    }
}
