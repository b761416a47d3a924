//! Per-batch statistics.

use serde::{Deserialize, Serialize};

/// Counts reported for one batch.
///
/// `received == inserted + dropped` always holds, and `dropped` is split
/// into exact and near duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchStats {
    /// Messages in the submitted batch
    pub received: usize,
    /// Messages written to the store
    pub inserted: usize,
    /// Messages not written (exact + near duplicates)
    pub dropped: usize,
    /// Dropped by the exact-match stage
    pub exact_duplicates: usize,
    /// Dropped by the similarity gate
    pub near_duplicates: usize,
    /// `inserted / received`, or 0 for an empty batch
    pub insertion_rate: f64,
}

impl BatchStats {
    /// Derive the stats from the stage counters.
    pub fn new(received: usize, exact_duplicates: usize, near_duplicates: usize) -> Self {
        let dropped = exact_duplicates + near_duplicates;
        let inserted = received.saturating_sub(dropped);
        let insertion_rate = if received == 0 {
            0.0
        } else {
            inserted as f64 / received as f64
        };
        Self {
            received,
            inserted,
            dropped,
            exact_duplicates,
            near_duplicates,
            insertion_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_add_up() {
        let stats = BatchStats::new(10, 3, 2);
        assert_eq!(stats.inserted, 5);
        assert_eq!(stats.dropped, 5);
        assert_eq!(stats.received, stats.inserted + stats.dropped);
        assert!((stats.insertion_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_batch_rate_is_zero() {
        let stats = BatchStats::new(0, 0, 0);
        assert_eq!(stats.inserted, 0);
        assert_eq!(stats.dropped, 0);
        assert_eq!(stats.insertion_rate, 0.0);
    }

    #[test]
    fn test_all_dropped() {
        let stats = BatchStats::new(4, 1, 3);
        assert_eq!(stats.inserted, 0);
        assert_eq!(stats.insertion_rate, 0.0);
    }
}
