//! Nearest-neighbour search over document embeddings.
//!
//! Provides a trait-based interface so the exact flat index can be swapped
//! for an approximate one without touching the retrieval gate.

mod flat;

pub use flat::FlatL2Index;

use crate::error::Result;

/// A single search result: a position into the indexed collection and its distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Distance to the query (lower is more similar).
    pub distance: f32,
    /// Position of the matched vector, aligned with the knowledge base order.
    pub position: usize,
}

/// Trait for read-only similarity indexes.
pub trait SimilarityIndex: Send + Sync {
    /// Return up to `k` nearest vectors in ascending distance order.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>>;

    /// Number of indexed vectors.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimension every indexed vector (and query) must have.
    fn dimensions(&self) -> usize;
}

/// Squared Euclidean distance between two vectors of equal length.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
