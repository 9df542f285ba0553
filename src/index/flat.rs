//! Exact brute-force L2 index.
//!
//! Suitable for small, static collections such as the support knowledge base.

use super::{squared_l2, Neighbor, SimilarityIndex};
use crate::error::{Result, ShopliteError};

/// Flat index over squared L2 distance, built once and never mutated.
pub struct FlatL2Index {
    vectors: Vec<Vec<f32>>,
    dimensions: usize,
}

impl FlatL2Index {
    /// Build an index from vectors that all share one dimension.
    pub fn build(vectors: Vec<Vec<f32>>) -> Result<Self> {
        let dimensions = vectors.first().map(Vec::len).unwrap_or(0);

        if let Some((i, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != dimensions) {
            return Err(ShopliteError::Index(format!(
                "vector {} has dimension {}, expected {}",
                i,
                v.len(),
                dimensions
            )));
        }
        if vectors.iter().flatten().any(|x| !x.is_finite()) {
            return Err(ShopliteError::Index("vectors must be finite".to_string()));
        }

        Ok(Self { vectors, dimensions })
    }
}

impl SimilarityIndex for FlatL2Index {
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if self.vectors.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimensions {
            return Err(ShopliteError::Index(format!(
                "query has dimension {}, index expects {}",
                query.len(),
                self.dimensions
            )));
        }

        let mut results: Vec<Neighbor> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, v)| Neighbor {
                distance: squared_l2(query, v),
                position,
            })
            .collect();

        // Stable sort keeps earlier documents first on ties.
        results.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);

        Ok(results)
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
