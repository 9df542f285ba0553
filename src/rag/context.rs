//! Retrieval gate: nearest-neighbour search filtered by a distance threshold.

use super::RetrievalHit;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::index::SimilarityIndex;
use crate::knowledge::KnowledgeBase;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Finds documents close enough to a query to answer from.
pub struct RetrievalGate {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn SimilarityIndex>,
    knowledge: Arc<KnowledgeBase>,
    top_k: usize,
    threshold: f32,
}

impl RetrievalGate {
    /// Create a gate over an index whose positions follow `knowledge`.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn SimilarityIndex>,
        knowledge: Arc<KnowledgeBase>,
    ) -> Self {
        Self {
            embedder,
            index,
            knowledge,
            top_k: 2,
            threshold: 1.5,
        }
    }

    /// Set the number of neighbours considered by [`RetrievalGate::build`].
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the distance threshold used by [`RetrievalGate::build`].
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Retrieve with the configured `top_k` and threshold.
    pub async fn build(&self, query: &str) -> Result<Vec<RetrievalHit>> {
        self.retrieve(query, self.top_k, self.threshold).await
    }

    /// Return the `top_k` nearest documents whose distance is `<= threshold`,
    /// nearest first.
    ///
    /// An empty result means nothing relevant was found; it is not an error.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn retrieve(&self, query: &str, top_k: usize, threshold: f32) -> Result<Vec<RetrievalHit>> {
        let query_embedding = self.embedder.embed(query).await?;
        let neighbors = self.index.search(&query_embedding, top_k)?;

        let hits: Vec<RetrievalHit> = neighbors
            .into_iter()
            .filter(|n| n.distance <= threshold)
            .filter_map(|n| match self.knowledge.get(n.position) {
                Some(document) => Some(RetrievalHit {
                    document: document.clone(),
                    distance: n.distance,
                }),
                None => {
                    warn!("Index returned position {} outside the knowledge base", n.position);
                    None
                }
            })
            .collect();

        debug!(
            hits = hits.len(),
            nearest = hits.first().map(|h| h.distance),
            "Retrieval finished"
        );

        Ok(hits)
    }
}
