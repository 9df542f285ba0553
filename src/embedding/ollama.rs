//! Ollama embeddings implementation (e.g. `all-minilm`, `nomic-embed-text`).

use super::Embedder;
use crate::error::Result;
use crate::ollama::OllamaClient;
use async_trait::async_trait;
use futures::future::try_join_all;
use std::time::Duration;
use tracing::{debug, instrument};

/// Ollama-based embedder.
pub struct OllamaEmbedder {
    client: OllamaClient,
    model: String,
    dimensions: usize,
}

impl OllamaEmbedder {
    pub fn with_config(
        model: &str,
        dimensions: usize,
        base_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: OllamaClient::new(base_url, timeout)?,
            model: model.to_string(),
            dimensions,
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(&self.model, text).await
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        // No native batch endpoint; requests run concurrently and join in order.
        let embeddings = try_join_all(texts.iter().map(|t| self.client.embed(&self.model, t))).await?;
        debug!("Generated {} embeddings", embeddings.len());
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
