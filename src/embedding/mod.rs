//! Embedding generation for semantic retrieval.

mod ollama;
mod openai;

pub use ollama::OllamaEmbedder;
pub use openai::OpenAIEmbedder;

use crate::config::{EmbeddingProvider, EmbeddingSettings};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Trait for embedding generation.
///
/// Queries and documents must be embedded by the same implementation so
/// their vectors share a space.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}

/// Build the embedder selected in the settings.
pub fn create_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn Embedder>> {
    let timeout = Duration::from_secs(settings.timeout_secs);
    let embedder: Arc<dyn Embedder> = match settings.provider {
        EmbeddingProvider::OpenAI => Arc::new(OpenAIEmbedder::with_config(
            &settings.model,
            settings.dimensions as usize,
            settings.base_url.as_deref(),
            timeout,
        )?),
        EmbeddingProvider::Ollama => Arc::new(OllamaEmbedder::with_config(
            &settings.model,
            settings.dimensions as usize,
            settings.base_url.as_deref(),
            timeout,
        )?),
    };
    Ok(embedder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_builds_each_provider() {
        let mut settings = EmbeddingSettings {
            dimensions: 384,
            timeout_secs: 10,
            ..Default::default()
        };
        assert_eq!(create_embedder(&settings).unwrap().dimensions(), 384);

        settings.provider = EmbeddingProvider::Ollama;
        settings.base_url = Some("http://proxy.local/ollama".to_string());
        assert_eq!(create_embedder(&settings).unwrap().dimensions(), 384);

        settings.base_url = Some("not a url".to_string());
        assert!(create_embedder(&settings).is_err());
    }
}
