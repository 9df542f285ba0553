//! Pre-flight checks before expensive operations.
//!
//! Startup embeds the whole knowledge base, so a missing credential should be
//! reported before any backend is contacted.

use crate::config::{EmbeddingProvider, GenerationProvider, Settings};
use crate::error::{Result, ShopliteError};

/// Operations that need working backends.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Serving needs both embedding and generation.
    Serve,
    /// Asking needs both embedding and generation.
    Ask,
    /// Search only embeds.
    Search,
    /// Raw generation only generates.
    Generate,
}

impl Operation {
    fn needs_embedding(self) -> bool {
        !matches!(self, Operation::Generate)
    }

    fn needs_generation(self) -> bool {
        !matches!(self, Operation::Search)
    }
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    if needs_openai_key(operation, settings) {
        check_api_key()?;
    }
    Ok(())
}

/// Whether the operation reaches the hosted OpenAI API.
///
/// A custom `base_url` points the OpenAI client at a compatible server,
/// which may not need a key.
pub fn needs_openai_key(operation: Operation, settings: &Settings) -> bool {
    let embedding = operation.needs_embedding()
        && settings.embedding.provider == EmbeddingProvider::OpenAI
        && settings.embedding.base_url.is_none();
    let generation = operation.needs_generation()
        && settings.generation.provider == GenerationProvider::OpenAI
        && settings.generation.base_url.is_none();
    embedding || generation
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(ShopliteError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(ShopliteError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_backends_need_no_key() {
        let mut settings = Settings::default();
        settings.embedding.provider = EmbeddingProvider::Ollama;
        settings.generation.provider = GenerationProvider::Ollama;

        for op in [Operation::Serve, Operation::Ask, Operation::Search, Operation::Generate] {
            assert!(!needs_openai_key(op, &settings));
            assert!(check(op, &settings).is_ok());
        }
    }

    #[test]
    fn test_key_needed_only_for_hosted_stages() {
        let mut settings = Settings::default();
        settings.embedding.provider = EmbeddingProvider::OpenAI;
        settings.generation.provider = GenerationProvider::Ollama;

        assert!(needs_openai_key(Operation::Search, &settings));
        assert!(!needs_openai_key(Operation::Generate, &settings));

        settings.embedding.base_url = Some("http://localhost:8080/v1".to_string());
        assert!(!needs_openai_key(Operation::Serve, &settings));
    }
}
