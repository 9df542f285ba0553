//! Text generation backends.
//!
//! A [`Generator`] continues a prompt. Backends differ in whether they hand back
//! the prompt ahead of the continuation; that is declared through
//! [`Generator::echoes_prompt`] and undone in [`generate_text`].

mod gate;
mod ollama;
mod openai;
mod tgi;

pub use gate::DeviceGate;
pub use ollama::OllamaGenerator;
pub use openai::OpenAIGenerator;
pub use tgi::{TgiGenerator, TOKEN_ENV as TGI_TOKEN_ENV};

use crate::config::{GenerationProvider, GenerationSettings};
use crate::error::{Result, ShopliteError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// A single generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Always in `1..=ceiling` of the limit it was built with.
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GenerationRequest {
    /// Build a request, silently capping `max_tokens` at `max_tokens_limit`.
    pub fn new(
        prompt: impl Into<String>,
        max_tokens: u32,
        temperature: f32,
        max_tokens_limit: u32,
    ) -> Result<Self> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(ShopliteError::InvalidInput("prompt must not be empty".to_string()));
        }
        if max_tokens == 0 {
            return Err(ShopliteError::InvalidInput("max_tokens must be at least 1".to_string()));
        }
        if !temperature.is_finite() || temperature < 0.0 {
            return Err(ShopliteError::InvalidInput(format!(
                "temperature must be a non-negative number, got {}",
                temperature
            )));
        }

        let capped = max_tokens.min(max_tokens_limit.max(1));
        if capped < max_tokens {
            debug!("Capping max_tokens from {} to {}", max_tokens, capped);
        }

        Ok(Self {
            prompt,
            max_tokens: capped,
            temperature,
        })
    }

    /// Greedy decoding; backends should be deterministic for these requests.
    pub fn is_greedy(&self) -> bool {
        self.temperature == 0.0
    }
}

/// Trait for text generation backends.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Return the backend's raw output for the request.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Whether raw output starts with the prompt itself.
    fn echoes_prompt(&self) -> bool {
        false
    }

    /// Model identifier, for reporting.
    fn model(&self) -> &str;
}

/// Run a request and return only the continuation.
///
/// Empty output is reported as a generation failure.
pub async fn generate_text(generator: &dyn Generator, request: &GenerationRequest) -> Result<String> {
    let raw = generator.generate(request).await?;

    let text = if generator.echoes_prompt() {
        strip_echo(&request.prompt, &raw)
    } else {
        raw.trim().to_string()
    };

    if text.is_empty() {
        return Err(ShopliteError::Generation(format!(
            "{} returned an empty completion",
            generator.model()
        )));
    }

    Ok(text)
}

/// Remove an echoed prompt from the front of `raw`.
///
/// Output that does not start with the prompt is returned as-is (trimmed).
pub fn strip_echo(prompt: &str, raw: &str) -> String {
    match raw.strip_prefix(prompt) {
        Some(rest) => rest.trim().to_string(),
        None => {
            debug!("Backend declared prompt echo but output did not start with the prompt");
            raw.trim().to_string()
        }
    }
}

/// Build the generator selected in the settings, without device gating.
pub fn create_generator(settings: &GenerationSettings) -> Result<Arc<dyn Generator>> {
    let timeout = Duration::from_secs(settings.timeout_secs);
    let echoes = settings.echoes_prompt();

    let generator: Arc<dyn Generator> = match settings.provider {
        GenerationProvider::OpenAI => Arc::new(
            OpenAIGenerator::with_config(&settings.model, settings.base_url.as_deref(), timeout)?
                .with_prompt_echo(echoes),
        ),
        GenerationProvider::Ollama => Arc::new(
            OllamaGenerator::with_config(&settings.model, settings.base_url.as_deref(), timeout)?
                .with_prompt_echo(echoes),
        ),
        GenerationProvider::Tgi => {
            let base_url = settings.base_url.as_deref().ok_or_else(|| {
                ShopliteError::Config("generation.base_url is required for the tgi provider".to_string())
            })?;
            Arc::new(TgiGenerator::with_config(&settings.model, base_url, timeout)?.with_prompt_echo(echoes))
        }
    };

    Ok(generator)
}
