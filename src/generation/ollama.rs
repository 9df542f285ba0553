//! Ollama as a generation backend (e.g. `phi`, `llama3.2`).

use super::{GenerationRequest, Generator};
use crate::error::Result;
use crate::ollama::OllamaClient;
use async_trait::async_trait;
use std::time::Duration;
use tracing::instrument;

pub struct OllamaGenerator {
    client: OllamaClient,
    model: String,
    echoes_prompt: bool,
}

impl OllamaGenerator {
    pub fn with_config(model: &str, base_url: Option<&str>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: OllamaClient::new(base_url, timeout)?,
            model: model.to_string(),
            echoes_prompt: false,
        })
    }

    pub fn with_prompt_echo(mut self, echoes_prompt: bool) -> Self {
        self.echoes_prompt = echoes_prompt;
        self
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    #[instrument(skip(self, request), fields(model = %self.model, max_tokens = request.max_tokens))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.client
            .generate(&self.model, &request.prompt, request.max_tokens, request.temperature)
            .await
    }

    fn echoes_prompt(&self) -> bool {
        self.echoes_prompt
    }

    fn model(&self) -> &str {
        &self.model
    }
}
