//! OpenAI chat completions as a generation backend.

use super::{GenerationRequest, Generator};
use crate::error::{Result, ShopliteError};
use crate::openai::create_client_with;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Sends the prompt as a single user message.
pub struct OpenAIGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    echoes_prompt: bool,
}

impl OpenAIGenerator {
    pub fn with_config(model: &str, api_base: Option<&str>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: create_client_with(timeout, api_base)?,
            model: model.to_string(),
            echoes_prompt: false,
        })
    }

    /// Declare that the server behind `api_base` returns the prompt with the reply.
    pub fn with_prompt_echo(mut self, echoes_prompt: bool) -> Self {
        self.echoes_prompt = echoes_prompt;
        self
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    #[instrument(skip(self, request), fields(model = %self.model, max_tokens = request.max_tokens))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(request.prompt.clone())
                .build()
                .map_err(|e| ShopliteError::Generation(e.to_string()))?
                .into(),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_completion_tokens(request.max_tokens)
            .temperature(request.temperature)
            .build()
            .map_err(|e| ShopliteError::Generation(e.to_string()))?;

        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            ShopliteError::OpenAI(format!("Failed to generate response: {}", e))
        })?;

        let text = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| ShopliteError::Generation("Empty response from LLM".to_string()))?
            .clone();

        debug!("Generated {} characters", text.len());
        Ok(text)
    }

    fn echoes_prompt(&self) -> bool {
        self.echoes_prompt
    }

    fn model(&self) -> &str {
        &self.model
    }
}
