//! Hugging Face text-generation-inference (and inference endpoints) backend.
//!
//! These servers return the prompt ahead of the continuation unless told
//! otherwise, which is why the echo flag defaults on for this provider.

use super::{GenerationRequest, Generator};
use crate::error::{Result, ShopliteError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Environment variable holding an optional bearer token.
pub const TOKEN_ENV: &str = "HF_TOKEN";

pub struct TgiGenerator {
    http: Client,
    endpoint: Url,
    model: String,
    token: Option<String>,
    echoes_prompt: bool,
}

#[derive(Serialize)]
struct TgiRequest<'a> {
    inputs: &'a str,
    parameters: TgiParameters,
}

#[derive(Serialize)]
struct TgiParameters {
    max_new_tokens: u32,
    do_sample: bool,
    /// The server rejects a zero temperature, so greedy requests omit it.
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct Generated {
    generated_text: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TgiResponse {
    Many(Vec<Generated>),
    One(Generated),
}

impl TgiGenerator {
    /// `endpoint` is the URL generation requests are POSTed to.
    pub fn with_config(model: &str, endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| ShopliteError::Config(format!("Invalid TGI URL '{}': {}", endpoint, e)))?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ShopliteError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint,
            model: model.to_string(),
            token: std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty()),
            echoes_prompt: true,
        })
    }

    pub fn with_prompt_echo(mut self, echoes_prompt: bool) -> Self {
        self.echoes_prompt = echoes_prompt;
        self
    }

    fn body<'a>(request: &'a GenerationRequest) -> TgiRequest<'a> {
        let sample = !request.is_greedy();
        TgiRequest {
            inputs: &request.prompt,
            parameters: TgiParameters {
                max_new_tokens: request.max_tokens,
                do_sample: sample,
                temperature: sample.then_some(request.temperature),
            },
        }
    }
}

#[async_trait]
impl Generator for TgiGenerator {
    #[instrument(skip(self, request), fields(model = %self.model, max_tokens = request.max_tokens))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let mut builder = self.http.post(self.endpoint.clone()).json(&Self::body(request));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ShopliteError::Generation(format!("Generation request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ShopliteError::Generation(format!(
                "Generation failed: HTTP {} - {}",
                status, body
            )));
        }

        let parsed: TgiResponse = response
            .json()
            .await
            .map_err(|e| ShopliteError::Generation(format!("Malformed generation response: {}", e)))?;

        let text = match parsed {
            TgiResponse::One(g) => g.generated_text,
            TgiResponse::Many(many) => many
                .into_iter()
                .next()
                .map(|g| g.generated_text)
                .ok_or_else(|| ShopliteError::Generation("Empty generation response".to_string()))?,
        };

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
