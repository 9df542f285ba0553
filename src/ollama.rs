//! Minimal Ollama HTTP client shared by the embedding and generation backends.

use crate::error::{Result, ShopliteError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Default Ollama server address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Ollama API client.
#[derive(Clone)]
pub struct OllamaClient {
    http: Client,
    base_url: Url,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    /// Skip the model's chat template so the model continues the prompt verbatim.
    raw: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaClient {
    /// Create a client for the given base URL (or the local default).
    pub fn new(base_url: Option<&str>, timeout: Duration) -> Result<Self> {
        let base = base_url.unwrap_or(DEFAULT_BASE_URL);
        let mut base_url = Url::parse(base)
            .map_err(|e| ShopliteError::Config(format!("Invalid Ollama URL '{}': {}", base, e)))?;
        // Endpoints join onto the path, which must end in a slash to be kept.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ShopliteError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ShopliteError::Config(format!("Invalid Ollama endpoint {}: {}", path, e)))
    }

    /// Embed a single text.
    pub async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        let response = self
            .http
            .post(self.endpoint("api/embeddings")?)
            .json(&EmbedRequest { model, prompt: text })
            .send()
            .await
            .map_err(|e| ShopliteError::Embedding(format!("Embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ShopliteError::Embedding(format!(
                "Embedding failed: HTTP {}",
                response.status()
            )));
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| ShopliteError::Embedding(format!("Failed to parse embedding response: {}", e)))?;

        Ok(body.embedding)
    }

    /// Generate a raw continuation of `prompt`.
    pub async fn generate(
        &self,
        model: &str,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
            raw: true,
            options: GenerateOptions {
                temperature,
                num_predict: max_tokens,
            },
        };

        let response = self
            .http
            .post(self.endpoint("api/generate")?)
            .json(&request)
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

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ShopliteError::Generation(format!("Failed to parse generation response: {}", e)))?;

        Ok(body.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base() {
        let client = OllamaClient::new(Some("http://gpu-box:11434/"), Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.endpoint("api/generate").unwrap().as_str(),
            "http://gpu-box:11434/api/generate"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_sub_path() {
        let client = OllamaClient::new(Some("http://proxy.local/ollama"), Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.endpoint("api/generate").unwrap().as_str(),
            "http://proxy.local/ollama/api/generate"
        );
        assert_eq!(
            client.endpoint("api/embeddings").unwrap().as_str(),
            "http://proxy.local/ollama/api/embeddings"
        );

        let bare = OllamaClient::new(None, Duration::from_secs(5)).unwrap();
        assert_eq!(
            bare.endpoint("api/generate").unwrap().as_str(),
            "http://localhost:11434/api/generate"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(OllamaClient::new(Some("not a url"), Duration::from_secs(5)).is_err());
    }
}
