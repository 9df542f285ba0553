//! Configuration settings for Shoplite.

use crate::error::{Result, ShopliteError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub embedding: EmbeddingSettings,
    pub generation: GenerationSettings,
    pub rag: RagSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Per-request timeout. Generation dominates latency, so keep this generous.
    pub request_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            request_timeout_secs: 60,
        }
    }
}

/// Backend used for embeddings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    #[default]
    OpenAI,
    Ollama,
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(EmbeddingProvider::OpenAI),
            "ollama" => Ok(EmbeddingProvider::Ollama),
            _ => Err(format!("Unknown embedding provider: {}", s)),
        }
    }
}

impl std::fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProvider::OpenAI => write!(f, "openai"),
            EmbeddingProvider::Ollama => write!(f, "ollama"),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (openai, ollama).
    pub provider: EmbeddingProvider,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
    /// Override for the provider's API base URL.
    pub base_url: Option<String>,
    /// Timeout for a single embedding call.
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::OpenAI,
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            base_url: None,
            timeout_secs: 60,
        }
    }
}

/// Backend used for text generation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GenerationProvider {
    /// OpenAI (or any OpenAI-compatible server via `base_url`).
    #[default]
    OpenAI,
    /// Local Ollama server.
    Ollama,
    /// Hugging Face text-generation-inference / inference endpoints.
    Tgi,
}

impl GenerationProvider {
    /// Whether the backend returns the prompt ahead of the continuation by default.
    pub fn echoes_prompt_by_default(&self) -> bool {
        matches!(self, GenerationProvider::Tgi)
    }
}

impl std::str::FromStr for GenerationProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(GenerationProvider::OpenAI),
            "ollama" => Ok(GenerationProvider::Ollama),
            "tgi" | "huggingface" | "hf" => Ok(GenerationProvider::Tgi),
            _ => Err(format!("Unknown generation provider: {}", s)),
        }
    }
}

impl std::fmt::Display for GenerationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationProvider::OpenAI => write!(f, "openai"),
            GenerationProvider::Ollama => write!(f, "ollama"),
            GenerationProvider::Tgi => write!(f, "tgi"),
        }
    }
}

/// Text generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Generation provider (openai, ollama, tgi).
    pub provider: GenerationProvider,
    /// Model identifier passed to the provider.
    pub model: String,
    /// Override for the provider's API base URL.
    pub base_url: Option<String>,
    /// Compute device label reported by `/` and `/health`.
    pub device: String,
    /// Number of generations allowed in flight at once (one per device).
    pub device_slots: usize,
    /// Hard ceiling on tokens per request.
    pub max_tokens_limit: u32,
    /// `max_tokens` used by `/generate` when the request omits it.
    pub default_max_tokens: u32,
    /// `temperature` used by `/generate` when the request omits it.
    pub default_temperature: f32,
    /// Whether the backend echoes the prompt. `None` uses the provider default.
    pub echoes_prompt: Option<bool>,
    /// Timeout for a single backend call.
    pub timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            provider: GenerationProvider::OpenAI,
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            device: "cpu".to_string(),
            device_slots: 1,
            max_tokens_limit: 500,
            default_max_tokens: 200,
            default_temperature: 0.7,
            echoes_prompt: None,
            timeout_secs: crate::openai::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GenerationSettings {
    /// Resolve the echo capability flag for the configured provider.
    pub fn echoes_prompt(&self) -> bool {
        self.echoes_prompt
            .unwrap_or_else(|| self.provider.echoes_prompt_by_default())
    }
}

/// RAG (Retrieval-Augmented Generation) settings.
///
/// The distance thresholds are calibrated to the embedding model in use and
/// must be re-derived when the embedding model changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// Number of nearest documents to consider.
    pub top_k: usize,
    /// Hits farther than this are discarded.
    pub threshold: f32,
    /// Minimum distance below this is `high` confidence.
    pub high_confidence_below: f32,
    /// Minimum distance below this (and not high) is `medium` confidence.
    pub medium_confidence_below: f32,
    /// Token budget for grounded answers.
    pub max_tokens: u32,
    /// Sampling temperature for grounded answers.
    pub temperature: f32,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            top_k: 2,
            threshold: 1.5,
            high_confidence_below: 0.5,
            medium_confidence_below: 1.0,
            max_tokens: 150,
            temperature: 0.3,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| ShopliteError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shoplite")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Check the settings for values the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        let rag = &self.rag;
        if rag.top_k == 0 {
            return Err(ShopliteError::Config("rag.top_k must be at least 1".to_string()));
        }
        if !rag.threshold.is_finite() || rag.threshold <= 0.0 {
            return Err(ShopliteError::Config(format!(
                "rag.threshold must be a positive number, got {}",
                rag.threshold
            )));
        }
        if !(rag.high_confidence_below > 0.0
            && rag.high_confidence_below < rag.medium_confidence_below)
        {
            return Err(ShopliteError::Config(format!(
                "confidence bands must satisfy 0 < high ({}) < medium ({})",
                rag.high_confidence_below, rag.medium_confidence_below
            )));
        }
        if rag.max_tokens == 0 || !(rag.temperature >= 0.0) {
            return Err(ShopliteError::Config(
                "rag.max_tokens must be positive and rag.temperature non-negative".to_string(),
            ));
        }

        let generation = &self.generation;
        if generation.device_slots == 0 {
            return Err(ShopliteError::Config(
                "generation.device_slots must be at least 1".to_string(),
            ));
        }
        if generation.max_tokens_limit == 0 {
            return Err(ShopliteError::Config(
                "generation.max_tokens_limit must be at least 1".to_string(),
            ));
        }
        if !(generation.default_temperature >= 0.0) {
            return Err(ShopliteError::Config(
                "generation.default_temperature must be non-negative".to_string(),
            ));
        }

        if self.embedding.dimensions == 0 {
            return Err(ShopliteError::Config(
                "embedding.dimensions must be at least 1".to_string(),
            ));
        }
        if self.embedding.timeout_secs == 0 || generation.timeout_secs == 0 {
            return Err(ShopliteError::Config(
                "embedding.timeout_secs and generation.timeout_secs must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.rag.top_k, 2);
        assert_eq!(settings.rag.threshold, 1.5);
        assert_eq!(settings.generation.max_tokens_limit, 500);
    }

    #[test]
    fn test_rejects_inverted_bands() {
        let mut settings = Settings::default();
        settings.rag.high_confidence_below = 1.2;
        assert!(matches!(settings.validate(), Err(ShopliteError::Config(_))));
    }

    #[test]
    fn test_rejects_zero_device_slots() {
        let mut settings = Settings::default();
        settings.generation.device_slots = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [generation]
            provider = "tgi"
            model = "microsoft/phi-2"

            [rag]
            threshold = 1.2
            "#,
        )
        .unwrap();

        assert_eq!(settings.generation.provider, GenerationProvider::Tgi);
        assert!(settings.generation.echoes_prompt());
        assert_eq!(settings.rag.threshold, 1.2);
        assert_eq!(settings.rag.top_k, 2);
        assert_eq!(settings.server.port, 8000);
    }

    #[test]
    fn test_echo_flag_override() {
        let mut generation = GenerationSettings {
            provider: GenerationProvider::Tgi,
            ..Default::default()
        };
        generation.echoes_prompt = Some(false);
        assert!(!generation.echoes_prompt());
        assert!(!GenerationSettings::default().echoes_prompt());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.server.port = 9100;
        settings.embedding.provider = EmbeddingProvider::Ollama;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.server.port, 9100);
        assert_eq!(loaded.embedding.provider, EmbeddingProvider::Ollama);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.server.host, "127.0.0.1");
    }

    #[test]
    fn test_embedding_timeout() {
        let settings: Settings = toml::from_str(
            r#"
            [embedding]
            provider = "ollama"
            timeout_secs = 15
            "#,
        )
        .unwrap();
        assert_eq!(settings.embedding.timeout_secs, 15);
        assert_eq!(Settings::default().embedding.timeout_secs, 60);

        let mut zero = Settings::default();
        zero.embedding.timeout_secs = 0;
        assert!(matches!(zero.validate(), Err(ShopliteError::Config(_))));
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!("HF".parse::<GenerationProvider>().unwrap(), GenerationProvider::Tgi);
        assert_eq!("ollama".parse::<EmbeddingProvider>().unwrap(), EmbeddingProvider::Ollama);
        assert!("faiss".parse::<EmbeddingProvider>().is_err());
    }
}
