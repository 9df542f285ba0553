//! Error types for Shoplite.

use thiserror::Error;

/// Library-level error type for Shoplite operations.
#[derive(Error, Debug)]
pub enum ShopliteError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Knowledge base error: {0}")]
    KnowledgeBase(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Similarity index error: {0}")]
    Index(String),

    #[error("Text generation failed: {0}")]
    Generation(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Shoplite operations.
pub type Result<T> = std::result::Result<T, ShopliteError>;
