//! Configuration module for Shoplite.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, RagPrompts, ANSWER_CUE};
pub use settings::{
    EmbeddingProvider, EmbeddingSettings, GeneralSettings, GenerationProvider,
    GenerationSettings, PromptSettings, RagSettings, ServerSettings, Settings,
};
