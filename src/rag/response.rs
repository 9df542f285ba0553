//! Grounded answer composition.

use super::{Confidence, ConfidenceBands, RetrievalGate, RetrievalHit};
use crate::config::Prompts;
use crate::error::Result;
use crate::generation::{generate_text, GenerationRequest, Generator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Answer returned by the support chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagAnswer {
    pub answer: String,
    /// Titles of the documents the answer was grounded on, in hit order.
    pub sources: Vec<String>,
    pub confidence: Confidence,
}

/// Builds a grounded prompt from retrieved documents and asks the generator.
pub struct AnswerComposer {
    generator: Arc<dyn Generator>,
    prompts: Prompts,
    bands: ConfidenceBands,
    max_tokens: u32,
    temperature: f32,
    max_tokens_limit: u32,
}

impl AnswerComposer {
    /// Create a composer with short, low-temperature answers.
    pub fn new(generator: Arc<dyn Generator>, prompts: Prompts) -> Self {
        Self {
            generator,
            prompts,
            bands: ConfidenceBands::default(),
            max_tokens: 150,
            temperature: 0.3,
            max_tokens_limit: 500,
        }
    }

    pub fn with_bands(mut self, bands: ConfidenceBands) -> Self {
        self.bands = bands;
        self
    }

    /// Set the token budget and temperature for answers.
    pub fn with_sampling(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    /// Set the hard token ceiling.
    pub fn with_token_limit(mut self, max_tokens_limit: u32) -> Self {
        self.max_tokens_limit = max_tokens_limit;
        self
    }

    pub fn bands(&self) -> ConfidenceBands {
        self.bands
    }

    /// Answer `query` from `hits`.
    ///
    /// Never fails: no hits yields the fallback reply without calling the
    /// generator, and a generator failure yields the apology reply.
    #[instrument(skip(self, hits), fields(count = hits.len()))]
    pub async fn compose(&self, query: &str, hits: &[RetrievalHit]) -> RagAnswer {
        if hits.is_empty() {
            info!("No relevant documents, answering with fallback");
            return RagAnswer {
                answer: self.prompts.rag.fallback.clone(),
                sources: Vec::new(),
                confidence: Confidence::Low,
            };
        }

        let context = hits
            .iter()
            .map(|h| h.document.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = self.prompts.grounded_prompt(query, &context);

        let generated = match GenerationRequest::new(
            prompt,
            self.max_tokens,
            self.temperature,
            self.max_tokens_limit,
        ) {
            Ok(request) => generate_text(self.generator.as_ref(), &request).await,
            Err(e) => Err(e),
        };

        let answer = match generated {
            Ok(text) => text,
            Err(e) => {
                error!("Generation failed, answering with apology: {}", e);
                self.prompts.rag.apology.clone()
            }
        };

        RagAnswer {
            answer,
            sources: hits.iter().map(|h| h.document.title.clone()).collect(),
            confidence: self.bands.for_hits(hits),
        }
    }
}

/// Retrieval gate and answer composer wired together.
pub struct RagEngine {
    gate: RetrievalGate,
    composer: AnswerComposer,
}

impl RagEngine {
    pub fn new(gate: RetrievalGate, composer: AnswerComposer) -> Self {
        Self { gate, composer }
    }

    pub fn gate(&self) -> &RetrievalGate {
        &self.gate
    }

    pub fn composer(&self) -> &AnswerComposer {
        &self.composer
    }

    /// Answer a customer question.
    ///
    /// Only retrieval failures (embedding or index errors) are returned as errors.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn ask(&self, question: &str) -> Result<RagAnswer> {
        let hits = self.gate.build(question).await?;
        Ok(self.composer.compose(question, &hits).await)
    }
}
