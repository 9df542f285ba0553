//! Service context shared by every request.
//!
//! Built once at startup: the knowledge base is embedded, the index is
//! built, and the generator is placed behind its device gate. Nothing here is
//! mutated afterwards, so handlers share it through an `Arc` without locking.

use crate::config::{Prompts, Settings};
use crate::embedding::{create_embedder, Embedder};
use crate::error::{Result, ShopliteError};
use crate::generation::{create_generator, generate_text, DeviceGate, GenerationRequest, Generator};
use crate::index::{FlatL2Index, SimilarityIndex};
use crate::knowledge::KnowledgeBase;
use crate::rag::{AnswerComposer, Confidence, ConfidenceBands, RagAnswer, RagEngine, RetrievalGate, RetrievalHit};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Read-only state behind the chat and generation endpoints.
pub struct ServiceContext {
    settings: Settings,
    knowledge: Arc<KnowledgeBase>,
    generator: Arc<dyn Generator>,
    engine: RagEngine,
}

impl ServiceContext {
    /// Build the context with the providers selected in `settings`.
    pub async fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;

        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let embedder = create_embedder(&settings.embedding)?;
        let generator = create_generator(&settings.generation)?;

        info!(
            "Using {} embeddings ({}) and {} generation ({})",
            settings.embedding.provider,
            settings.embedding.model,
            settings.generation.provider,
            settings.generation.model
        );

        Self::with_components(settings, prompts, KnowledgeBase::shoplite(), embedder, generator).await
    }

    /// Build the context from explicit components.
    pub async fn with_components(
        settings: Settings,
        prompts: Prompts,
        knowledge: KnowledgeBase,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
    ) -> Result<Self> {
        settings.validate()?;

        let vectors = embedder.embed_batch(&knowledge.contents()).await?;
        if vectors.len() != knowledge.len() {
            return Err(ShopliteError::KnowledgeBase(format!(
                "embedded {} of {} documents",
                vectors.len(),
                knowledge.len()
            )));
        }

        let index = FlatL2Index::build(vectors)?;
        if knowledge.is_empty() {
            warn!("Knowledge base is empty; every question will get the fallback answer");
        } else if index.dimensions() != embedder.dimensions() {
            warn!(
                "Embedding dimension is {} but {} is configured",
                index.dimensions(),
                embedder.dimensions()
            );
        }
        info!("Indexed {} documents ({} dimensions)", index.len(), index.dimensions());

        let knowledge = Arc::new(knowledge);
        let generator: Arc<dyn Generator> =
            Arc::new(DeviceGate::new(generator, settings.generation.device_slots));

        let rag = &settings.rag;
        let gate = RetrievalGate::new(embedder, Arc::new(index), knowledge.clone())
            .with_top_k(rag.top_k)
            .with_threshold(rag.threshold);
        let composer = AnswerComposer::new(generator.clone(), prompts)
            .with_bands(ConfidenceBands::from(rag))
            .with_sampling(rag.max_tokens, rag.temperature)
            .with_token_limit(settings.generation.max_tokens_limit);

        Ok(Self {
            settings,
            knowledge,
            generator,
            engine: RagEngine::new(gate, composer),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn engine(&self) -> &RagEngine {
        &self.engine
    }

    /// Model identifier of the generation backend.
    pub fn model(&self) -> &str {
        self.generator.model()
    }

    /// Answer a customer question from the knowledge base.
    pub async fn chat(&self, question: &str) -> Result<RagAnswer> {
        self.engine.ask(question).await
    }

    /// Raw text generation, with the configured defaults and token ceiling.
    ///
    /// Unlike [`ServiceContext::chat`], generation failures are returned.
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    pub async fn generate(
        &self,
        prompt: &str,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<String> {
        let defaults = &self.settings.generation;
        let request = GenerationRequest::new(
            prompt,
            max_tokens.unwrap_or(defaults.default_max_tokens),
            temperature.unwrap_or(defaults.default_temperature),
            defaults.max_tokens_limit,
        )?;

        generate_text(self.generator.as_ref(), &request).await
    }

    /// Run the retrieval gate alone, for diagnostics.
    ///
    /// `top_k` is clamped to the knowledge base size.
    pub async fn search(
        &self,
        query: &str,
        top_k: Option<usize>,
        threshold: Option<f32>,
    ) -> Result<(Vec<RetrievalHit>, Confidence)> {
        let gate = self.engine.gate();
        let top_k = top_k.unwrap_or(gate.top_k()).min(self.knowledge.len());
        let threshold = threshold.unwrap_or(gate.threshold());
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ShopliteError::InvalidInput(format!(
                "threshold must be a non-negative number, got {}",
                threshold
            )));
        }

        let hits = gate.retrieve(query, top_k, threshold).await?;
        let confidence = self.engine.composer().bands().for_hits(&hits);
        Ok((hits, confidence))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::knowledge::Document;
    use crate::testing::{KeywordEmbedder, ScriptedGenerator};

    pub(crate) async fn context_with(generator: Arc<dyn Generator>) -> ServiceContext {
        ServiceContext::with_components(
            Settings::default(),
            Prompts::default(),
            KnowledgeBase::shoplite(),
            Arc::new(KeywordEmbedder),
            generator,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_chat_end_to_end() {
        let generator = Arc::new(ScriptedGenerator::replying("You have 14 days to return unused items."));
        let ctx = context_with(generator).await;

        let answer = ctx.chat("How long do I have to return an item?").await.unwrap();
        assert!(answer.sources.contains(&"Shoplite Returns".to_string()));
        assert!(answer.confidence >= Confidence::Medium);
        assert_eq!(answer.answer, "You have 14 days to return unused items.");
    }

    #[tokio::test]
    async fn test_chat_unrelated_question_falls_back() {
        let generator = Arc::new(ScriptedGenerator::replying("unused"));
        let ctx = context_with(generator.clone()).await;

        let answer = ctx.chat("What is the weather today?").await.unwrap();
        assert_eq!(answer.answer, Prompts::default().rag.fallback);
        assert!(answer.sources.is_empty());
        assert_eq!(answer.confidence, Confidence::Low);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_generate_applies_defaults_and_ceiling() {
        let generator = Arc::new(ScriptedGenerator::replying("Hi there!"));
        let ctx = context_with(generator.clone()).await;

        assert_eq!(ctx.generate("Hello", None, None).await.unwrap(), "Hi there!");
        ctx.generate("Hello", Some(5_000), Some(0.0)).await.unwrap();

        let requests = generator.requests();
        assert_eq!(requests[0].max_tokens, 200);
        assert!((requests[0].temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(requests[1].max_tokens, 500);
    }

    #[tokio::test]
    async fn test_generate_surfaces_failures() {
        let ctx = context_with(Arc::new(ScriptedGenerator::failing("model not loaded"))).await;
        let err = ctx.generate("Hello", None, None).await.unwrap_err();
        assert!(matches!(err, ShopliteError::Generation(ref m) if m.contains("model not loaded")));
    }

    #[tokio::test]
    async fn test_search_clamps_top_k() {
        let ctx = context_with(Arc::new(ScriptedGenerator::replying("ok"))).await;

        let (hits, confidence) = ctx.search("refund to my card", Some(50), Some(4.0)).await.unwrap();
        assert_eq!(hits.len(), 5);
        assert_eq!(confidence, Confidence::High);

        assert!(ctx.search("refund", None, Some(f32::NAN)).await.is_err());
    }

    #[tokio::test]
    async fn test_custom_knowledge_base() {
        let kb = KnowledgeBase::from_documents(vec![Document::new(
            "faq1",
            "Gift Cards",
            "Gift cards can be used as payment at checkout.",
        )]);
        let ctx = ServiceContext::with_components(
            Settings::default(),
            Prompts::default(),
            kb,
            Arc::new(KeywordEmbedder),
            Arc::new(ScriptedGenerator::replying("Yes.")),
        )
        .await
        .unwrap();

        assert_eq!(ctx.knowledge().len(), 1);
        let answer = ctx.chat("Can I pay with a gift card?").await.unwrap();
        assert_eq!(answer.sources, vec!["Gift Cards"]);
    }

    #[tokio::test]
    async fn test_invalid_settings_rejected() {
        let mut settings = Settings::default();
        settings.rag.top_k = 0;

        let result = ServiceContext::with_components(
            settings,
            Prompts::default(),
            KnowledgeBase::shoplite(),
            Arc::new(KeywordEmbedder),
            Arc::new(ScriptedGenerator::replying("ok")),
        )
        .await;
        assert!(matches!(result, Err(ShopliteError::Config(_))));
    }
}
