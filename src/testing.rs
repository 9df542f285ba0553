//! Deterministic test doubles for the embedding and generation backends.

use crate::embedding::Embedder;
use crate::error::{Result, ShopliteError};
use crate::generation::{GenerationRequest, Generator};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Topic axes; a text's vector counts the words matching each axis' stems.
const AXES: &[&[&str]] = &[
    &["regist", "verif", "account", "sign"],
    &["return", "refund"],
    &["ship", "deliver", "overnight", "express"],
    &["pay", "card", "wallet"],
    &["support", "contact", "chat", "phone"],
];

/// Embeds text as normalised keyword counts over a handful of support topics.
///
/// Text matching no topic lands on a dedicated extra axis, so it sits at
/// squared distance 2.0 from every document.
pub struct KeywordEmbedder;

impl KeywordEmbedder {
    pub fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; AXES.len() + 1];
        for word in text.to_lowercase().split(|c: char| !c.is_alphanumeric()) {
            if word.is_empty() {
                continue;
            }
            for (axis, stems) in AXES.iter().enumerate() {
                if stems.iter().any(|s| word.starts_with(s)) {
                    v[axis] += 1.0;
                }
            }
        }

        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm == 0.0 {
            v[AXES.len()] = 1.0;
        } else {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(Self::vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        AXES.len() + 1
    }
}

/// Embedder whose backend is down.
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(ShopliteError::Embedding("embedding backend unavailable".to_string()))
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(ShopliteError::Embedding("embedding backend unavailable".to_string()))
    }

    fn dimensions(&self) -> usize {
        0
    }
}

/// Generator returning a canned reply and recording what it was asked.
pub struct ScriptedGenerator {
    reply: std::result::Result<String, String>,
    echoes_prompt: bool,
    delay: Option<Duration>,
    requests: Mutex<Vec<GenerationRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            echoes_prompt: false,
            delay: None,
            requests: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            ..Self::replying("")
        }
    }

    /// Prepend the prompt to every reply and declare it.
    pub fn echoing(mut self) -> Self {
        self.echoes_prompt = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match &self.reply {
            Ok(reply) if self.echoes_prompt => Ok(format!("{}{}", request.prompt, reply)),
            Ok(reply) => Ok(reply.clone()),
            Err(message) => Err(ShopliteError::Generation(message.clone())),
        }
    }

    fn echoes_prompt(&self) -> bool {
        self.echoes_prompt
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
