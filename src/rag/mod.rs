//! Retrieval-gated answering for the support chat.
//!
//! The [`RetrievalGate`] decides which documents are close enough to answer
//! from; the [`AnswerComposer`] turns them into a grounded reply, or a fixed
//! fallback when nothing qualifies.

pub mod context;
mod response;

pub use context::RetrievalGate;
pub use response::{AnswerComposer, RagAnswer, RagEngine};

use crate::config::RagSettings;
use crate::knowledge::Document;
use serde::{Deserialize, Serialize};

/// A retrieved document and its distance to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalHit {
    pub document: Document,
    /// Non-negative; lower means more similar.
    pub distance: f32,
}

/// Coarse label for how well retrieved context matches a query.
///
/// Ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::Low => write!(f, "low"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::High => write!(f, "high"),
        }
    }
}

/// Distance boundaries for the confidence labels.
///
/// Calibrated per embedding model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceBands {
    pub high_below: f32,
    pub medium_below: f32,
}

impl Default for ConfidenceBands {
    fn default() -> Self {
        Self {
            high_below: 0.5,
            medium_below: 1.0,
        }
    }
}

impl From<&RagSettings> for ConfidenceBands {
    fn from(settings: &RagSettings) -> Self {
        Self {
            high_below: settings.high_confidence_below,
            medium_below: settings.medium_confidence_below,
        }
    }
}

impl ConfidenceBands {
    /// Label for the closest hit's distance.
    pub fn classify(&self, min_distance: f32) -> Confidence {
        if min_distance < self.high_below {
            Confidence::High
        } else if min_distance < self.medium_below {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    /// Label for a hit set; no hits is `Low`.
    pub fn for_hits(&self, hits: &[RetrievalHit]) -> Confidence {
        hits.iter()
            .map(|h| h.distance)
            .reduce(f32::min)
            .map(|m| self.classify(m))
            .unwrap_or(Confidence::Low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(distance: f32) -> RetrievalHit {
        RetrievalHit {
            document: Document::new("d", "Doc", "content"),
            distance,
        }
    }

    #[test]
    fn test_band_boundaries() {
        let bands = ConfidenceBands::default();
        assert_eq!(bands.classify(0.0), Confidence::High);
        assert_eq!(bands.classify(0.49), Confidence::High);
        assert_eq!(bands.classify(0.5), Confidence::Medium);
        assert_eq!(bands.classify(0.99), Confidence::Medium);
        assert_eq!(bands.classify(1.0), Confidence::Low);
        assert_eq!(bands.classify(1.5), Confidence::Low);
    }

    #[test]
    fn test_confidence_is_monotonic_in_distance() {
        let bands = ConfidenceBands::default();
        let distances: Vec<f32> = (0..=150).map(|i| i as f32 / 100.0).collect();
        for pair in distances.windows(2) {
            assert!(bands.classify(pair[0]) >= bands.classify(pair[1]));
        }
    }

    #[test]
    fn test_for_hits_uses_minimum() {
        let bands = ConfidenceBands::default();
        assert_eq!(bands.for_hits(&[hit(1.2), hit(0.7)]), Confidence::Medium);
        assert_eq!(bands.for_hits(&[]), Confidence::Low);
    }

    #[test]
    fn test_bands_from_settings() {
        let settings = RagSettings {
            high_confidence_below: 0.3,
            medium_confidence_below: 0.8,
            ..Default::default()
        };
        let bands = ConfidenceBands::from(&settings);
        assert_eq!(bands.classify(0.4), Confidence::Medium);
        assert_eq!(bands.classify(0.8), Confidence::Low);
    }

    #[test]
    fn test_confidence_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Confidence::Medium).unwrap(), "\"medium\"");
        assert_eq!(Confidence::High.to_string(), "high");
    }
}
