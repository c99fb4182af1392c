//! Text classification on top of a binary [`SentimentModel`].
//!
//! The model only knows negative vs. positive. Neutral is synthesized: a
//! review is Neutral unless one side is confidently above its threshold.

use crate::config::AnalyzerConfig;
use crate::error::{AnalysisError, Result};
use crate::ml::{softmax2, SentimentModel};
use crate::review::{SentimentLabel, SentimentResult};

pub struct TextClassifier {
    model: Box<dyn SentimentModel>,
    max_input_chars: usize,
    positive_threshold: f64,
    negative_threshold: f64,
}

impl TextClassifier {
    pub fn new(model: Box<dyn SentimentModel>, config: &AnalyzerConfig) -> Self {
        Self {
            model,
            max_input_chars: config.max_input_chars,
            positive_threshold: config.positive_threshold,
            negative_threshold: config.negative_threshold,
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn classify(&self, text: &str) -> Result<SentimentResult> {
        let text = truncate_chars(text, self.max_input_chars);
        if text.trim().is_empty() {
            return Err(AnalysisError::invalid_input("text is empty after truncation"));
        }

        let logits = self.model.logits(text)?;
        if !logits.iter().all(|l| l.is_finite()) {
            return Err(AnalysisError::ModelInference {
                index: None,
                message: format!("model '{}' produced non-finite logits {:?}", self.model.name(), logits),
            });
        }

        let (negative_score, positive_score) = softmax2(logits);
        Ok(SentimentResult {
            label: self.label_for(positive_score, negative_score),
            confidence: positive_score.max(negative_score),
            positive_score,
            negative_score,
        })
    }

    /// Positive wins over Negative when both clear their thresholds.
    pub fn label_for(&self, positive_score: f64, negative_score: f64) -> SentimentLabel {
        if positive_score > self.positive_threshold {
            SentimentLabel::Positive
        } else if negative_score > self.negative_threshold {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

/// First `max_chars` characters of `text`, cut on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
