//! Sentiment model backends.
//!
//! A model turns text into two raw logits, `[negative, positive]`. The
//! classifier owns truncation, softmax and labelling, so a backend only has
//! to score text. Two backends ship:
//!
//! - [`LexiconModel`]: word-list scoring, no external dependencies.
//! - [`RemoteModel`]: a pretrained binary classifier served by the local ML sidecar.

use anyhow::{Context, Result};
use once_cell::sync::{Lazy, OnceCell};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

/// Black-box binary sentiment scorer.
pub trait SentimentModel: Send + Sync {
    fn name(&self) -> &str;

    /// Raw logits for `[negative, positive]`.
    fn logits(&self, text: &str) -> Result<[f64; 2]>;
}

/// Two-class softmax, returns `(negative, positive)` probabilities.
///
/// The smaller probability is derived as `1.0 - larger`, which is exact for
/// values >= 0.5, so the pair always sums to exactly 1.0.
pub fn softmax2(logits: [f64; 2]) -> (f64, f64) {
    let max = logits[0].max(logits[1]);
    let neg = (logits[0] - max).exp();
    let pos = (logits[1] - max).exp();
    let sum = neg + pos;

    let positive = pos / sum;
    if positive >= 0.5 {
        (1.0 - positive, positive)
    } else {
        let negative = neg / sum;
        (negative, 1.0 - negative)
    }
}

// Common positive words for review sentiment
static POSITIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    vec![
        "good", "great", "excellent", "amazing", "wonderful", "fantastic", "superb",
        "outstanding", "brilliant", "love", "loved", "loving", "best", "better",
        "happy", "beautiful", "perfect", "perfectly", "awesome", "incredible", "delightful",
        "pleasant", "satisfying", "satisfied", "recommend", "recommended", "impressive",
        "impressed", "exceptional", "remarkable", "efficient", "effective", "helpful",
        "reliable", "quality", "valuable", "durable", "sturdy", "exceeded", "wonderfully",
        "easier", "fast", "faster", "works", "value",
    ]
    .into_iter()
    .collect()
});

// Common negative words for review sentiment
static NEGATIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    vec![
        "bad", "terrible", "awful", "horrible", "poor", "worst", "worse", "hate",
        "hated", "dislike", "disappointing", "disappointed", "failure", "failed", "fail",
        "sad", "unhappy", "angry", "annoyed", "frustrated", "frustrating", "problem",
        "problems", "issue", "issues", "broke", "broken", "defect", "defects", "flaws",
        "wrong", "useless", "waste", "scam", "fake", "unreliable", "slow", "cheap",
        "cheaply", "overpriced", "worthless", "garbage", "trash", "mediocre", "regret",
        "misleading", "stopped", "damaged", "late",
    ]
    .into_iter()
    .collect()
});

/// Word-list scorer. Each matching token shifts the corresponding logit by `weight`.
#[derive(Debug, Clone)]
pub struct LexiconModel {
    weight: f64,
}

impl Default for LexiconModel {
    fn default() -> Self {
        Self { weight: 0.8 }
    }
}

impl LexiconModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weight(weight: f64) -> Self {
        Self { weight }
    }

    /// `(positive_hits, negative_hits)` over lowercased alphabetic tokens longer than 2 chars.
    pub fn count_hits(text: &str) -> (usize, usize) {
        let lowercase_text = text.to_lowercase();
        let words: Vec<&str> = lowercase_text
            .split(|c: char| !c.is_alphabetic())
            .filter(|w| w.len() > 2)
            .collect();

        let positive = words.iter().filter(|w| POSITIVE_WORDS.contains(*w)).count();
        let negative = words.iter().filter(|w| NEGATIVE_WORDS.contains(*w)).count();
        (positive, negative)
    }
}

impl SentimentModel for LexiconModel {
    fn name(&self) -> &str {
        "lexicon"
    }

    fn logits(&self, text: &str) -> Result<[f64; 2]> {
        let (positive, negative) = Self::count_hits(text);
        Ok([negative as f64 * self.weight, positive as f64 * self.weight])
    }
}

#[derive(Debug, Deserialize)]
struct SidecarSentimentResponse {
    logits: Vec<f64>,
}

/// Calls the ML sidecar (`POST {base_url}/ml/sentiment`) hosting a pretrained classifier.
///
/// Blocking by design; callers on an async runtime must go through
/// `spawn_blocking`. The HTTP client is built on first use so that it is
/// created on the blocking thread.
pub struct RemoteModel {
    endpoint: String,
    timeout: Duration,
    client: OnceCell<reqwest::blocking::Client>,
}

impl RemoteModel {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            endpoint: format!("{}/ml/sentiment", base_url.trim_end_matches('/')),
            timeout,
            client: OnceCell::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn client(&self) -> Result<&reqwest::blocking::Client> {
        self.client.get_or_try_init(|| {
            reqwest::blocking::Client::builder()
                .timeout(self.timeout)
                .build()
                .context("failed to build sidecar HTTP client")
        })
    }
}

impl SentimentModel for RemoteModel {
    fn name(&self) -> &str {
        "remote"
    }

    fn logits(&self, text: &str) -> Result<[f64; 2]> {
        let response = self
            .client()?
            .post(&self.endpoint)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .with_context(|| format!("sidecar unreachable at {}", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("sidecar returned {}", status);
        }

        let body: SidecarSentimentResponse = response
            .json()
            .context("sidecar response is not valid sentiment JSON")?;
        parse_logits(&body.logits)
    }
}

fn parse_logits(values: &[f64]) -> Result<[f64; 2]> {
    match values {
        [neg, pos] => Ok([*neg, *pos]),
        other => anyhow::bail!("expected 2 logits, got {}", other.len()),
    }
}
