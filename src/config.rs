//! Analyzer constants and environment-driven server settings.

use std::path::PathBuf;

/// Shipping / delivery / service vocabulary used by the relevance filter.
pub const DEFAULT_SHIPPING_KEYWORDS: [&str; 11] = [
    "shipping",
    "delivery",
    "arrived",
    "package",
    "box",
    "damaged",
    "return",
    "refund",
    "customer service",
    "late",
    "delay",
];

/// Tunables of the analysis pipeline. `Default` carries the reference values.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Characters handed to the model (512 tokens at ~4 chars per token).
    pub max_input_chars: usize,
    pub positive_threshold: f64,
    pub negative_threshold: f64,
    pub shipping_keywords: Vec<String>,
    pub min_keyword_hits: usize,
    pub max_keyword_density: f64,
    pub summary_max_words: usize,
    pub score_bands: ScoreBands,
    /// Emit a progress event every N processed reviews (0 disables periodic events).
    pub progress_interval: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_input_chars: 512 * 4,
            positive_threshold: 0.7,
            negative_threshold: 0.7,
            shipping_keywords: DEFAULT_SHIPPING_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            min_keyword_hits: 2,
            max_keyword_density: 0.05,
            summary_max_words: 50,
            score_bands: ScoreBands::default(),
            progress_interval: 50,
        }
    }
}

/// Lower bounds (inclusive) of the overall sentiment categories on the 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBands {
    pub very_positive: u32,
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
}

impl Default for ScoreBands {
    fn default() -> Self {
        Self {
            very_positive: 75,
            positive: 60,
            neutral: 40,
            negative: 25,
        }
    }
}

/// Which sentiment model backs the classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModelBackend {
    Lexicon,
    Remote,
}

impl ModelBackend {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "remote" | "sidecar" => ModelBackend::Remote,
            _ => ModelBackend::Lexicon,
        }
    }
}

/// Process-level settings read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub data_dir: PathBuf,
    pub max_reviews: usize,
    pub backend: ModelBackend,
    pub sidecar_url: String,
    pub sidecar_timeout_secs: u64,
    pub progress_interval: usize,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparsable numbers fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let number = |key: &str, default: u64| -> u64 {
            lookup(key)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        };

        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:5004".to_string()),
            data_dir: PathBuf::from(lookup("DATA_DIR").unwrap_or_else(|| "data".to_string())),
            max_reviews: number("MAX_REVIEWS", 500) as usize,
            backend: ModelBackend::parse(&lookup("SENTIMENT_BACKEND").unwrap_or_default()),
            sidecar_url: lookup("ML_SIDECAR_URL")
                .unwrap_or_else(|| "http://localhost:8000".to_string()),
            sidecar_timeout_secs: number("ML_TIMEOUT_SECS", 30),
            progress_interval: number("PROGRESS_INTERVAL", 50) as usize,
        }
    }

    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            progress_interval: self.progress_interval,
            ..AnalyzerConfig::default()
        }
    }
}
