//! Product review sentiment analysis.
//!
//! A batch of [`review::RawReview`]s goes through [`analyzer::ReviewAnalyzer`],
//! which filters off-topic reviews, classifies sentiment with a pluggable
//! [`ml::SentimentModel`], summarizes each review and aggregates everything
//! into an [`review::AnalysisReport`]. The crawler, mock generator, storage
//! and HTTP modules feed and expose that pipeline.

pub mod analyzer;
pub mod api;
pub mod classifier;
pub mod config;
pub mod crawler;
pub mod error;
pub mod ml;
pub mod mock;
pub mod relevance;
pub mod review;
pub mod storage;
pub mod summarizer;

use std::time::Duration;

use config::{AnalyzerConfig, ModelBackend, ServerConfig};
use ml::{LexiconModel, RemoteModel, SentimentModel};

/// Model selected by the environment.
pub fn build_model(config: &ServerConfig) -> Box<dyn SentimentModel> {
    match config.backend {
        ModelBackend::Lexicon => Box::new(LexiconModel::new()),
        ModelBackend::Remote => Box::new(RemoteModel::new(
            &config.sidecar_url,
            Duration::from_secs(config.sidecar_timeout_secs),
        )),
    }
}

pub fn build_analyzer(config: &ServerConfig) -> analyzer::ReviewAnalyzer {
    let analyzer_config: AnalyzerConfig = config.analyzer_config();
    analyzer::ReviewAnalyzer::new(build_model(config), analyzer_config)
}

/// `tracing` subscriber honoring `RUST_LOG`, `info` by default.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}
