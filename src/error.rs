//! Error types for the analysis pipeline.
//!
//! Glue code (crawler, storage, server) uses `anyhow`; the core pipeline
//! returns [`AnalysisError`] so callers can branch on what went wrong.

use thiserror::Error;

/// A [`Result`](std::result::Result) alias using [`AnalysisError`].
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// The batch contained no reviews at all.
    #[error("No reviews to analyze")]
    EmptyBatch,

    /// The text cannot be handed to the model.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The sentiment model failed. Fatal to the whole batch.
    #[error("{}", describe_inference_failure(.index, .message))]
    ModelInference { index: Option<usize>, message: String },
}

fn describe_inference_failure(index: &Option<usize>, message: &str) -> String {
    match index {
        Some(i) => format!("model inference failed on review #{}: {}", i, message),
        None => format!("model inference failed: {}", message),
    }
}

impl AnalysisError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        AnalysisError::InvalidInput { reason: reason.into() }
    }

    /// Attach the index of the review being processed to an inference failure.
    pub fn at_review(self, review_index: usize) -> Self {
        match self {
            AnalysisError::ModelInference { message, .. } => AnalysisError::ModelInference {
                index: Some(review_index),
                message,
            },
            other => other,
        }
    }
}

impl From<anyhow::Error> for AnalysisError {
    fn from(value: anyhow::Error) -> Self {
        AnalysisError::ModelInference {
            index: None,
            message: format!("{:#}", value),
        }
    }
}
