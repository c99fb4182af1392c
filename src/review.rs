//! Review records flowing in and the report flowing out.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// A review as supplied by a review source. Only `text` is meaningful when absent fields default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RawReview {
    #[serde(default)]
    pub text: String,
    /// Star rating on a 0-5 scale. Missing or `null` reads as 0.
    #[serde(default, deserialize_with = "rating_or_zero")]
    pub rating: f64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub verified: bool,
}

pub(crate) fn rating_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

impl RawReview {
    pub fn new(text: impl Into<String>, rating: f64) -> Self {
        Self {
            text: text.into(),
            rating,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        };
        f.write_str(s)
    }
}

/// Output of the text classifier for one piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    /// `max(positive_score, negative_score)`
    pub confidence: f64,
    pub positive_score: f64,
    pub negative_score: f64,
}

/// Per-review entry of a report.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AnalyzedReview {
    pub rating: f64,
    pub sentiment: SentimentLabel,
    pub confidence: f64,
    pub product_related: bool,
    pub summary: String,
    pub review_title: String,
    pub review_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct SentimentDistribution {
    #[serde(rename = "Positive")]
    pub positive: usize,
    #[serde(rename = "Negative")]
    pub negative: usize,
    #[serde(rename = "Neutral")]
    pub neutral: usize,
}

impl SentimentDistribution {
    pub fn record(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
        }
    }
}

/// Batch-level category derived from the 0-100 sentiment score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum OverallSentiment {
    #[serde(rename = "Very Positive")]
    VeryPositive,
    Positive,
    Neutral,
    Negative,
    #[serde(rename = "Very Negative")]
    VeryNegative,
}

impl fmt::Display for OverallSentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OverallSentiment::VeryPositive => "Very Positive",
            OverallSentiment::Positive => "Positive",
            OverallSentiment::Neutral => "Neutral",
            OverallSentiment::Negative => "Negative",
            OverallSentiment::VeryNegative => "Very Negative",
        };
        f.write_str(s)
    }
}

/// Aggregate report for one batch of reviews.
///
/// `total_reviews` counts the processed reviews only; blank reviews are
/// reported in `skipped_reviews`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct AnalysisReport {
    pub total_reviews: usize,
    pub skipped_reviews: usize,
    pub sentiment_distribution: SentimentDistribution,
    pub average_rating: f64,
    pub product_related: usize,
    pub non_product_related: usize,
    pub overall_sentiment_score: u32,
    pub overall_sentiment: Option<OverallSentiment>,
    pub overall_summary: String,
    pub detailed_analysis: Vec<AnalyzedReview>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_review_defaults_missing_fields() {
        let review: RawReview = serde_json::from_value(json!({ "text": "Works fine." })).unwrap();
        assert_eq!(review.text, "Works fine.");
        assert_eq!(review.rating, 0.0);
        assert_eq!(review.title, "");
        assert_eq!(review.date, "");
        assert!(!review.verified);
    }

    #[test]
    fn test_raw_review_accepts_integer_rating() {
        let review: RawReview = serde_json::from_value(json!({ "text": "ok", "rating": 4 })).unwrap();
        assert_eq!(review.rating, 4.0);
    }

    #[test]
    fn test_raw_review_null_rating_is_zero() {
        let review: RawReview =
            serde_json::from_value(json!({ "text": "ok", "rating": null })).unwrap();
        assert_eq!(review.rating, 0.0);

        let batch: Vec<RawReview> = serde_json::from_value(json!([
            { "text": "Love it", "rating": 5 },
            { "text": "No stars given", "rating": null }
        ]))
        .unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1].rating, 0.0);
    }

    #[test]
    fn test_raw_review_rejects_non_text_payload() {
        let parsed = serde_json::from_value::<RawReview>(json!({ "text": 42 }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_report_field_names() {
        let mut report = AnalysisReport::default();
        report.sentiment_distribution.record(SentimentLabel::Positive);
        report.overall_sentiment = Some(OverallSentiment::VeryPositive);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["sentiment_distribution"]["Positive"], 1);
        assert_eq!(value["sentiment_distribution"]["Neutral"], 0);
        assert_eq!(value["overall_sentiment"], "Very Positive");
        assert!(value["detailed_analysis"].as_array().unwrap().is_empty());
    }
}
