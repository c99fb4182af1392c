//! Batch review analysis.
//!
//! [`ReviewAnalyzer::analyze`] walks a batch strictly in order. For every
//! review with text it runs relevance filtering, sentiment classification
//! and summarization, then folds the result into running totals. A single
//! derivation step at the end turns the totals into the report's aggregate
//! metrics and narrative.
//!
//! A model failure aborts the batch. A review the classifier rejects as
//! unusable text is logged and skipped.

use tracing::{debug, info, warn};

use crate::classifier::TextClassifier;
use crate::config::{AnalyzerConfig, ScoreBands};
use crate::error::{AnalysisError, Result};
use crate::ml::SentimentModel;
use crate::relevance::RelevanceFilter;
use crate::review::{AnalysisReport, AnalyzedReview, OverallSentiment, RawReview};
use crate::summarizer::summarize;

/// Snapshot handed to a [`ProgressObserver`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Input records consumed so far, skipped ones included.
    pub seen: usize,
    /// Records that went through the full pipeline.
    pub processed: usize,
    pub total: usize,
}

pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, progress: Progress);
}

/// Default observer: progress lines through `tracing`.
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_progress(&self, p: Progress) {
        info!("🧠 Analyzed {}/{} reviews ({} kept)", p.seen, p.total, p.processed);
    }
}

impl<F> ProgressObserver for F
where
    F: Fn(Progress) + Send + Sync,
{
    fn on_progress(&self, progress: Progress) {
        self(progress)
    }
}

pub struct ReviewAnalyzer {
    classifier: TextClassifier,
    relevance: RelevanceFilter,
    config: AnalyzerConfig,
    observer: Box<dyn ProgressObserver>,
}

/// Running totals of one batch pass.
#[derive(Default)]
struct Accumulator {
    report: AnalysisReport,
    total_rating: f64,
    total_positive: f64,
    total_negative: f64,
}

impl ReviewAnalyzer {
    pub fn new(model: Box<dyn SentimentModel>, config: AnalyzerConfig) -> Self {
        Self {
            classifier: TextClassifier::new(model, &config),
            relevance: RelevanceFilter::new(&config),
            config,
            observer: Box::new(LogProgress),
        }
    }

    pub fn with_observer(mut self, observer: impl ProgressObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn classifier(&self) -> &TextClassifier {
        &self.classifier
    }

    pub fn analyze(&self, reviews: &[RawReview]) -> Result<AnalysisReport> {
        if reviews.is_empty() {
            return Err(AnalysisError::EmptyBatch);
        }

        info!(
            "Analyzing {} reviews with the '{}' model...",
            reviews.len(),
            self.classifier.model_name()
        );

        let mut acc = Accumulator::default();
        let total = reviews.len();

        for (index, review) in reviews.iter().enumerate() {
            self.process_review(index, review, &mut acc)?;

            let seen = index + 1;
            let interval = self.config.progress_interval;
            if interval > 0 && seen % interval == 0 && seen < total {
                self.observer.on_progress(Progress {
                    seen,
                    processed: acc.report.total_reviews,
                    total,
                });
            }
        }
        self.observer.on_progress(Progress {
            seen: total,
            processed: acc.report.total_reviews,
            total,
        });

        let mut report = acc.finish(&self.config.score_bands);
        report.overall_summary = build_narrative(&report);
        Ok(report)
    }

    fn process_review(&self, index: usize, review: &RawReview, acc: &mut Accumulator) -> Result<()> {
        let text = review.text.as_str();
        if text.trim().is_empty() {
            debug!("Skipping review #{}: no text", index);
            acc.report.skipped_reviews += 1;
            return Ok(());
        }

        let product_related = self.relevance.is_product_related(text);

        let sentiment = match self.classifier.classify(text) {
            Ok(sentiment) => sentiment,
            Err(AnalysisError::InvalidInput { reason }) => {
                warn!("Skipping review #{}: {}", index, reason);
                acc.report.skipped_reviews += 1;
                return Ok(());
            }
            Err(e) => return Err(e.at_review(index)),
        };

        let summary = summarize(text, self.config.summary_max_words);

        let report = &mut acc.report;
        report.total_reviews += 1;
        if product_related {
            report.product_related += 1;
        } else {
            report.non_product_related += 1;
        }
        report.sentiment_distribution.record(sentiment.label);
        report.detailed_analysis.push(AnalyzedReview {
            rating: review.rating,
            sentiment: sentiment.label,
            confidence: sentiment.confidence,
            product_related,
            summary,
            review_title: review.title.clone(),
            review_date: review.date.clone(),
        });

        acc.total_rating += review.rating;
        acc.total_positive += sentiment.positive_score;
        acc.total_negative += sentiment.negative_score;
        Ok(())
    }
}

impl Accumulator {
    fn finish(self, bands: &ScoreBands) -> AnalysisReport {
        let mut report = self.report;
        let n = report.total_reviews;
        if n == 0 {
            return report;
        }

        let n = n as f64;
        report.average_rating = self.total_rating / n;
        let avg_positive = self.total_positive / n;
        debug!(
            "Average scores: positive {:.3}, negative {:.3}",
            avg_positive,
            self.total_negative / n
        );

        report.overall_sentiment_score = sentiment_score(avg_positive);
        report.overall_sentiment = Some(overall_sentiment(report.overall_sentiment_score, bands));
        report
    }
}

/// 0-100 score from the mean positive probability, truncated rather than rounded.
pub fn sentiment_score(avg_positive: f64) -> u32 {
    (avg_positive * 100.0).floor().clamp(0.0, 100.0) as u32
}

pub fn overall_sentiment(score: u32, bands: &ScoreBands) -> OverallSentiment {
    if score >= bands.very_positive {
        OverallSentiment::VeryPositive
    } else if score >= bands.positive {
        OverallSentiment::Positive
    } else if score >= bands.neutral {
        OverallSentiment::Neutral
    } else if score >= bands.negative {
        OverallSentiment::Negative
    } else {
        OverallSentiment::VeryNegative
    }
}

/// Human-readable paragraph describing a finished report.
pub fn build_narrative(report: &AnalysisReport) -> String {
    let total = report.total_reviews;
    if total == 0 {
        return "No reviews to analyze.".to_string();
    }

    let percent = |count: usize| count as f64 / total as f64 * 100.0;
    let dist = &report.sentiment_distribution;
    let product_related_percent = percent(report.product_related);

    format!(
        "Analysis of {} reviews shows {:.1}% positive, {:.1}% negative, and {:.1}% neutral sentiment. \
         Average rating is {:.1}/5. \
         {:.1}% of reviews are product-related, while {:.1}% discuss shipping, service, or other non-product aspects.",
        total,
        percent(dist.positive),
        percent(dist.negative),
        percent(dist.neutral),
        report.average_rating,
        product_related_percent,
        100.0 - product_related_percent,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::LexiconModel;
    use crate::review::SentimentLabel;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Scores texts from a lookup table; unknown texts get flat logits.
    struct ScriptedModel {
        logits: HashMap<String, [f64; 2]>,
        fail_on: Option<String>,
    }

    impl ScriptedModel {
        fn new(entries: &[(&str, [f64; 2])]) -> Self {
            Self {
                logits: entries.iter().map(|(t, l)| (t.to_string(), *l)).collect(),
                fail_on: None,
            }
        }
    }

    impl SentimentModel for ScriptedModel {
        fn name(&self) -> &str {
            "scripted"
        }

        fn logits(&self, text: &str) -> anyhow::Result<[f64; 2]> {
            if self.fail_on.as_deref() == Some(text) {
                anyhow::bail!("device lost");
            }
            Ok(self.logits.get(text).copied().unwrap_or([0.0, 0.0]))
        }
    }

    /// Logits whose softmax gives exactly `p` for the positive class.
    fn logits_for(p: f64) -> [f64; 2] {
        [0.0, (p / (1.0 - p)).ln()]
    }

    fn analyzer(model: ScriptedModel) -> ReviewAnalyzer {
        ReviewAnalyzer::new(Box::new(model), AnalyzerConfig::default())
    }

    fn review(text: &str, rating: f64) -> RawReview {
        RawReview::new(text, rating)
    }

    #[test]
    fn test_empty_batch_is_an_error() {
        let a = analyzer(ScriptedModel::new(&[]));
        assert_eq!(a.analyze(&[]), Err(AnalysisError::EmptyBatch));
    }

    #[test]
    fn test_blank_reviews_are_skipped() {
        let a = analyzer(ScriptedModel::new(&[("Great product!", [-3.0, 3.0])]));
        let report = a
            .analyze(&[review("", 5.0), review("Great product!", 5.0)])
            .unwrap();

        assert_eq!(report.total_reviews, 1);
        assert_eq!(report.skipped_reviews, 1);
        assert_eq!(report.average_rating, 5.0);
        assert_eq!(report.detailed_analysis.len(), 1);
        assert_eq!(report.sentiment_distribution.positive, 1);
    }

    #[test]
    fn test_all_blank_reviews_leave_defaults() {
        let a = analyzer(ScriptedModel::new(&[]));
        let report = a.analyze(&[review("", 4.0), review("   ", 2.0)]).unwrap();

        assert_eq!(report.total_reviews, 0);
        assert_eq!(report.skipped_reviews, 2);
        assert_eq!(report.average_rating, 0.0);
        assert_eq!(report.overall_sentiment_score, 0);
        assert_eq!(report.overall_sentiment, None);
        assert_eq!(report.overall_summary, "No reviews to analyze.");
    }

    #[test]
    fn test_detailed_analysis_preserves_order_and_metadata() {
        let a = analyzer(ScriptedModel::new(&[
            ("Love it.", [-2.0, 2.0]),
            ("Hate it.", [2.0, -2.0]),
            ("It exists.", [0.0, 0.0]),
        ]));
        let mut first = review("Love it.", 5.0);
        first.title = "Five stars".to_string();
        first.date = "March 02, 2024".to_string();

        let report = a
            .analyze(&[first, review("Hate it.", 1.0), review("It exists.", 3.0)])
            .unwrap();

        let labels: Vec<_> = report.detailed_analysis.iter().map(|r| r.sentiment).collect();
        assert_eq!(
            labels,
            vec![SentimentLabel::Positive, SentimentLabel::Negative, SentimentLabel::Neutral]
        );
        let first = &report.detailed_analysis[0];
        assert_eq!(first.review_title, "Five stars");
        assert_eq!(first.review_date, "March 02, 2024");
        assert_eq!(first.summary, "Love it.");
        assert!(first.product_related);
        assert_eq!(report.average_rating, 3.0);
    }

    #[test]
    fn test_score_truncates_instead_of_rounding() {
        assert_eq!(sentiment_score(0.749), 74);
        assert_eq!(sentiment_score(0.7499999), 74);
        assert_eq!(sentiment_score(1.0), 100);
        assert_eq!(sentiment_score(0.0), 0);

        let bands = ScoreBands::default();
        assert_eq!(overall_sentiment(74, &bands), OverallSentiment::Positive);
        assert_eq!(overall_sentiment(75, &bands), OverallSentiment::VeryPositive);
    }

    #[test]
    fn test_category_bands() {
        let bands = ScoreBands::default();
        assert_eq!(overall_sentiment(100, &bands), OverallSentiment::VeryPositive);
        assert_eq!(overall_sentiment(60, &bands), OverallSentiment::Positive);
        assert_eq!(overall_sentiment(59, &bands), OverallSentiment::Neutral);
        assert_eq!(overall_sentiment(40, &bands), OverallSentiment::Neutral);
        assert_eq!(overall_sentiment(39, &bands), OverallSentiment::Negative);
        assert_eq!(overall_sentiment(25, &bands), OverallSentiment::Negative);
        assert_eq!(overall_sentiment(24, &bands), OverallSentiment::VeryNegative);
    }

    #[test]
    fn test_overall_score_uses_mean_positive_probability() {
        let a = analyzer(ScriptedModel::new(&[
            ("first", logits_for(0.9)),
            ("second", logits_for(0.6)),
        ]));
        let report = a.analyze(&[review("first", 5.0), review("second", 3.0)]).unwrap();

        // mean positive is 0.75 up to float error
        assert!(report.overall_sentiment_score == 74 || report.overall_sentiment_score == 75);
        assert_eq!(report.sentiment_distribution.positive, 1);
        assert_eq!(report.sentiment_distribution.neutral, 1);
    }

    #[test]
    fn test_model_failure_aborts_batch_with_index() {
        let mut model = ScriptedModel::new(&[]);
        model.fail_on = Some("boom".to_string());
        let a = analyzer(model);

        let err = a
            .analyze(&[review("fine", 4.0), review("", 1.0), review("boom", 2.0)])
            .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::ModelInference { index: Some(2), message: "device lost".to_string() }
        );
    }

    #[test]
    fn test_relevance_counts() {
        let a = analyzer(ScriptedModel::new(&[]));
        let report = a
            .analyze(&[
                review("Shipping was slow and the delivery arrived late.", 2.0),
                review("The blender is powerful.", 5.0),
            ])
            .unwrap();
        assert_eq!(report.product_related, 1);
        assert_eq!(report.non_product_related, 1);
        assert!(!report.detailed_analysis[0].product_related);
    }

    #[test]
    fn test_narrative_template() {
        let a = analyzer(ScriptedModel::new(&[
            ("good one", [-2.0, 2.0]),
            ("bad one", [2.0, -2.0]),
            ("meh", [0.0, 0.0]),
            ("shipping delivery arrived", [0.0, 0.0]),
        ]));
        let report = a
            .analyze(&[
                review("good one", 5.0),
                review("bad one", 1.0),
                review("meh", 3.0),
                review("shipping delivery arrived", 3.0),
            ])
            .unwrap();

        assert_eq!(
            report.overall_summary,
            "Analysis of 4 reviews shows 25.0% positive, 25.0% negative, and 50.0% neutral sentiment. \
             Average rating is 3.0/5. \
             75.0% of reviews are product-related, while 25.0% discuss shipping, service, or other non-product aspects."
        );
    }

    #[test]
    fn test_analyze_is_idempotent() {
        let a = ReviewAnalyzer::new(Box::new(LexiconModel::new()), AnalyzerConfig::default());
        let batch = vec![
            review("Excellent product that delivers on all its promises.", 5.0),
            review("This broke after just a few uses. Would not recommend.", 1.0),
            review("", 3.0),
            review("The shipping was extremely slow. Took weeks to arrive.", 2.0),
        ];
        assert_eq!(a.analyze(&batch).unwrap(), a.analyze(&batch).unwrap());
    }

    #[test]
    fn test_progress_observer_is_called() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = calls.clone();
        let config = AnalyzerConfig { progress_interval: 2, ..AnalyzerConfig::default() };
        let a = ReviewAnalyzer::new(Box::new(ScriptedModel::new(&[])), config)
            .with_observer(move |p: Progress| sink.lock().unwrap().push(p));

        let batch: Vec<_> = ["a", "", "c", "d", "e"].iter().map(|t| review(t, 3.0)).collect();
        a.analyze(&batch).unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                Progress { seen: 2, processed: 1, total: 5 },
                Progress { seen: 4, processed: 3, total: 5 },
                Progress { seen: 5, processed: 4, total: 5 },
            ]
        );
    }
}
