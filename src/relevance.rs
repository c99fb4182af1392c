//! Keyword heuristic separating product feedback from shipping/service complaints.

use crate::config::AnalyzerConfig;

#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    keywords: Vec<String>,
    min_keyword_hits: usize,
    max_keyword_density: f64,
}

impl Default for RelevanceFilter {
    fn default() -> Self {
        Self::new(&AnalyzerConfig::default())
    }
}

impl RelevanceFilter {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            keywords: config.shipping_keywords.iter().map(|k| k.to_lowercase()).collect(),
            min_keyword_hits: config.min_keyword_hits,
            max_keyword_density: config.max_keyword_density,
        }
    }

    /// Number of distinct keywords found as substrings of the lowercased text.
    pub fn keyword_hits(&self, text: &str) -> usize {
        let lowered = text.to_lowercase();
        self.keywords.iter().filter(|k| lowered.contains(k.as_str())).count()
    }

    /// A review is off-topic only when shipping vocabulary is both frequent
    /// in absolute terms and dense relative to its length.
    pub fn is_product_related(&self, text: &str) -> bool {
        let word_count = text.split_whitespace().count();
        if word_count == 0 {
            return true;
        }

        let hits = self.keyword_hits(text);
        let density = hits as f64 / word_count as f64;
        !(hits >= self.min_keyword_hits && density > self.max_keyword_density)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filler(words: usize) -> String {
        vec!["sturdy"; words].join(" ")
    }

    #[test]
    fn test_no_keywords_is_product_related() {
        let f = RelevanceFilter::default();
        assert!(f.is_product_related("Excellent blender, crushes ice easily."));
        assert!(f.is_product_related(&filler(500)));
    }

    #[test]
    fn test_dense_shipping_text_is_not_product_related() {
        let f = RelevanceFilter::default();
        assert_eq!(f.keyword_hits("shipping delivery arrived"), 3);
        assert!(!f.is_product_related("shipping delivery arrived"));
    }

    #[test]
    fn test_two_keywords_in_long_review_stay_product_related() {
        let f = RelevanceFilter::default();
        let text = format!("{} shipping delivery", filler(198));
        assert_eq!(text.split_whitespace().count(), 200);
        assert_eq!(f.keyword_hits(&text), 2);
        assert!(f.is_product_related(&text));
    }

    #[test]
    fn test_single_keyword_never_filters() {
        let f = RelevanceFilter::default();
        assert!(f.is_product_related("Shipping."));
    }

    #[test]
    fn test_keywords_are_case_insensitive_and_multiword() {
        let f = RelevanceFilter::default();
        assert_eq!(f.keyword_hits("CUSTOMER SERVICE was rude, REFUND denied"), 2);
        assert!(!f.is_product_related("CUSTOMER SERVICE was rude, REFUND denied"));
    }

    #[test]
    fn test_keyword_counted_once_per_text() {
        let f = RelevanceFilter::default();
        assert_eq!(f.keyword_hits("late late late"), 1);
        assert!(f.is_product_related("late late late"));
    }

    #[test]
    fn test_substring_matching() {
        // "boxes" contains "box", "returned" contains "return"
        let f = RelevanceFilter::default();
        assert_eq!(f.keyword_hits("boxes returned"), 2);
    }

    #[test]
    fn test_blank_text_is_product_related() {
        let f = RelevanceFilter::default();
        assert!(f.is_product_related(""));
        assert!(f.is_product_related("  \t\n "));
    }
}
