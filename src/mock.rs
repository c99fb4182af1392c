//! Synthetic review generator, used when a retailer cannot be scraped.

use chrono::{Duration, Local};
use rand::prelude::*;
use rand::rngs::StdRng;
use tracing::info;

use crate::review::RawReview;

const POSITIVE_PHRASES: &[&str] = &[
    "This product exceeded my expectations. The quality is outstanding.",
    "I'm extremely satisfied with this purchase. It works perfectly.",
    "Best purchase I've made in a long time. Highly recommend!",
    "This is exactly what I was looking for. Great value for money.",
    "Excellent product that delivers on all its promises.",
    "I'm impressed with how well this works. Will buy again.",
    "The quality is much better than I expected for the price.",
    "This product has made my life so much easier. Love it!",
    "Fantastic product with great attention to detail.",
    "I've recommended this to all my friends. It's that good!",
    "Surprisingly good quality for the price point.",
    "This product is durable and well-designed. Very happy with it.",
    "The customer service was excellent when I had questions.",
    "This exceeded my expectations in every way possible.",
    "I use this product daily and it has held up wonderfully.",
];

const NEGATIVE_PHRASES: &[&str] = &[
    "Unfortunately, this product didn't meet my expectations.",
    "I'm disappointed with the quality. It feels cheaply made.",
    "This broke after just a few uses. Would not recommend.",
    "Save your money and look elsewhere. Not worth it.",
    "The description was misleading. Not what I expected at all.",
    "Poor quality control. Mine arrived with defects.",
    "This is overpriced for what you get. Not good value.",
    "I had high hopes but was let down by this product.",
    "Had to return this. It simply didn't work as advertised.",
    "The design has some serious flaws that make it frustrating to use.",
    "I regret this purchase and wouldn't buy it again.",
    "The product is much smaller/larger than it appears in photos.",
    "It worked for a week then completely stopped functioning.",
    "The materials feel cheap and I worry about longevity.",
    "This is the worst version of this product I've ever used.",
];

const NEUTRAL_PHRASES: &[&str] = &[
    "This product is okay. Nothing special but it works.",
    "It does the job, but I've seen better options out there.",
    "Average quality for the price. No complaints but not amazing.",
    "It's a decent product with some room for improvement.",
    "Some features are good, others could be better.",
    "It's exactly what you'd expect for this price point.",
    "The product works as described, but the design could be improved.",
    "It's functional but lacks some of the premium features of competitors.",
    "I have mixed feelings about this purchase.",
    "It's fine for occasional use but I wouldn't rely on it daily.",
    "Not bad, not great - just average in most respects.",
    "It serves its purpose but doesn't exceed expectations.",
    "The quality is acceptable but not impressive.",
    "It's a basic version that works but lacks extras.",
    "I'm neither disappointed nor impressed with this product.",
];

const NON_PRODUCT_PHRASES: &[&str] = &[
    "The shipping was extremely slow. Took weeks to arrive.",
    "Package arrived damaged but the seller quickly sent a replacement.",
    "The customer service was terrible when I had an issue.",
    "Delivery was faster than expected. Great service!",
    "The box was damaged but luckily the product inside was fine.",
    "Had issues with delivery but the company resolved it quickly.",
    "The packaging was excessive and not environmentally friendly.",
    "The product was left in the rain by the delivery person.",
    "Great communication from the seller throughout the process.",
    "The return process was simple and hassle-free.",
    "Shipping took longer than the estimated delivery date.",
    "The package was well protected and arrived in perfect condition.",
    "Had to contact customer service twice before my issue was resolved.",
    "The delivery person was very helpful and professional.",
    "The tracking information was inaccurate throughout shipping.",
];

const HAPPY_TITLES: &[&str] = &["Great product!", "Very satisfied", "Highly recommend", "Excellent purchase", "Love it!"];
const UNHAPPY_TITLES: &[&str] = &["Disappointed", "Not worth it", "Save your money", "Wouldn't recommend", "Regrettable purchase"];
const MIDDLING_TITLES: &[&str] = &["It's okay", "Decent product", "Average", "Not bad", "Does the job"];

#[derive(Debug, Clone, Copy, PartialEq)]
enum ReviewKind {
    Positive,
    Negative,
    Neutral,
    NonProduct,
}

impl ReviewKind {
    /// 50% positive, 30% negative, 10% neutral, 10% about shipping/service.
    fn roll<R: Rng>(rng: &mut R) -> Self {
        match rng.gen::<f64>() {
            x if x < 0.5 => ReviewKind::Positive,
            x if x < 0.8 => ReviewKind::Negative,
            x if x < 0.9 => ReviewKind::Neutral,
            _ => ReviewKind::NonProduct,
        }
    }

    fn phrases(self) -> &'static [&'static str] {
        match self {
            ReviewKind::Positive => POSITIVE_PHRASES,
            ReviewKind::Negative => NEGATIVE_PHRASES,
            ReviewKind::Neutral => NEUTRAL_PHRASES,
            ReviewKind::NonProduct => NON_PRODUCT_PHRASES,
        }
    }

    fn is_product_related(self) -> bool {
        self != ReviewKind::NonProduct
    }
}

/// Builds plausible review batches with a realistic sentiment mix.
pub struct MockReviewGenerator<R: Rng = StdRng> {
    rng: R,
}

impl MockReviewGenerator<StdRng> {
    pub fn new() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    /// Same seed, same reviews (dates aside, which are relative to today).
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl Default for MockReviewGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> MockReviewGenerator<R> {
    pub fn generate(&mut self, count: usize) -> Vec<RawReview> {
        let mut reviews: Vec<RawReview> = (0..count)
            .map(|_| {
                let kind = ReviewKind::roll(&mut self.rng);
                self.review_of_kind(kind)
            })
            .collect();

        reviews.shuffle(&mut self.rng);
        info!("🧪 Generated {} mock reviews", reviews.len());
        reviews
    }

    fn review_of_kind(&mut self, kind: ReviewKind) -> RawReview {
        let base = self.pick(kind.phrases());
        let rating = self.rating_for(kind);

        let text = if kind.is_product_related() && self.rng.gen_bool(0.3) {
            format!("{} {}", base, self.pick(kind.phrases()))
        } else if !kind.is_product_related() && self.rng.gen_bool(0.2) {
            let product_phrases = if rating >= 4.0 {
                POSITIVE_PHRASES
            } else if rating <= 2.0 {
                NEGATIVE_PHRASES
            } else {
                NEUTRAL_PHRASES
            };
            format!("{} As for the product itself: {}", base, self.pick(product_phrases))
        } else {
            base.to_string()
        };

        let days_ago = self.rng.gen_range(1..=365);
        let date = (Local::now() - Duration::days(days_ago)).format("%B %d, %Y").to_string();
        let title = self.title_for(&text, rating);
        let verified = self.rng.gen_bool(0.8);

        RawReview { text, rating, title, date, verified }
    }

    fn rating_for(&mut self, kind: ReviewKind) -> f64 {
        // (likely rating, its probability, the alternative)
        let (likely, p, other) = match kind {
            ReviewKind::Positive => (5.0, 0.7, 4.0),
            ReviewKind::Negative => (1.0, 0.7, 2.0),
            ReviewKind::Neutral => (3.0, 0.8, 4.0),
            ReviewKind::NonProduct => return self.rng.gen_range(1..=5) as f64,
        };
        if self.rng.gen_bool(p) {
            likely
        } else {
            other
        }
    }

    fn title_for(&mut self, text: &str, rating: f64) -> String {
        if self.rng.gen_bool(0.7) {
            let words: Vec<&str> = text.split_whitespace().collect();
            let len = self.rng.gen_range(3..=6).min(words.len());
            let mut title = words[..len].join(" ");
            if words.len() > len {
                title.push_str("...");
            }
            title
        } else {
            let titles = if rating >= 4.0 {
                HAPPY_TITLES
            } else if rating <= 2.0 {
                UNHAPPY_TITLES
            } else {
                MIDDLING_TITLES
            };
            self.pick(titles).to_string()
        }
    }

    fn pick(&mut self, items: &'static [&'static str]) -> &'static str {
        items.choose(&mut self.rng).copied().unwrap_or_default()
    }
}
