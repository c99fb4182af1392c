use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::mock::MockReviewGenerator;
use crate::review::{rating_or_zero, RawReview};

static USER_AGENTS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:124.0) Gecko/20100101 Firefox/124.0",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:124.0) Gecko/20100101 Firefox/124.0",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Edge/123.0.0.0 Safari/537.36",
    ]
});

static FIRST_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d[\d,]*(\.\d+)?").unwrap());

// Amazon review page selectors
static REVIEW_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("div[data-hook='review']").unwrap());
static STAR_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("i[data-hook='review-star-rating']").unwrap());
static STAR_FALLBACK_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("i.a-icon-star").unwrap());
static TITLE_SEL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a[data-hook='review-title'], span[data-hook='review-title']").unwrap()
});
static DATE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("span[data-hook='review-date']").unwrap());
static BODY_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("span[data-hook='review-body']").unwrap());
static VERIFIED_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("span[data-hook='avp-badge']").unwrap());
static COUNT_SEL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div[data-hook='cr-filter-info-review-rating-count']").unwrap()
});
static NO_REVIEWS_SEL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div.a-row.a-spacing-medium.a-spacing-top-large > span").unwrap()
});

const REVIEWS_PER_PAGE: usize = 10;
const MAX_PAGES: usize = 50;

fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36")
}

fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .context("failed to build HTTP client")
}

/// Retailer a product URL belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Retailer {
    Amazon,
    Walmart,
}

impl Retailer {
    /// Unknown hosts are treated as Amazon, which then falls back to mock data.
    pub fn for_url(url: &str) -> Self {
        let lower = url.to_lowercase();
        if lower.contains("walmart") {
            Retailer::Walmart
        } else {
            if !lower.contains("amazon") {
                warn!("Unsupported URL: {}. Using Amazon crawler with mock data.", url);
            }
            Retailer::Amazon
        }
    }
}

/// Collect up to `max_reviews` reviews for a product page.
///
/// Never fails: every scraping problem degrades to a generated batch so the
/// analysis pipeline always has something to work on.
pub async fn fetch_reviews(product_url: &str, max_reviews: usize) -> Vec<RawReview> {
    let scraped = match Retailer::for_url(product_url) {
        Retailer::Amazon => crawl_amazon(product_url, max_reviews).await,
        Retailer::Walmart => crawl_walmart(product_url, max_reviews).await,
    };

    match scraped {
        Ok(reviews) if !reviews.is_empty() => reviews,
        Ok(_) => {
            warn!("⚠️ No reviews were successfully crawled. Generating mock reviews instead.");
            MockReviewGenerator::new().generate(max_reviews)
        }
        Err(e) => {
            warn!("⚠️ Error crawling reviews: {:#}. Generating mock reviews instead.", e);
            MockReviewGenerator::new().generate(max_reviews)
        }
    }
}

// ============================================================================
// Amazon
// ============================================================================

/// ASIN from `/dp/<id>` or `/product/<id>` URLs.
pub fn amazon_product_id(url: &str) -> Option<String> {
    ["/dp/", "/product/"].iter().find_map(|marker| {
        let rest = url.split_once(marker)?.1;
        let id = rest.split(|c| c == '/' || c == '?').next()?;
        (!id.is_empty()).then(|| id.to_string())
    })
}

pub fn amazon_reviews_url(product_id: &str) -> String {
    format!(
        "https://www.amazon.com/product-reviews/{}/ref=cm_cr_dp_d_show_all_btm?ie=UTF8&reviewerType=all_reviews",
        product_id
    )
}

fn is_blocked(status: reqwest::StatusCode, body: &str) -> bool {
    !status.is_success() || body.to_lowercase().contains("captcha")
}

async fn crawl_amazon(product_url: &str, max_reviews: usize) -> Result<Vec<RawReview>> {
    info!("🔎 Crawling Amazon reviews for: {}", product_url);
    if !product_url.to_lowercase().contains("amazon") {
        anyhow::bail!("Not an Amazon URL");
    }
    let product_id = amazon_product_id(product_url)
        .ok_or_else(|| anyhow::anyhow!("Could not extract product ID from URL"))?;
    let reviews_url = amazon_reviews_url(&product_id);
    let client = http_client()?;

    let (status, html) = fetch_page(&client, &reviews_url).await?;
    if is_blocked(status, &html) {
        anyhow::bail!("Access to Amazon reviews blocked ({})", status);
    }

    let (first_page, total_reviews) = {
        let document = Html::parse_document(&html);
        if has_no_reviews_notice(&document) {
            anyhow::bail!("No reviews found for this product");
        }
        let total = parse_total_reviews(&document)
            .ok_or_else(|| anyhow::anyhow!("Could not determine total number of reviews"))?;
        (parse_amazon_reviews(&document), total)
    };
    info!("Total reviews: {}", total_reviews);

    let pages = (max_reviews / REVIEWS_PER_PAGE)
        .min(total_reviews / REVIEWS_PER_PAGE + 1)
        .min(MAX_PAGES);
    info!("Will crawl {} pages of reviews", pages);

    let mut all_reviews = first_page;
    for page in 2..=pages {
        let delay_ms = rand::thread_rng().gen_range(1000..3000);
        sleep(Duration::from_millis(delay_ms)).await;

        let page_url = format!("{}&pageNumber={}", reviews_url, page);
        let (status, html) = match fetch_page(&client, &page_url).await {
            Ok(page) => page,
            Err(e) => {
                warn!("❌ Error crawling page {}: {:#}", page, e);
                break;
            }
        };
        if is_blocked(status, &html) {
            warn!("Blocked after page {}. Using reviews collected so far.", page - 1);
            break;
        }

        let page_reviews = parse_amazon_reviews(&Html::parse_document(&html));
        if page_reviews.is_empty() {
            info!("No reviews found on page {}. Moving on.", page);
            continue;
        }
        all_reviews.extend(page_reviews);
        if all_reviews.len() >= max_reviews {
            break;
        }
    }

    info!("✅ Successfully crawled {} reviews", all_reviews.len());
    Ok(all_reviews)
}

async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<(reqwest::StatusCode, String)> {
    let resp = client
        .get(url)
        .header("User-Agent", random_user_agent())
        .header("Accept-Language", "en-US,en;q=0.9")
        .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8")
        .send()
        .await?;
    let status = resp.status();
    let body = resp.text().await?;
    Ok((status, body))
}

fn has_no_reviews_notice(document: &Html) -> bool {
    document
        .select(&NO_REVIEWS_SEL)
        .any(|el| element_text(&el).contains("There are no customer reviews yet"))
}

/// "1,234 total ratings | 567 with reviews" -> 567
pub fn parse_total_reviews(document: &Html) -> Option<usize> {
    let text = document.select(&COUNT_SEL).next().map(|el| element_text(&el))?;
    let segment = text.split('|').nth(1)?;
    let number = FIRST_NUMBER.find(segment)?.as_str().replace(',', "");
    number.parse().ok()
}

pub fn parse_amazon_reviews(document: &Html) -> Vec<RawReview> {
    document
        .select(&REVIEW_SEL)
        .filter_map(|div| {
            let stars = div
                .select(&STAR_SEL)
                .next()
                .or_else(|| div.select(&STAR_FALLBACK_SEL).next())?;
            // "4.0 out of 5 stars"
            let rating: f64 = FIRST_NUMBER.find(&element_text(&stars))?.as_str().parse().ok()?;

            let field = |sel: &Selector| div.select(sel).next().map(|e| element_text(&e)).unwrap_or_default();
            Some(RawReview {
                rating,
                title: field(&TITLE_SEL),
                date: field(&DATE_SEL),
                text: field(&BODY_SEL),
                verified: div.select(&VERIFIED_SEL).next().is_some(),
            })
        })
        .collect()
}

fn element_text(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

// ============================================================================
// Walmart
// ============================================================================

/// Item id from `/ip/<slug-or-id>`; a numeric `id=` query parameter wins over a slug.
pub fn walmart_product_id(url: &str) -> Option<String> {
    let rest = url.split_once("/ip/")?.1;
    let id = rest.split(|c| c == '/' || c == '?').next().filter(|s| !s.is_empty())?;
    if id.chars().all(|c| c.is_ascii_digit()) {
        return Some(id.to_string());
    }

    let query_id = url
        .split_once('?')
        .and_then(|(_, query)| query.split('&').find_map(|p| p.strip_prefix("id=")))
        .filter(|v| !v.is_empty());
    Some(query_id.unwrap_or(id).to_string())
}

pub fn walmart_reviews_url(product_id: &str, max_reviews: usize) -> String {
    format!(
        "https://www.walmart.com/reviews/api/product/{}?limit={}&page=1&sort=submission-desc&filters=&showProduct=false",
        product_id, max_reviews
    )
}

#[derive(Debug, Deserialize)]
struct WalmartResponse {
    #[serde(default)]
    reviews: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WalmartReview {
    #[serde(default, deserialize_with = "rating_or_zero")]
    rating: f64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    review_text: Option<String>,
    #[serde(default)]
    submission_date: Option<serde_json::Value>,
    #[serde(default)]
    verified_purchase: bool,
}

impl From<WalmartReview> for RawReview {
    fn from(r: WalmartReview) -> Self {
        RawReview {
            text: r.review_text.unwrap_or_default(),
            rating: r.rating,
            title: r.title.unwrap_or_default(),
            date: r.submission_date.map(|d| format_submission_date(&d)).unwrap_or_default(),
            verified: r.verified_purchase,
        }
    }
}

/// Millisecond timestamps (number or digit string) become "March 05, 2024"; anything else passes through.
fn format_submission_date(value: &serde_json::Value) -> String {
    let millis = match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) => s.parse().ok(),
        serde_json::Value::String(s) => return s.clone(),
        _ => None,
    };

    millis
        .and_then(|ms| Local.timestamp_millis_opt(ms).single())
        .map(|dt| dt.format("%B %d, %Y").to_string())
        .unwrap_or_default()
}

pub fn parse_walmart_reviews(body: &str) -> Result<Vec<RawReview>> {
    let data: WalmartResponse =
        serde_json::from_str(body).context("Failed to parse Walmart reviews JSON")?;
    let reviews = data
        .reviews
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value::<WalmartReview>(value) {
            Ok(review) => Some(RawReview::from(review)),
            Err(e) => {
                warn!("Error extracting Walmart review #{}: {}", i, e);
                None
            }
        })
        .collect();
    Ok(reviews)
}

async fn crawl_walmart(product_url: &str, max_reviews: usize) -> Result<Vec<RawReview>> {
    info!("🔎 Crawling Walmart reviews for: {}", product_url);
    let product_id = walmart_product_id(product_url)
        .ok_or_else(|| anyhow::anyhow!("Could not extract product ID from URL"))?;

    let resp = http_client()?
        .get(walmart_reviews_url(&product_id, max_reviews))
        .header("User-Agent", random_user_agent())
        .header("Accept", "application/json")
        .header("Accept-Language", "en-US,en;q=0.9")
        .header("Referer", product_url)
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        anyhow::bail!("Failed to access Walmart reviews API (status code: {})", status);
    }

    let reviews = parse_walmart_reviews(&resp.text().await?)?;
    info!("✅ Successfully crawled {} reviews from Walmart", reviews.len());
    Ok(reviews)
}
