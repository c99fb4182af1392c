//! HTTP surface: product URL in, sentiment report out.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::analyzer::ReviewAnalyzer;
use crate::crawler;
use crate::error::AnalysisError;
use crate::review::{
    AnalysisReport, AnalyzedReview, OverallSentiment, RawReview, SentimentDistribution, SentimentLabel,
};
use crate::storage;

pub struct AppState {
    pub analyzer: Arc<ReviewAnalyzer>,
    pub data_dir: PathBuf,
    pub max_reviews: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    /// Amazon or Walmart product page.
    pub product_url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult = Result<Json<AnalysisReport>, ApiError>;

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: message.into() }))
}

#[derive(OpenApi)]
#[openapi(
    paths(analyze_product, analyze_reviews, status),
    components(
        schemas(
            AnalyzeRequest,
            ErrorResponse,
            StatusResponse,
            RawReview,
            AnalysisReport,
            AnalyzedReview,
            SentimentDistribution,
            SentimentLabel,
            OverallSentiment
        )
    ),
    tags(
        (name = "analysis", description = "Review Sentiment Analysis API")
    )
)]
pub struct ApiDoc;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/analyze", post(analyze_product))
        .route("/analyze/reviews", post(analyze_reviews))
        .route("/status", get(status))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn is_supported_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains("amazon") || lower.contains("walmart")
}

/// Crawl a product's reviews and analyze them
#[utoipa::path(
    post,
    path = "/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Sentiment report", body = AnalysisReport),
        (status = 400, description = "Unsupported URL or no reviews", body = ErrorResponse),
        (status = 500, description = "Analysis failed", body = ErrorResponse)
    ),
    tag = "analysis"
)]
pub async fn analyze_product(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AnalyzeRequest>,
) -> ApiResult {
    let product_url = payload.product_url.trim();
    if product_url.is_empty() || !is_supported_url(product_url) {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Please provide a valid Amazon or Walmart product URL",
        ));
    }

    let reviews = crawler::fetch_reviews(product_url, state.max_reviews).await;
    if reviews.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Could not retrieve reviews from the provided URL",
        ));
    }

    let product_id = storage::product_id_from_url(product_url);
    if let Err(e) = storage::save_reviews(&state.data_dir, &product_id, &reviews).await {
        warn!("⚠️ Could not save raw reviews: {:#}", e);
    }

    run_analysis(&state, reviews).await
}

/// Analyze a batch of reviews supplied by the caller
#[utoipa::path(
    post,
    path = "/analyze/reviews",
    request_body = Vec<RawReview>,
    responses(
        (status = 200, description = "Sentiment report", body = AnalysisReport),
        (status = 400, description = "Empty batch", body = ErrorResponse),
        (status = 500, description = "Analysis failed", body = ErrorResponse)
    ),
    tag = "analysis"
)]
pub async fn analyze_reviews(
    State(state): State<Arc<AppState>>,
    Json(reviews): Json<Vec<RawReview>>,
) -> ApiResult {
    run_analysis(&state, reviews).await
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/status",
    responses((status = 200, description = "Server is up", body = StatusResponse)),
    tag = "analysis"
)]
pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse { status: "ok".to_string() })
}

/// Inference is blocking, so the batch runs on the blocking pool.
async fn run_analysis(state: &AppState, reviews: Vec<RawReview>) -> ApiResult {
    let analyzer = state.analyzer.clone();
    let outcome = tokio::task::spawn_blocking(move || analyzer.analyze(&reviews))
        .await
        .map_err(|e| {
            error!("❌ Analysis task panicked: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Analysis task failed")
        })?;

    match outcome {
        Ok(report) => {
            info!(
                "✅ Report ready: {} reviews, overall {} ({})",
                report.total_reviews,
                report.overall_sentiment.map(|s| s.to_string()).unwrap_or_else(|| "n/a".to_string()),
                report.overall_sentiment_score
            );
            Ok(Json(report))
        }
        Err(AnalysisError::EmptyBatch) => {
            Err(api_error(StatusCode::BAD_REQUEST, AnalysisError::EmptyBatch.to_string()))
        }
        Err(e) => {
            error!("❌ Analysis failed: {}", e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;
    use crate::ml::{LexiconModel, SentimentModel};

    struct BrokenModel;

    impl SentimentModel for BrokenModel {
        fn name(&self) -> &str {
            "broken"
        }

        fn logits(&self, _text: &str) -> anyhow::Result<[f64; 2]> {
            anyhow::bail!("sidecar unreachable")
        }
    }

    fn state_with(model: Box<dyn SentimentModel>) -> Arc<AppState> {
        Arc::new(AppState {
            analyzer: Arc::new(ReviewAnalyzer::new(model, AnalyzerConfig::default())),
            data_dir: std::env::temp_dir().join("review-sentiment-api-test"),
            max_reviews: 20,
        })
    }

    #[tokio::test]
    async fn test_status() {
        let Json(body) = status().await;
        assert_eq!(body.status, "ok");
    }

    #[tokio::test]
    async fn test_rejects_unsupported_url() {
        let state = state_with(Box::new(LexiconModel::new()));
        let request = AnalyzeRequest { product_url: "https://www.ebay.com/itm/123".to_string() };

        let (code, Json(body)) = analyze_product(State(state), Json(request)).await.unwrap_err();
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Please provide a valid Amazon or Walmart product URL");
    }

    #[tokio::test]
    async fn test_analyze_supplied_reviews() {
        let state = state_with(Box::new(LexiconModel::new()));
        let reviews = vec![
            RawReview::new("Excellent product that delivers on all its promises.", 5.0),
            RawReview::new("", 1.0),
            RawReview::new("This broke after just a few uses. Would not recommend.", 1.0),
        ];

        let Json(report) = analyze_reviews(State(state), Json(reviews)).await.unwrap();
        assert_eq!(report.total_reviews, 2);
        assert_eq!(report.skipped_reviews, 1);
        assert_eq!(report.average_rating, 3.0);
        assert_eq!(report.detailed_analysis.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_batch_is_bad_request() {
        let state = state_with(Box::new(LexiconModel::new()));
        let (code, Json(body)) = analyze_reviews(State(state), Json(vec![])).await.unwrap_err();
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "No reviews to analyze");
    }

    #[tokio::test]
    async fn test_model_failure_is_server_error() {
        let state = state_with(Box::new(BrokenModel));
        let (code, Json(body)) = analyze_reviews(State(state), Json(vec![RawReview::new("fine", 4.0)]))
            .await
            .unwrap_err();
        assert_eq!(code, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.error.contains("review #0"));
    }

    #[test]
    fn test_supported_urls() {
        assert!(is_supported_url("https://www.Amazon.com/dp/B1"));
        assert!(is_supported_url("https://www.walmart.com/ip/1"));
        assert!(!is_supported_url("https://www.target.com/p/1"));
    }
}
