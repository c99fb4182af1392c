use dotenv::dotenv;
use std::sync::Arc;
use tracing::info;

use review_sentiment::api::{self, AppState};
use review_sentiment::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    review_sentiment::init_tracing();

    let config = ServerConfig::from_env();
    let analyzer = review_sentiment::build_analyzer(&config);
    info!(
        "Sentiment backend: {} (max {} reviews per batch)",
        analyzer.classifier().model_name(),
        config.max_reviews
    );

    let state = Arc::new(AppState {
        analyzer: Arc::new(analyzer),
        data_dir: config.data_dir.clone(),
        max_reviews: config.max_reviews,
    });

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("🚀 Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
