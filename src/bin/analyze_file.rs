//! Offline analysis: `analyze_file <reviews.json>` or `analyze_file --mock <count>`.

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::path::PathBuf;

use review_sentiment::config::ServerConfig;
use review_sentiment::mock::MockReviewGenerator;
use review_sentiment::storage;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    review_sentiment::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let reviews = match args.as_slice() {
        [flag, count] if flag == "--mock" => {
            let count: usize = count.parse().context("--mock expects a review count")?;
            MockReviewGenerator::new().generate(count)
        }
        [path] => storage::load_reviews(&PathBuf::from(path)).await?,
        _ => anyhow::bail!("usage: analyze_file <reviews.json> | --mock <count>"),
    };

    let config = ServerConfig::from_env();
    let analyzer = review_sentiment::build_analyzer(&config);
    let report = tokio::task::spawn_blocking(move || analyzer.analyze(&reviews)).await??;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
