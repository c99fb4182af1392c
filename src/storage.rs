use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::review::RawReview;

/// File-name-safe identifier for a product URL.
///
/// Amazon URLs use the ASIN after `/dp/`; anything else uses the last path
/// segment without its query string.
pub fn product_id_from_url(url: &str) -> String {
    let raw = match url.split_once("/dp/") {
        Some((_, rest)) => rest.split('/').next().unwrap_or_default(),
        None => {
            let last = url.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
            last.split('?').next().unwrap_or_default()
        }
    };

    let id: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if id.is_empty() {
        "product".to_string()
    } else {
        id
    }
}

/// Write the raw batch to `<data_dir>/<product_id>_reviews.json` as a flat JSON list.
pub async fn save_reviews(data_dir: &Path, product_id: &str, reviews: &[RawReview]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(data_dir)
        .await
        .with_context(|| format!("failed to create {}", data_dir.display()))?;

    let path = data_dir.join(format!("{}_reviews.json", product_id));
    let json = serde_json::to_string_pretty(reviews)?;
    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    info!("💾 Saved {} reviews to {}", reviews.len(), path.display());
    Ok(path)
}

pub async fn load_reviews(path: &Path) -> Result<Vec<RawReview>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not a JSON list of reviews", path.display()))
}
