//! The end-to-end run: fetch → parse → normalize → rank → download → write.
//!
//! Every step before the final write degrades to "less data" on failure, so a
//! run that cannot reach the feed still produces a valid, empty
//! `articles.json`. Only failures to create the output directories or to
//! write the document itself are returned.

use crate::config::Config;
use crate::error::Result;
use crate::fetcher::Fetcher;
use crate::models::RunSummary;
use crate::outputs::json;
use crate::utils::ensure_output_dirs;
use crate::{feed, images, normalize, ranking};
use tracing::{info, instrument, warn};

/// Run one snapshot.
///
/// # Arguments
///
/// * `config` - Feed URL, limits and output layout for this run
/// * `fetcher` - HTTP client used for the feed and every image
///
/// # Returns
///
/// Counters for the written snapshot.
///
/// # Errors
///
/// Only output directory creation and the final JSON write can fail a run.
#[instrument(level = "info", skip_all, fields(feed_url = %config.feed_url))]
pub async fn run(config: &Config, fetcher: &Fetcher) -> Result<RunSummary> {
    ensure_output_dirs(config).await?;

    println!("Fetching BBC Tech feed...");
    let raw_items = match fetcher.fetch(&config.feed_url).await {
        Some(body) => feed::parse(&body, config.max_items),
        None => {
            warn!("Feed unavailable; writing an empty snapshot");
            Vec::new()
        }
    };

    let records = normalize::normalize_items(&raw_items, config);
    let mut records = ranking::rank(records, config.max_items);
    let images_downloaded = images::download_images(&mut records, fetcher, config).await;

    let out = config.articles_path();
    json::write_articles(&records, &out).await?;
    println!("Wrote {} with {} items.", out.display(), records.len());

    let summary = RunSummary {
        items_written: records.len(),
        images_downloaded,
    };
    info!(items = summary.items_written, images = summary.images_downloaded, "Snapshot complete");
    Ok(summary)
}
