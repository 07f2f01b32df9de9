//! # Tech Feed Snapshot
//!
//! A batch job that snapshots the BBC Technology RSS feed into a static JSON
//! document plus local copies of the article images, ready to be served from
//! a `public/` directory.
//!
//! ## Usage
//!
//! ```sh
//! tech_feed_snapshot                # writes public/articles.json
//! tech_feed_snapshot -o ./site/out  # custom output root
//! ```
//!
//! ## Architecture
//!
//! One strictly sequential pipeline, run once per invocation:
//! 1. **Fetching**: Download the feed with a bounded timeout
//! 2. **Parsing**: Build an element tree and collect up to 30 `<item>`s
//! 3. **Normalizing**: Extract fields, resolve an image, strip the summary
//! 4. **Ranking**: Order newest-first by best-effort date parsing
//! 5. **Downloading**: Store each image under `images/`, one at a time
//! 6. **Output**: Write `articles.json`
//!
//! Network, parse and image failures are logged to stderr and only shrink the
//! result; the process still exits successfully with a valid document.

use clap::Parser;
use std::error::Error;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod feed;
mod fetcher;
mod images;
mod models;
mod normalize;
mod outputs;
mod pipeline;
mod ranking;
mod utils;

use cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("tech_feed_snapshot starting up");

    let args = Cli::parse();
    debug!(?args.output_dir, %args.feed_url, args.timeout_secs, "Parsed CLI arguments");
    let config = args.into_config();

    let fetcher = fetcher::Fetcher::new(config.timeout)?;
    let summary = pipeline::run(&config, &fetcher).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        items = summary.items_written,
        images = summary.images_downloaded,
        output = %config.articles_path().display(),
        "Execution complete"
    );
    Ok(())
}
