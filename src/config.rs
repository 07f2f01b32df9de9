//! Immutable run configuration.
//!
//! Every tunable of a run (feed endpoint, limits, output layout, timeouts)
//! lives in [`Config`] and is passed down the pipeline, so tests can point a
//! run at a local feed and a temporary output root.

use std::path::PathBuf;
use std::time::Duration;

/// BBC Technology RSS endpoint.
pub const FEED_URL: &str = "http://feeds.bbci.co.uk/news/technology/rss.xml";
/// Label stamped on every record.
pub const SOURCE_LABEL: &str = "BBC Technology";
/// Upper bound on items parsed from the feed and records written.
pub const MAX_ITEMS: usize = 30;
/// Summaries are cut to this many characters.
pub const SUMMARY_MAX_CHARS: usize = 400;
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_OUTPUT_DIR: &str = "public";
pub const IMAGES_SUBDIR: &str = "images";
pub const ARTICLES_FILENAME: &str = "articles.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub feed_url: String,
    pub source_label: String,
    pub max_items: usize,
    pub summary_max_chars: usize,
    /// Per-request timeout for the feed and for every image.
    pub timeout: Duration,
    /// Output root; `articles.json` and `images/` live beneath it.
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: FEED_URL.to_string(),
            source_label: SOURCE_LABEL.to_string(),
            max_items: MAX_ITEMS,
            summary_max_chars: SUMMARY_MAX_CHARS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl Config {
    pub fn images_dir(&self) -> PathBuf {
        self.output_dir.join(IMAGES_SUBDIR)
    }

    pub fn articles_path(&self) -> PathBuf {
        self.output_dir.join(ARTICLES_FILENAME)
    }
}
