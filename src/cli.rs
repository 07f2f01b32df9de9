//! Command-line interface definitions.
//!
//! The job needs no arguments: every option defaults to the built-in constant,
//! so a bare invocation snapshots the BBC Technology feed into `public/`.

use crate::config::{Config, DEFAULT_OUTPUT_DIR, DEFAULT_TIMEOUT_SECS, FEED_URL};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments.
///
/// A bare invocation uses the built-in defaults. Anything clap does not
/// recognize (an unknown flag or a stray positional) is rejected with a usage
/// message and exit status 2 instead of being silently ignored.
///
/// # Examples
///
/// ```sh
/// # Default run, writes public/articles.json and public/images/
/// tech_feed_snapshot
///
/// # Publish into a site checkout instead
/// tech_feed_snapshot --output-dir ./site/public
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output root for articles.json and the images/ directory
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// RSS feed to snapshot
    #[arg(long, default_value = FEED_URL)]
    pub feed_url: String,

    /// Per-request timeout in seconds, for the feed and each image
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl Cli {
    pub fn into_config(self) -> Config {
        Config {
            feed_url: self.feed_url,
            output_dir: self.output_dir,
            timeout: Duration::from_secs(self.timeout_secs),
            ..Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_match_built_in_config() {
        let config = Cli::parse_from(["tech_feed_snapshot"]).into_config();
        let defaults = Config::default();

        assert_eq!(config.feed_url, defaults.feed_url);
        assert_eq!(config.output_dir, defaults.output_dir);
        assert_eq!(config.timeout, defaults.timeout);
        assert_eq!(config.max_items, 30);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "tech_feed_snapshot",
            "-o",
            "/tmp/site",
            "--feed-url",
            "http://localhost:8080/rss.xml",
            "--timeout-secs",
            "3",
        ]);
        let config = cli.into_config();

        assert_eq!(config.output_dir, PathBuf::from("/tmp/site"));
        assert_eq!(config.feed_url, "http://localhost:8080/rss.xml");
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_unexpected_arguments_are_rejected() {
        for argv in [
            vec!["tech_feed_snapshot", "--bogus"],
            vec!["tech_feed_snapshot", "extra"],
        ] {
            let err = Cli::try_parse_from(argv).unwrap_err();
            assert_eq!(err.exit_code(), 2);
        }
    }
}
