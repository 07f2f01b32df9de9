//! Filesystem and logging helpers.

use crate::config::Config;
use crate::error::Result;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are cut after `max` characters with an ellipsis and the
/// number of dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Create the output root and its `images/` directory if they are missing.
///
/// # Errors
///
/// Returns the filesystem error when either directory cannot be created;
/// a run without a writable output root cannot produce anything.
#[instrument(level = "info", skip_all, fields(path = %config.output_dir.display()))]
pub async fn ensure_output_dirs(config: &Config) -> Result<()> {
    fs::create_dir_all(&config.output_dir).await?;
    fs::create_dir_all(config.images_dir()).await?;
    info!("Output directories ready");
    Ok(())
}
