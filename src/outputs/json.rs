//! JSON output of the final record list.
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── articles.json   # pretty-printed array of records, newest first
//! └── images/         # local image copies referenced by `image_local`
//! ```
//!
//! The document is written once, at the very end of a run, replacing any
//! previous snapshot.

use crate::models::ArticleRecord;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Serialize `records` as an indented JSON array and write it to `path`.
///
/// # Errors
///
/// Serialization or filesystem failures are returned to the caller; a run
/// that cannot write its document has no useful result.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = records.len()))]
pub async fn write_articles(records: &[ArticleRecord], path: &Path) -> crate::error::Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json).await?;
    info!(path = %path.display(), count = records.len(), "Wrote articles JSON");
    Ok(())
}
