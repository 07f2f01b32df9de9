//! Local copies of article images.
//!
//! Each record's remote image is fetched one at a time, in record order, and
//! written under `<output>/images/` with a filename derived from its URL.
//! Two URLs that sanitize to the same name overwrite each other; the last
//! download wins.

use crate::config::{Config, IMAGES_SUBDIR};
use crate::error::{Result, SnapshotError};
use crate::fetcher::Fetcher;
use crate::models::ArticleRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tokio::fs;
use tracing::{debug, error, info, instrument};
use url::Url;

static UNSAFE_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9A-Za-z._-]").expect("valid filename regex"));

/// Raw pieces of a URL: network location, path and query, exactly as written.
#[derive(Debug, PartialEq, Eq)]
struct RawUrlParts<'a> {
    netloc: &'a str,
    path: &'a str,
    query: Option<&'a str>,
}

/// Split `url` without normalizing it; `Url` only decides whether a scheme
/// prefix is present. The fragment is dropped.
fn split_raw_url(url: &str) -> RawUrlParts<'_> {
    let rest = match Url::parse(url) {
        Ok(parsed) => {
            let scheme_len = parsed.scheme().len();
            match url.get(..=scheme_len) {
                Some(prefix) if prefix.eq_ignore_ascii_case(&format!("{}:", parsed.scheme())) => {
                    &url[scheme_len + 1..]
                }
                _ => url,
            }
        }
        Err(_) => url,
    };

    let (netloc, rest) = match rest.strip_prefix("//") {
        Some(after) => {
            let end = after.find(['/', '?', '#']).unwrap_or(after.len());
            (&after[..end], &after[end..])
        }
        None => ("", rest),
    };
    let rest = rest.split('#').next().unwrap_or_default();
    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };
    RawUrlParts { netloc, path, query }
}

/// Derive a filesystem-safe filename from an image URL.
///
/// The name is the last segment of the URL's path as written; when that is
/// empty, the network location (host and port) with dots turned into `_`.
/// A query string is appended as `?<query>` after a non-empty segment. Every
/// character outside `[0-9A-Za-z._-]` then becomes `_`, so `photo.jpg?x=1`
/// becomes `photo.jpg_x_1` and `a b.png` becomes `a_b.png`.
///
/// # Arguments
///
/// * `url` - Remote image URL; strings without a scheme are treated as paths
///
/// # Returns
///
/// The sanitized filename, or `None` when no usable name remains. Applying
/// the function to its own output returns the same name.
pub fn safe_filename(url: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }

    let parts = split_raw_url(url);
    let basename = parts.path.rsplit('/').next().unwrap_or_default();
    let name = match parts.query {
        _ if basename.is_empty() => parts.netloc.replace('.', "_"),
        Some(query) if !query.is_empty() => format!("{basename}?{query}"),
        _ => basename.to_string(),
    };

    let sanitized = UNSAFE_CHARS_RE.replace_all(&name, "_").into_owned();
    match sanitized.as_str() {
        "" | "." | ".." => None,
        _ => Some(sanitized),
    }
}

/// Write `data` for `url` under `images_dir`, returning the output-relative path.
async fn store_image(data: &[u8], url: &str, images_dir: &Path) -> Result<String> {
    let name = safe_filename(url).ok_or_else(|| SnapshotError::UnsupportedUrl(url.to_string()))?;
    let path = images_dir.join(&name);
    fs::write(&path, data).await?;
    debug!(path = %path.display(), bytes = data.len(), "Wrote image");
    Ok(format!("{IMAGES_SUBDIR}/{name}"))
}

/// Fetch one image and store it; `None` when either step fails.
#[instrument(level = "debug", skip(fetcher, images_dir))]
pub async fn download_image(fetcher: &Fetcher, url: &str, images_dir: &Path) -> Option<String> {
    let data = fetcher.fetch(url).await?;
    match store_image(&data, url, images_dir).await {
        Ok(local) => Some(local),
        Err(e) => {
            error!(%url, error = %e, "Image download failed");
            None
        }
    }
}

/// Download every record's image, setting `image_local` on success.
///
/// Returns the number of images stored.
#[instrument(level = "info", skip_all, fields(count = records.len()))]
pub async fn download_images(records: &mut [ArticleRecord], fetcher: &Fetcher, config: &Config) -> usize {
    let images_dir = config.images_dir();
    let mut stored = 0;
    for record in records.iter_mut() {
        let Some(url) = record.image.as_deref().filter(|u| !u.is_empty()) else {
            continue;
        };
        if let Some(local) = download_image(fetcher, url, &images_dir).await {
            record.image_local = Some(local);
            stored += 1;
        }
    }
    info!(stored, "Downloaded images");
    stored
}
