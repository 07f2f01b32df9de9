//! Turning raw feed items into [`ArticleRecord`]s.
//!
//! Image resolution is an ordered list of strategies, each a pure function
//! over the raw item; the first one that yields a URL wins.

use crate::config::Config;
use crate::feed::RawItem;
use crate::models::ArticleRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument};

/// First `src` of an `<img>` tag anywhere in raw markup, quoted either way.
static IMG_SRC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<img[^>]+src=['"]([^'"]+)"#).expect("valid img regex"));

/// Non-greedy `<...>` span.
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^<]+?>").expect("valid tag regex"));

/// A single way of finding an item's image URL.
pub type ImageStrategy = fn(&RawItem) -> Option<String>;

/// Strategies in priority order.
pub const IMAGE_STRATEGIES: &[ImageStrategy] = &[media_content_image, enclosure_image, description_image];

pub fn media_content_image(item: &RawItem) -> Option<String> {
    item.media_content_urls().next().map(str::to_string)
}

pub fn enclosure_image(item: &RawItem) -> Option<String> {
    item.enclosure_url().map(str::to_string)
}

/// Scan the description as plain text, so broken HTML still yields a match.
pub fn description_image(item: &RawItem) -> Option<String> {
    let description = item.text("description").unwrap_or_default();
    IMG_SRC_RE
        .captures(description)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Find the item's image URL using the first strategy that yields one.
///
/// # Arguments
///
/// * `item` - Raw feed item to inspect
///
/// # Returns
///
/// The URL from `media:content`, then `enclosure`, then the first `<img>` in
/// the description; `None` when no strategy matches.
pub fn resolve_image(item: &RawItem) -> Option<String> {
    IMAGE_STRATEGIES.iter().find_map(|strategy| strategy(item))
}

/// Strip tags, keep the first `max_chars` characters, then trim.
///
/// # Arguments
///
/// * `description` - Item description, possibly containing markup
/// * `max_chars` - Character (not byte) limit applied before trimming
///
/// # Returns
///
/// Plain summary text of at most `max_chars` characters.
pub fn summarize(description: &str, max_chars: usize) -> String {
    let stripped = TAG_RE.replace_all(description, "");
    let truncated: String = stripped.chars().take(max_chars).collect();
    truncated.trim().to_string()
}

/// Build the output record for one feed item.
///
/// # Arguments
///
/// * `item` - Raw feed item
/// * `config` - Supplies the summary limit and the source label
///
/// # Returns
///
/// A record with trimmed text fields (empty when missing) and no local image yet.
pub fn normalize_item(item: &RawItem, config: &Config) -> ArticleRecord {
    let field = |name: &str| item.text(name).unwrap_or_default().trim().to_string();
    ArticleRecord {
        title: field("title"),
        link: field("link"),
        date: field("pubDate"),
        summary: summarize(item.text("description").unwrap_or_default(), config.summary_max_chars),
        image: resolve_image(item),
        source: config.source_label.clone(),
        image_local: None,
    }
}

/// Normalize every item, preserving feed order.
#[instrument(level = "info", skip_all, fields(count = items.len()))]
pub fn normalize_items(items: &[RawItem], config: &Config) -> Vec<ArticleRecord> {
    let records: Vec<ArticleRecord> = items.iter().map(|item| normalize_item(item, config)).collect();
    let with_image = records.iter().filter(|r| r.image.is_some()).count();
    debug!(records = records.len(), with_image, "Normalized feed items");
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed;

    fn item(inner: &str) -> RawItem {
        let xml = format!(
            r#"<rss xmlns:media="http://search.yahoo.com/mrss/"><channel><item>{inner}</item></channel></rss>"#
        );
        feed::parse(xml.as_bytes(), 30).remove(0)
    }

    #[test]
    fn test_summary_strips_markup() {
        assert_eq!(summarize("<p>Hello <b>world</b></p>", 400), "Hello world");
    }

    #[test]
    fn test_summary_truncates_before_trimming() {
        let description = format!("  {}", "a".repeat(500));
        let summary = summarize(&description, 400);
        // The two leading spaces count toward the limit.
        assert_eq!(summary.chars().count(), 398);
    }

    #[test]
    fn test_summary_counts_characters_not_bytes() {
        let description = "é".repeat(10);
        assert_eq!(summarize(&description, 4), "éééé");
    }

    #[test]
    fn test_image_from_description_single_quotes() {
        let raw = item("<description>&lt;img src='http://x.test/a.png'/&gt; caption</description>");
        assert_eq!(resolve_image(&raw), Some("http://x.test/a.png".to_string()));
    }

    #[test]
    fn test_image_from_malformed_description_markup() {
        let raw = item(r#"<description><![CDATA[<div><img alt="x" src="http://x.test/b.png" <p>unclosed]]></description>"#);
        assert_eq!(resolve_image(&raw), Some("http://x.test/b.png".to_string()));
    }

    #[test]
    fn test_image_priority_media_then_enclosure_then_description() {
        let all = item(concat!(
            r#"<description>&lt;img src="http://x.test/desc.png"&gt;</description>"#,
            r#"<enclosure url="http://x.test/enc.png"/>"#,
            r#"<media:content url="http://x.test/media.png"/>"#,
        ));
        assert_eq!(resolve_image(&all), Some("http://x.test/media.png".to_string()));

        let no_media = item(concat!(
            r#"<description>&lt;img src="http://x.test/desc.png"&gt;</description>"#,
            r#"<enclosure url="http://x.test/enc.png"/>"#,
        ));
        assert_eq!(resolve_image(&no_media), Some("http://x.test/enc.png".to_string()));
    }

    #[test]
    fn test_media_without_url_falls_through() {
        let raw = item(r#"<media:content medium="image"/><enclosure url="http://x.test/enc.png"/>"#);
        assert_eq!(resolve_image(&raw), Some("http://x.test/enc.png".to_string()));
    }

    #[test]
    fn test_no_image() {
        let raw = item("<title>plain</title><description>no pictures</description>");
        assert_eq!(resolve_image(&raw), None);
    }

    #[test]
    fn test_missing_fields_become_empty_strings() {
        let record = normalize_item(&item(""), &Config::default());
        assert_eq!(record.title, "");
        assert_eq!(record.link, "");
        assert_eq!(record.date, "");
        assert_eq!(record.summary, "");
        assert_eq!(record.image, None);
        assert_eq!(record.source, "BBC Technology");
        assert_eq!(record.image_local, None);
    }

    #[test]
    fn test_fields_are_trimmed() {
        let raw = item(concat!(
            "<title>\n  Chip makers rally  \n</title>",
            "<link> https://www.bbc.co.uk/news/articles/one </link>",
            "<pubDate> Mon, 01 Jan 2024 10:00:00 GMT </pubDate>",
        ));
        let record = normalize_item(&raw, &Config::default());
        assert_eq!(record.title, "Chip makers rally");
        assert_eq!(record.link, "https://www.bbc.co.uk/news/articles/one");
        assert_eq!(record.date, "Mon, 01 Jan 2024 10:00:00 GMT");
    }
}
