//! Newest-first ordering of records by their feed date.
//!
//! Dates are interpreted best-effort: first as the RFC 822 style used by the
//! feed (`Mon, 01 Jan 2024 10:00:00 GMT`), then as ISO 8601. Anything else is
//! treated as the earliest possible moment, so such records sink to the end
//! while keeping their relative order. Other conventions (for example the
//! US style `01/02/2024`) are not recognized.

use crate::models::ArticleRecord;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Weekday};
use tracing::{debug, instrument};

/// RFC 822 style feed date after the `Mon,` prefix; the zone name is read
/// and ignored.
const FEED_DATE_FORMAT: &str = "%d %b %Y %H:%M:%S %Z";

const ISO_NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

/// Ordering key for dates that cannot be interpreted.
pub const SENTINEL_DATE: NaiveDateTime = NaiveDateTime::MIN;

/// Interpret a feed date, if it follows a known convention.
///
/// Results are wall-clock times; the zone of an RFC 822 date is not applied,
/// while ISO dates carrying an offset are normalized to UTC.
///
/// # Arguments
///
/// * `raw` - The `pubDate` text exactly as the feed gave it
///
/// # Returns
///
/// The parsed date-time, or `None` when neither convention matches.
///
/// # Examples
///
/// ```ignore
/// assert!(parse_feed_date("Mon, 01 Jan 2024 10:00:00 GMT").is_some());
/// assert!(parse_feed_date("not-a-date").is_none());
/// ```
pub fn parse_feed_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    parse_rfc822_date(raw).or_else(|| parse_iso_date(raw))
}

/// Requires a real weekday name but does not check it against the date.
fn parse_rfc822_date(raw: &str) -> Option<NaiveDateTime> {
    let (weekday, rest) = raw.split_once(',')?;
    weekday.parse::<Weekday>().ok()?;
    NaiveDateTime::parse_from_str(rest.trim_start(), FEED_DATE_FORMAT).ok()
}

fn parse_iso_date(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    ISO_NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Ordering key for one record.
pub fn sort_key(record: &ArticleRecord) -> NaiveDateTime {
    parse_feed_date(&record.date).unwrap_or(SENTINEL_DATE)
}

/// Order records newest-first and keep at most `max_items`.
///
/// The sort is stable, so records with equal dates, and all records whose
/// date could not be parsed, keep their feed order.
///
/// # Arguments
///
/// * `records` - Normalized records in feed order
/// * `max_items` - Maximum number of records to keep after sorting
///
/// # Returns
///
/// The ranked, truncated records.
#[instrument(level = "info", skip_all, fields(count = records.len(), max_items = max_items))]
pub fn rank(records: Vec<ArticleRecord>, max_items: usize) -> Vec<ArticleRecord> {
    let mut keyed: Vec<(NaiveDateTime, ArticleRecord)> =
        records.into_iter().map(|r| (sort_key(&r), r)).collect();
    let undated = keyed.iter().filter(|(k, _)| *k == SENTINEL_DATE).count();

    // `sort_by` is stable: equal keys keep feed order.
    keyed.sort_by(|a, b| b.0.cmp(&a.0));
    keyed.truncate(max_items);

    debug!(kept = keyed.len(), undated, "Ranked records");
    keyed.into_iter().map(|(_, r)| r).collect()
}
