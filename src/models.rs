//! Data models for feed articles.
//!
//! [`ArticleRecord`] is the only entity that leaves the pipeline. Its serde
//! layout is the public `articles.json` schema: field order and names are
//! fixed, `image` is always present (possibly `null`) and `image_local` is
//! omitted unless a local copy was actually written.

use serde::{Deserialize, Serialize};

/// A normalized article, one per feed item.
///
/// `title`, `link`, `date` and `summary` are never missing: absent source data
/// becomes an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleRecord {
    /// Headline, trimmed.
    pub title: String,
    /// Article URL, trimmed.
    pub link: String,
    /// Publication date exactly as the feed spelled it (trimmed).
    pub date: String,
    /// Description with markup stripped, truncated and trimmed.
    pub summary: String,
    /// Remote image URL picked by the image resolver.
    pub image: Option<String>,
    /// Constant label naming the feed this record came from.
    pub source: String,
    /// `images/<filename>` relative to the output root, set only after a
    /// successful download.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_local: Option<String>,
}

/// Counters reported once a run has written its output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub items_written: usize,
    pub images_downloaded: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ArticleRecord {
        ArticleRecord {
            title: "Chip makers rally".to_string(),
            link: "https://www.bbc.co.uk/news/articles/abc".to_string(),
            date: "Mon, 01 Jan 2024 10:00:00 GMT".to_string(),
            summary: "Shares rose.".to_string(),
            image: None,
            source: "BBC Technology".to_string(),
            image_local: None,
        }
    }

    #[test]
    fn test_absent_image_serializes_as_null_and_local_is_omitted() {
        let value = serde_json::to_value(sample()).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj["image"].is_null());
        assert!(!obj.contains_key("image_local"));
        assert_eq!(obj.len(), 6);
    }

    #[test]
    fn test_field_order_matches_schema() {
        let mut record = sample();
        record.image = Some("http://x.test/a.png".to_string());
        record.image_local = Some("images/a.png".to_string());
        let json = serde_json::to_string(&record).unwrap();

        let keys = ["\"title\"", "\"link\"", "\"date\"", "\"summary\"", "\"image\"", "\"source\"", "\"image_local\""];
        let positions: Vec<usize> = keys.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_deserialize_without_image_local() {
        let json = r#"{
            "title": "t",
            "link": "l",
            "date": "",
            "summary": "s",
            "image": null,
            "source": "BBC Technology"
        }"#;
        let record: ArticleRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.image, None);
        assert_eq!(record.image_local, None);
        assert_eq!(record.date, "");
    }
}
