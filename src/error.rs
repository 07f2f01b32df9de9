//! Error type shared by the pipeline steps.
//!
//! Steps return [`Result`] internally; each pipeline boundary decides whether
//! a failure is logged and degraded to "less data" or propagated to `main`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed feed: {0}")]
    MalformedFeed(String),

    #[error("Undefined entity: &{0};")]
    UndefinedEntity(String),

    #[error("Cannot derive a filename from URL: {0}")]
    UnsupportedUrl(String),
}

pub type Result<T> = std::result::Result<T, SnapshotError>;
