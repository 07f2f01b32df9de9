//! Output generation.
//!
//! # Submodules
//!
//! - [`json`]: Writes the ranked records to `articles.json`
//!
//! Image files are written by [`crate::images`] during the download step; this
//! module only produces the final document that references them.

pub mod json;
