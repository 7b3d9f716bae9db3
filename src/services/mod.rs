//! External service clients.
//!
//! The core only talks to the outside world through the traits below, so the
//! matching and rename logic can run against in-process fakes.

pub mod catalog;
pub mod ollama;
pub mod tmdb;

use crate::models::media::{CatalogEntry, MetadataMatch, ParsedTitle, SeriesInfo};
use crate::Result;
use async_trait::async_trait;

/// Remote video catalog.
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    /// Search the catalog. An empty query lists everything.
    ///
    /// The order of the returned entries carries no meaning.
    async fn search(&self, query: &str) -> Result<Vec<CatalogEntry>>;

    /// Rename a video. `Ok(false)` means the catalog refused the rename.
    async fn rename(&self, id: &str, new_name: &str) -> Result<bool>;
}

/// Movie/TV metadata catalog.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Look up a parsed title.
    async fn search_metadata(&self, parsed: &ParsedTitle) -> Result<Option<MetadataMatch>>;

    /// Season structure of a series.
    async fn series_info(&self, external_id: u64) -> Result<Option<SeriesInfo>>;
}

/// Secondary filename parser backed by a language model.
///
/// Slow and rate limited; only consulted after local parsing fails.
#[async_trait]
pub trait AiTitleParser: Send + Sync {
    async fn parse_with_ai(&self, filename: &str) -> Result<Option<ParsedTitle>>;
}
