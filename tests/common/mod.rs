//! Shared test doubles for the collaborator traits.
//!
//! Every mock records its calls so tests can assert on how often the
//! catalog, TMDB or the AI parser were consulted.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use stream_manager::models::media::{
    CatalogEntry, EpisodeRef, MetadataMatch, ParsedTitle, SeriesInfo,
};
use stream_manager::services::{AiTitleParser, MetadataProvider, VideoCatalog};
use stream_manager::Result;
use tokio::sync::Notify;

/// In-memory video catalog.
///
/// `search` returns every entry unless a result was registered for the
/// exact query with [`MockCatalog::set_search_result`].
#[derive(Default)]
pub struct MockCatalog {
    entries: Mutex<Vec<CatalogEntry>>,
    by_query: Mutex<HashMap<String, Vec<CatalogEntry>>>,
    searches: Mutex<Vec<String>>,
    renames: Mutex<Vec<(String, String)>>,
    reject_renames: Mutex<bool>,
    fail_searches: Mutex<bool>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<CatalogEntry>) -> Self {
        let catalog = Self::new();
        *catalog.entries.lock().unwrap() = entries;
        catalog
    }

    pub fn set_search_result(&self, query: &str, entries: Vec<CatalogEntry>) {
        self.by_query
            .lock()
            .unwrap()
            .insert(query.to_string(), entries);
    }

    /// Make renames return `Ok(false)`.
    pub fn reject_renames(&self, reject: bool) {
        *self.reject_renames.lock().unwrap() = reject;
    }

    /// Make searches return an error.
    pub fn fail_searches(&self, fail: bool) {
        *self.fail_searches.lock().unwrap() = fail;
    }

    /// Block searches until the returned handle is notified.
    pub fn hold_searches(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(notify.clone());
        notify
    }

    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    pub fn renames(&self) -> Vec<(String, String)> {
        self.renames.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoCatalog for MockCatalog {
    async fn search(&self, query: &str) -> Result<Vec<CatalogEntry>> {
        self.searches.lock().unwrap().push(query.to_string());

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if *self.fail_searches.lock().unwrap() {
            return Err(stream_manager::Error::Catalog("search unavailable".to_string()));
        }
        if let Some(entries) = self.by_query.lock().unwrap().get(query) {
            return Ok(entries.clone());
        }
        Ok(self.entries.lock().unwrap().clone())
    }

    async fn rename(&self, id: &str, new_name: &str) -> Result<bool> {
        self.renames
            .lock()
            .unwrap()
            .push((id.to_string(), new_name.to_string()));
        Ok(!*self.reject_renames.lock().unwrap())
    }
}

/// Metadata catalog keyed by lowercase title.
///
/// Episode lookups get an [`EpisodeRef`] named `Episode N`.
#[derive(Default)]
pub struct MockMetadata {
    titles: Mutex<HashMap<String, MetadataMatch>>,
    series: Mutex<HashMap<u64, SeriesInfo>>,
    lookups: Mutex<Vec<ParsedTitle>>,
    fail: Mutex<bool>,
}

impl MockMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_title(&self, title: &str, external_id: u64, cross_ref: Option<&str>, year: Option<u16>) {
        self.titles.lock().unwrap().insert(
            title.to_lowercase(),
            MetadataMatch {
                external_id,
                cross_ref_id: cross_ref.map(String::from),
                title: title.to_string(),
                year,
                episode: None,
            },
        );
    }

    pub fn add_series(&self, external_id: u64, info: SeriesInfo) {
        self.series.lock().unwrap().insert(external_id, info);
    }

    pub fn fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    pub fn lookups(&self) -> Vec<ParsedTitle> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataProvider for MockMetadata {
    async fn search_metadata(&self, parsed: &ParsedTitle) -> Result<Option<MetadataMatch>> {
        self.lookups.lock().unwrap().push(parsed.clone());
        if *self.fail.lock().unwrap() {
            return Err(stream_manager::Error::Tmdb("lookup unavailable".to_string()));
        }

        let found = self
            .titles
            .lock()
            .unwrap()
            .get(&parsed.title.to_lowercase())
            .cloned();
        Ok(found.map(|mut matched| {
            if let (Some(season), Some(episode)) = (parsed.season(), parsed.episode_number()) {
                matched.year = None;
                matched.episode = Some(EpisodeRef {
                    season,
                    episode,
                    name: format!("Episode {}", episode),
                });
            }
            matched
        }))
    }

    async fn series_info(&self, external_id: u64) -> Result<Option<SeriesInfo>> {
        Ok(self.series.lock().unwrap().get(&external_id).cloned())
    }
}

/// AI parser answering from a fixed table of filenames.
#[derive(Default)]
pub struct MockAi {
    answers: Mutex<HashMap<String, ParsedTitle>>,
    calls: Mutex<Vec<String>>,
}

impl MockAi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(&self, filename: &str, parsed: ParsedTitle) {
        self.answers
            .lock()
            .unwrap()
            .insert(filename.to_string(), parsed);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiTitleParser for MockAi {
    async fn parse_with_ai(&self, filename: &str) -> Result<Option<ParsedTitle>> {
        self.calls.lock().unwrap().push(filename.to_string());
        Ok(self.answers.lock().unwrap().get(filename).cloned())
    }
}
