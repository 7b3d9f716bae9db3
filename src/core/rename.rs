//! Batch rename and the AI approval queue.
//!
//! Names the local parser can handle are renamed immediately. Names that
//! needed the AI fallback become [`PendingRename`] suggestions and are only
//! applied once an operator approves them.

use crate::core::jobs::{spawn_job, JobContext, JobRegistry, StartedJob};
use crate::core::parser::parse;
use crate::generators::filename::{canonical_name, is_canonical};
use crate::models::config::RenameConfig;
use crate::models::job::{JobFailure, JobKind, RenameSummary};
use crate::models::media::{CatalogEntry, MetadataMatch, ParsedTitle};
use crate::models::rename::PendingRename;
use crate::services::{AiTitleParser, MetadataProvider, VideoCatalog};
use crate::utils::fs::{read_json, write_json};
use crate::Result;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Queue of AI suggestions awaiting approval, at most one per catalog id.
///
/// When backed by a file, every change is written through.
#[derive(Debug, Default)]
pub struct PendingQueue {
    items: Mutex<Vec<PendingRename>>,
    path: Option<PathBuf>,
}

impl PendingQueue {
    /// In-memory queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue backed by a JSON file, loading it if present.
    pub fn with_file(path: &Path) -> Result<Self> {
        let items: Vec<PendingRename> = read_json(path)?.unwrap_or_default();
        Ok(Self {
            items: Mutex::new(items),
            path: Some(path.to_path_buf()),
        })
    }

    fn items(&self) -> MutexGuard<'_, Vec<PendingRename>> {
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn save(&self, items: &[PendingRename]) -> Result<()> {
        match &self.path {
            Some(path) => write_json(path, &items),
            None => Ok(()),
        }
    }

    /// Add a suggestion, replacing any existing one for the same id.
    pub fn propose(&self, item: PendingRename) -> Result<()> {
        let mut items = self.items();
        match items.iter_mut().find(|p| p.id == item.id) {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
        self.save(&items)
    }

    pub fn list(&self) -> Vec<PendingRename> {
        self.items().clone()
    }

    pub fn get(&self, id: &str) -> Option<PendingRename> {
        self.items().iter().find(|p| p.id == id).cloned()
    }

    pub fn remove(&self, id: &str) -> Result<Option<PendingRename>> {
        let mut items = self.items();
        let Some(index) = items.iter().position(|p| p.id == id) else {
            return Ok(None);
        };
        let removed = items.remove(index);
        self.save(&items)?;
        Ok(Some(removed))
    }

    /// Remove a suggestion, failing when there is none for `id`.
    pub fn take(&self, id: &str) -> Result<PendingRename> {
        self.remove(id)?
            .ok_or_else(|| crate::Error::PendingRenameNotFound(id.to_string()))
    }

    pub fn clear(&self) -> Result<()> {
        let mut items = self.items();
        items.clear();
        self.save(&items)
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

/// What happened to one catalog entry during a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Already canonical.
    Skipped,
    /// Renamed to the contained name.
    Renamed(String),
    /// Queued for approval with the contained suggested name.
    Proposed(String),
    /// Not renamed; the reason is recorded as a job failure.
    Failed(String),
}

/// Batch rename workflow.
pub struct RenameWorkflow {
    catalog: Arc<dyn VideoCatalog>,
    metadata: Arc<dyn MetadataProvider>,
    ai: Option<Arc<dyn AiTitleParser>>,
    pending: Arc<PendingQueue>,
    config: RenameConfig,
}

impl RenameWorkflow {
    pub fn new(
        catalog: Arc<dyn VideoCatalog>,
        metadata: Arc<dyn MetadataProvider>,
        ai: Option<Arc<dyn AiTitleParser>>,
        pending: Arc<PendingQueue>,
        config: RenameConfig,
    ) -> Self {
        Self {
            catalog,
            metadata,
            ai,
            pending,
            config,
        }
    }

    pub fn pending(&self) -> &PendingQueue {
        &self.pending
    }

    async fn lookup(&self, parsed: &ParsedTitle) -> Option<MetadataMatch> {
        match self.metadata.search_metadata(parsed).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("Metadata lookup failed for {}: {}", parsed, e);
                None
            }
        }
    }

    async fn ask_ai(&self, ai: &dyn AiTitleParser, name: &str) -> Option<ParsedTitle> {
        match ai.parse_with_ai(name).await {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("AI fallback failed for \"{}\": {}", name, e);
                None
            }
        }
    }

    /// Process one catalog entry.
    pub async fn process_entry(&self, entry: &CatalogEntry) -> ItemOutcome {
        if is_canonical(&entry.name) {
            tracing::debug!("Already canonical: {}", entry.name);
            return ItemOutcome::Skipped;
        }

        let mut parsed = parse(&entry.name);
        let mut matched = match &parsed {
            Some(p) => self.lookup(p).await,
            None => None,
        };

        let mut used_ai = false;
        if matched.is_none() {
            if let Some(ai) = &self.ai {
                used_ai = true;
                if let Some(ai_parsed) = self.ask_ai(ai.as_ref(), &entry.name).await {
                    matched = self.lookup(&ai_parsed).await;
                    parsed = Some(ai_parsed);
                }
            }
        }

        let (Some(parsed), Some(matched)) = (parsed, matched) else {
            let reason = if used_ai {
                "Local parser and AI fallback failed"
            } else {
                "Local parser failed"
            };
            return ItemOutcome::Failed(reason.to_string());
        };

        let new_name = canonical_name(&parsed, &matched, &self.config.extension);

        if used_ai {
            let suggestion = PendingRename {
                id: entry.id.clone(),
                original_name: entry.name.clone(),
                suggested_name: new_name.clone(),
                parsed_by_ai: parsed,
                matched_with_tmdb: matched,
            };
            if let Err(e) = self.pending.propose(suggestion) {
                tracing::warn!("Could not save pending rename for {}: {}", entry.id, e);
            }
            tracing::info!("AI suggestion for \"{}\" sent for manual approval", entry.name);
            return ItemOutcome::Proposed(new_name);
        }

        match self.catalog.rename(&entry.id, &new_name).await {
            Ok(true) => ItemOutcome::Renamed(new_name),
            Ok(false) => ItemOutcome::Failed("API rename failed".to_string()),
            Err(e) => {
                tracing::error!("Rename failed [{}]: {}", entry.id, e);
                ItemOutcome::Failed("API rename failed".to_string())
            }
        }
    }

    /// Run a batch over the whole catalog.
    ///
    /// Clears the pending queue first. A single failing entry never stops
    /// the batch; it is recorded as a job failure. The context is finished
    /// on return.
    pub async fn run(&self, ctx: &JobContext) -> Result<RenameSummary> {
        if let Err(e) = self.pending.clear() {
            tracing::warn!("Could not clear pending renames: {}", e);
        }

        let entries = match self.catalog.search("").await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!("Batch rename error: {}", e);
                ctx.finish(format!("Error: {}", e));
                return Err(e);
            }
        };

        ctx.set_total(entries.len());
        ctx.set_status("Processing videos...");

        let mut summary = RenameSummary::default();
        let mut cancelled = false;

        for entry in &entries {
            if ctx.is_cancelled() {
                cancelled = true;
                break;
            }
            ctx.advance(format!("Processing: {}", entry.name));

            match self.process_entry(entry).await {
                ItemOutcome::Skipped => {
                    summary.skipped += 1;
                    continue;
                }
                ItemOutcome::Renamed(_) => summary.renamed += 1,
                ItemOutcome::Proposed(_) => {
                    summary.pending_ai += 1;
                    ctx.add_pending_ai();
                }
                ItemOutcome::Failed(reason) => {
                    summary.errors += 1;
                    ctx.record_failure(JobFailure {
                        id: entry.id.clone(),
                        name: entry.name.clone(),
                        reason,
                    });
                }
            }

            if !self.config.item_delay().is_zero() {
                tokio::time::sleep(self.config.item_delay()).await;
            }
        }

        let status = if cancelled {
            format!("Cancelled: {}", summary)
        } else {
            format!("Completed: {}", summary)
        };
        tracing::info!("Batch rename {}", status.to_lowercase());
        ctx.finish(status);
        Ok(summary)
    }

    /// Apply a pending suggestion.
    ///
    /// The suggestion is removed only when the catalog accepts the rename.
    pub async fn approve(&self, id: &str) -> Result<String> {
        let item = self
            .pending
            .get(id)
            .ok_or_else(|| crate::Error::PendingRenameNotFound(id.to_string()))?;

        if !self.catalog.rename(&item.id, &item.suggested_name).await? {
            return Err(crate::Error::RenameFailed(id.to_string()));
        }

        self.pending.remove(id)?;
        tracing::info!("Approved rename: {} -> {}", item.original_name, item.suggested_name);
        Ok(item.suggested_name)
    }

    /// Drop a pending suggestion without touching the catalog.
    pub fn reject(&self, id: &str) -> Result<PendingRename> {
        let item = self.pending.take(id)?;
        tracing::info!("Rejected rename for {}", item.original_name);
        Ok(item)
    }

    /// Rename one entry directly, bypassing parsing and approval.
    pub async fn manual_rename(&self, id: &str, new_name: &str) -> Result<()> {
        let new_name = new_name.trim();
        if id.is_empty() || new_name.is_empty() {
            return Err(crate::Error::other("video id and new name are required"));
        }
        if !self.catalog.rename(id, new_name).await? {
            return Err(crate::Error::RenameFailed(id.to_string()));
        }
        Ok(())
    }
}

/// Start a rename batch on a background task.
pub fn start_rename_batch(
    registry: &JobRegistry,
    workflow: Arc<RenameWorkflow>,
) -> Result<StartedJob<Result<RenameSummary>>> {
    let context = registry.begin(JobKind::Rename, "Starting rename...")?;
    let ctx = context.clone();
    Ok(spawn_job(context, async move { workflow.run(&ctx).await }))
}
