//! Batch job data models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::media::CatalogEntry;

/// Job identifier.
pub type JobId = Uuid;

/// Kind of batch job. At most one job of each kind runs at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Rename,
    DuplicateScan,
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobKind::Rename => write!(f, "rename"),
            JobKind::DuplicateScan => write!(f, "duplicate scan"),
        }
    }
}

/// One item a batch could not handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFailure {
    /// Catalog video ID.
    pub id: String,
    /// Name at the time of processing.
    pub name: String,
    /// Why the item failed.
    pub reason: String,
}

/// Group of catalog entries sharing the same normalized name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Name of the first entry seen.
    pub original_name: String,
    pub entries: Vec<CatalogEntry>,
    pub total_size: u64,
    pub duplicate_count: usize,
}

/// Progress record of a batch job, readable while the job runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobProgress {
    pub id: JobId,
    pub kind: JobKind,
    pub running: bool,
    pub current: usize,
    pub total: usize,
    pub status: String,
    pub failures: Vec<JobFailure>,
    /// Suggestions waiting for approval (rename jobs).
    pub pending_ai_count: usize,
    /// Duplicate groups found (duplicate scan jobs).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub duplicates: Vec<DuplicateGroup>,
}

impl JobProgress {
    pub fn new(id: JobId, kind: JobKind, status: &str) -> Self {
        Self {
            id,
            kind,
            running: true,
            current: 0,
            total: 0,
            status: status.to_string(),
            failures: Vec::new(),
            pending_ai_count: 0,
            duplicates: Vec::new(),
        }
    }
}

/// Final counts of a rename batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameSummary {
    pub renamed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub pending_ai: usize,
}

impl std::fmt::Display for RenameSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} renamed, {} skipped, {} errors, {} pending AI approval",
            self.renamed, self.skipped, self.errors, self.pending_ai
        )
    }
}
