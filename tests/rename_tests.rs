//! Integration tests for the batch rename workflow.
//!
//! Tests cover:
//! - Local parsing followed by an immediate rename
//! - Skipping names that are already canonical
//! - AI fallback suggestions and the approval queue
//! - Failure reasons recorded on the job
//! - Manual renames

mod common;

use common::{MockAi, MockCatalog, MockMetadata};
use std::sync::Arc;
use stream_manager::core::jobs::JobRegistry;
use stream_manager::core::rename::{start_rename_batch, ItemOutcome, PendingQueue, RenameWorkflow};
use stream_manager::models::config::RenameConfig;
use stream_manager::models::media::{CatalogEntry, ParsedTitle};
use stream_manager::services::AiTitleParser;
use stream_manager::Error;

fn config() -> RenameConfig {
    RenameConfig {
        item_delay_ms: 0,
        ..Default::default()
    }
}

struct Fixture {
    catalog: Arc<MockCatalog>,
    metadata: Arc<MockMetadata>,
    ai: Arc<MockAi>,
}

impl Fixture {
    fn new(entries: Vec<CatalogEntry>) -> Self {
        let metadata = MockMetadata::new();
        metadata.add_title("Heat", 949, Some("tt0113277"), Some(1995));
        metadata.add_title("The Matrix", 603, Some("tt0133093"), Some(1999));
        metadata.add_title("Breaking Bad", 1396, Some("tt0903747"), None);

        Self {
            catalog: Arc::new(MockCatalog::with_entries(entries)),
            metadata: Arc::new(metadata),
            ai: Arc::new(MockAi::new()),
        }
    }

    fn workflow(&self, with_ai: bool) -> RenameWorkflow {
        let ai = if with_ai {
            Some(self.ai.clone() as Arc<dyn AiTitleParser>)
        } else {
            None
        };
        RenameWorkflow::new(
            self.catalog.clone(),
            self.metadata.clone(),
            ai,
            Arc::new(PendingQueue::new()),
            config(),
        )
    }
}

// ========== SINGLE ENTRY TESTS ==========

#[tokio::test]
async fn test_local_parse_renames_immediately() {
    let fixture = Fixture::new(vec![]);
    let workflow = fixture.workflow(true);

    let outcome = workflow
        .process_entry(&CatalogEntry::new("v1", "Heat.1995.1080p.BluRay.mkv"))
        .await;

    let expected = "Heat 1995 {949} {tt0113277}.mkv";
    assert_eq!(outcome, ItemOutcome::Renamed(expected.to_string()));
    assert_eq!(
        fixture.catalog.renames(),
        vec![("v1".to_string(), expected.to_string())]
    );
    assert!(fixture.ai.calls().is_empty());
}

#[tokio::test]
async fn test_series_episode_name() {
    let fixture = Fixture::new(vec![]);
    let workflow = fixture.workflow(false);

    let outcome = workflow
        .process_entry(&CatalogEntry::new("v2", "Breaking.Bad.S01E05.720p.mkv"))
        .await;

    assert_eq!(
        outcome,
        ItemOutcome::Renamed("Breaking Bad S01-E05-Episode 5 {1396} {tt0903747}.mkv".to_string())
    );
}

#[tokio::test]
async fn test_canonical_name_is_skipped() {
    let fixture = Fixture::new(vec![]);
    let workflow = fixture.workflow(true);

    let outcome = workflow
        .process_entry(&CatalogEntry::new("v1", "Alien 1979 {348} {tt0078748}.mkv"))
        .await;

    assert_eq!(outcome, ItemOutcome::Skipped);
    assert!(fixture.metadata.lookups().is_empty());
    assert!(fixture.catalog.renames().is_empty());
}

#[tokio::test]
async fn test_ai_suggestion_goes_to_pending() {
    let fixture = Fixture::new(vec![]);
    fixture
        .ai
        .answer("zz_untitled_upload.mp4", ParsedTitle::movie("The Matrix", Some(1999)));
    let workflow = fixture.workflow(true);

    let outcome = workflow
        .process_entry(&CatalogEntry::new("v3", "zz_untitled_upload.mp4"))
        .await;

    let expected = "The Matrix 1999 {603} {tt0133093}.mkv";
    assert_eq!(outcome, ItemOutcome::Proposed(expected.to_string()));
    assert!(fixture.catalog.renames().is_empty());

    let pending = workflow.pending().list();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, "v3");
    assert_eq!(pending[0].original_name, "zz_untitled_upload.mp4");
    assert_eq!(pending[0].suggested_name, expected);
    assert_eq!(pending[0].matched_with_tmdb.external_id, 603);
}

#[tokio::test]
async fn test_new_suggestion_replaces_old_one() {
    let fixture = Fixture::new(vec![]);
    let entry = CatalogEntry::new("v3", "zz_untitled_upload.mp4");
    let workflow = fixture.workflow(true);

    fixture
        .ai
        .answer(&entry.name, ParsedTitle::movie("The Matrix", Some(1999)));
    workflow.process_entry(&entry).await;

    fixture.ai.answer(&entry.name, ParsedTitle::movie("Heat", Some(1995)));
    workflow.process_entry(&entry).await;

    let pending = workflow.pending().list();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].suggested_name, "Heat 1995 {949} {tt0113277}.mkv");
}

#[tokio::test]
async fn test_failure_reasons() {
    let fixture = Fixture::new(vec![]);
    let entry = CatalogEntry::new("v4", "Unknown.Film.2011.mkv");

    let outcome = fixture.workflow(false).process_entry(&entry).await;
    assert_eq!(outcome, ItemOutcome::Failed("Local parser failed".to_string()));

    let outcome = fixture.workflow(true).process_entry(&entry).await;
    assert_eq!(
        outcome,
        ItemOutcome::Failed("Local parser and AI fallback failed".to_string())
    );
    assert_eq!(fixture.ai.calls(), vec!["Unknown.Film.2011.mkv"]);
}

#[tokio::test]
async fn test_metadata_error_counts_as_no_match() {
    let fixture = Fixture::new(vec![]);
    fixture.metadata.fail(true);

    let outcome = fixture
        .workflow(false)
        .process_entry(&CatalogEntry::new("v1", "Heat.1995.mkv"))
        .await;
    assert_eq!(outcome, ItemOutcome::Failed("Local parser failed".to_string()));
}

#[tokio::test]
async fn test_rejected_rename_is_a_failure() {
    let fixture = Fixture::new(vec![]);
    fixture.catalog.reject_renames(true);

    let outcome = fixture
        .workflow(false)
        .process_entry(&CatalogEntry::new("v1", "Heat.1995.mkv"))
        .await;
    assert_eq!(outcome, ItemOutcome::Failed("API rename failed".to_string()));
}

// ========== APPROVAL TESTS ==========

async fn workflow_with_suggestion(fixture: &Fixture) -> RenameWorkflow {
    fixture
        .ai
        .answer("zz_untitled_upload.mp4", ParsedTitle::movie("The Matrix", Some(1999)));
    let workflow = fixture.workflow(true);
    workflow
        .process_entry(&CatalogEntry::new("v3", "zz_untitled_upload.mp4"))
        .await;
    workflow
}

#[tokio::test]
async fn test_approve_renames_once_and_removes() {
    let fixture = Fixture::new(vec![]);
    let workflow = workflow_with_suggestion(&fixture).await;

    let name = workflow.approve("v3").await.unwrap();
    assert_eq!(name, "The Matrix 1999 {603} {tt0133093}.mkv");
    assert_eq!(fixture.catalog.renames(), vec![("v3".to_string(), name)]);
    assert!(workflow.pending().is_empty());

    assert!(matches!(
        workflow.approve("v3").await,
        Err(Error::PendingRenameNotFound(_))
    ));
    assert_eq!(fixture.catalog.renames().len(), 1);
}

#[tokio::test]
async fn test_reject_never_renames() {
    let fixture = Fixture::new(vec![]);
    let workflow = workflow_with_suggestion(&fixture).await;

    let rejected = workflow.reject("v3").unwrap();
    assert_eq!(rejected.id, "v3");
    assert!(workflow.pending().is_empty());
    assert!(fixture.catalog.renames().is_empty());

    assert!(matches!(
        workflow.reject("v3"),
        Err(Error::PendingRenameNotFound(_))
    ));
}

#[tokio::test]
async fn test_failed_approval_keeps_suggestion() {
    let fixture = Fixture::new(vec![]);
    let workflow = workflow_with_suggestion(&fixture).await;
    fixture.catalog.reject_renames(true);

    assert!(matches!(
        workflow.approve("v3").await,
        Err(Error::RenameFailed(_))
    ));
    assert_eq!(workflow.pending().len(), 1);

    fixture.catalog.reject_renames(false);
    assert!(workflow.approve("v3").await.is_ok());
    assert!(workflow.pending().is_empty());
}

#[tokio::test]
async fn test_manual_rename() {
    let fixture = Fixture::new(vec![]);
    let workflow = fixture.workflow(false);

    workflow.manual_rename("v9", "  Custom Name.mkv ").await.unwrap();
    assert_eq!(
        fixture.catalog.renames(),
        vec![("v9".to_string(), "Custom Name.mkv".to_string())]
    );

    assert!(workflow.manual_rename("v9", "   ").await.is_err());
    assert_eq!(fixture.catalog.renames().len(), 1);
}

// ========== BATCH TESTS ==========

#[tokio::test]
async fn test_batch_summary_and_progress() {
    let fixture = Fixture::new(vec![
        CatalogEntry::new("v1", "Heat.1995.1080p.BluRay.mkv"),
        CatalogEntry::new("v2", "Alien 1979 {348} {tt0078748}.mkv"),
        CatalogEntry::new("v3", "zz_untitled_upload.mp4"),
        CatalogEntry::new("v4", "Unknown.Film.2011.mkv"),
    ]);
    fixture
        .ai
        .answer("zz_untitled_upload.mp4", ParsedTitle::movie("The Matrix", Some(1999)));
    let workflow = Arc::new(fixture.workflow(true));
    let registry = JobRegistry::new();

    let started = start_rename_batch(&registry, workflow.clone()).unwrap();
    let id = started.id();
    let summary = started.handle.await.unwrap().unwrap();

    assert_eq!(summary.renamed, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.pending_ai, 1);
    assert_eq!(summary.errors, 1);

    let progress = registry.progress(id).unwrap();
    assert!(!progress.running);
    assert_eq!(progress.total, 4);
    assert_eq!(progress.current, 4);
    assert_eq!(progress.pending_ai_count, 1);
    assert_eq!(progress.failures.len(), 1);
    assert_eq!(progress.failures[0].id, "v4");
    assert_eq!(progress.failures[0].reason, "Local parser and AI fallback failed");
    assert_eq!(
        progress.status,
        "Completed: 1 renamed, 1 skipped, 1 errors, 1 pending AI approval"
    );

    assert_eq!(workflow.pending().len(), 1);
    assert_eq!(fixture.catalog.searches(), vec![""]);
}

#[tokio::test]
async fn test_batch_clears_previous_suggestions() {
    let fixture = Fixture::new(vec![]);
    let workflow = Arc::new(workflow_with_suggestion(&fixture).await);
    assert_eq!(workflow.pending().len(), 1);

    let registry = JobRegistry::new();
    let started = start_rename_batch(&registry, workflow.clone()).unwrap();
    started.handle.await.unwrap().unwrap();

    assert!(workflow.pending().is_empty());
}

#[tokio::test]
async fn test_batch_listing_failure() {
    let fixture = Fixture::new(vec![]);
    fixture.catalog.fail_searches(true);
    let registry = JobRegistry::new();

    let started = start_rename_batch(&registry, Arc::new(fixture.workflow(false))).unwrap();
    let id = started.id();
    assert!(started.handle.await.unwrap().is_err());

    let progress = registry.progress(id).unwrap();
    assert!(!progress.running);
    assert!(progress.status.starts_with("Error:"));
}
