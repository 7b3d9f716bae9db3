//! Duplicate detection.

use crate::core::cleaner::normalize;
use crate::core::jobs::{spawn_job, JobContext, JobRegistry, StartedJob};
use crate::models::job::{DuplicateGroup, JobKind};
use crate::models::media::CatalogEntry;
use crate::services::VideoCatalog;
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// Group entries whose normalized names are equal.
///
/// Only groups with two or more entries are returned, ordered by the
/// position of their first entry. Names with nothing alphanumeric in them
/// are never grouped.
pub fn find_duplicates(entries: &[CatalogEntry]) -> Vec<DuplicateGroup> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<&CatalogEntry>> = HashMap::new();

    for entry in entries {
        let key = normalize(&entry.name);
        if key.is_empty() {
            continue;
        }
        groups
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(entry);
    }

    order
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .filter(|group| group.len() > 1)
        .map(|group| DuplicateGroup {
            original_name: group[0].name.clone(),
            total_size: group.iter().map(|e| e.size).sum(),
            duplicate_count: group.len(),
            entries: group.into_iter().cloned().collect(),
        })
        .collect()
}

/// Scan the whole catalog for duplicates. The context is finished on return.
pub async fn scan(catalog: &dyn VideoCatalog, ctx: &JobContext) -> Result<Vec<DuplicateGroup>> {
    let entries = match catalog.search("").await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!("Duplicate scan error: {}", e);
            ctx.finish(format!("Error: {}", e));
            return Err(e);
        }
    };

    ctx.set_total(entries.len());
    ctx.set_status("Analyzing videos for duplicates...");

    let groups = find_duplicates(&entries);
    ctx.set_current(entries.len());

    let status = format!("Scan completed: Found {} duplicate groups", groups.len());
    tracing::info!("Duplicate scan completed: {} groups found", groups.len());
    ctx.set_duplicates(groups.clone());
    ctx.finish(status);
    Ok(groups)
}

/// Start a duplicate scan on a background task.
pub fn start_duplicate_scan(
    registry: &JobRegistry,
    catalog: Arc<dyn VideoCatalog>,
) -> Result<StartedJob<Result<Vec<DuplicateGroup>>>> {
    let context = registry.begin(JobKind::DuplicateScan, "Starting duplicate scan...")?;
    let ctx = context.clone();
    Ok(spawn_job(context, async move { scan(catalog.as_ref(), &ctx).await }))
}
