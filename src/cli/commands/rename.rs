//! Rename command implementations.

use super::{ai_parser, catalog_client, tmdb_client, watch_job};
use crate::core::jobs::JobRegistry;
use crate::core::rename::{start_rename_batch, PendingQueue, RenameWorkflow};
use crate::models::config::Config;
use crate::Result;
use colored::Colorize;
use std::sync::Arc;

fn workflow(config: &Config, use_ai: bool) -> Result<RenameWorkflow> {
    let pending = PendingQueue::with_file(&config.rename.pending_file)?;
    Ok(RenameWorkflow::new(
        catalog_client(config)?,
        tmdb_client(config)?,
        ai_parser(config, use_ai)?,
        Arc::new(pending),
        config.rename.clone(),
    ))
}

/// Rename the whole catalog.
pub async fn batch(config: &Config, use_ai: bool) -> Result<()> {
    println!("{}", "[RENAME] Starting batch rename...".bold().cyan());
    if !use_ai {
        println!("  AI fallback disabled");
    }
    println!();

    let registry = JobRegistry::new();
    let job = start_rename_batch(&registry, Arc::new(workflow(config, use_ai)?))?;

    let progress = watch_job(&registry, job.id()).await?;
    let summary = job
        .handle
        .await
        .map_err(|e| crate::Error::other(format!("rename task failed: {}", e)))??;

    println!();
    println!("{}", "Rename Summary".bold().green());
    println!("  {} {}", "Renamed:".bold(), summary.renamed);
    println!("  {} {}", "Skipped:".bold(), summary.skipped);
    println!("  {} {}", "Errors:".bold(), summary.errors);
    println!("  {} {}", "Pending AI approval:".bold(), summary.pending_ai);

    if !progress.failures.is_empty() {
        println!();
        println!("{}", "[Failures]".bold().red());
        for failure in &progress.failures {
            println!("  {} {} - {}", failure.id.dimmed(), failure.name, failure.reason);
        }
        println!();
        println!(
            "  Fix manually with: {}",
            "stream-manager rename manual <VIDEO_ID> <NEW_NAME>".cyan()
        );
    }

    if summary.pending_ai > 0 {
        println!();
        println!("{}", "[Next Steps]".bold().yellow());
        println!("  Review AI suggestions: {}", "stream-manager rename pending".cyan());
    }

    Ok(())
}

/// List pending AI suggestions.
pub fn pending(config: &Config) -> Result<()> {
    let queue = PendingQueue::with_file(&config.rename.pending_file)?;
    let items = queue.list();

    if items.is_empty() {
        println!("No pending AI renames.");
        return Ok(());
    }

    println!("{}", format!("{} pending AI renames", items.len()).bold());
    for item in &items {
        println!();
        println!("  {} {}", "ID:".bold(), item.id);
        println!("  {} {}", "Original:".bold(), item.original_name);
        println!("  {} {}", "Suggested:".bold(), item.suggested_name.green());
        println!("  {} {}", "AI parsed:".bold(), item.parsed_by_ai);
        println!(
            "  {} {} ({})",
            "TMDB:".bold(),
            item.matched_with_tmdb.title,
            item.matched_with_tmdb.external_id
        );
    }

    Ok(())
}

/// Apply a pending AI suggestion.
pub async fn approve(config: &Config, id: &str) -> Result<()> {
    let new_name = workflow(config, false)?.approve(id).await?;
    println!("{} Renamed to: {}", "[OK]".green(), new_name);
    Ok(())
}

/// Discard a pending AI suggestion.
pub fn reject(config: &Config, id: &str) -> Result<()> {
    let queue = PendingQueue::with_file(&config.rename.pending_file)?;
    let item = queue.take(id)?;
    println!("{} Rejected suggestion for: {}", "[OK]".green(), item.original_name);
    Ok(())
}

/// Rename one video directly.
pub async fn manual(config: &Config, id: &str, new_name: &str) -> Result<()> {
    workflow(config, false)?.manual_rename(id, new_name).await?;
    println!("{} Renamed to: {}", "[OK]".green(), new_name.trim());
    Ok(())
}
