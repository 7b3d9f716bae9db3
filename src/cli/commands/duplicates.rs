//! Duplicates command implementation.

use super::{catalog_client, format_size, watch_job};
use crate::core::duplicates::start_duplicate_scan;
use crate::core::jobs::JobRegistry;
use crate::models::config::Config;
use crate::Result;
use colored::Colorize;

/// Scan the catalog for duplicates and print the groups.
pub async fn scan_duplicates(config: &Config) -> Result<()> {
    let registry = JobRegistry::new();
    let job = start_duplicate_scan(&registry, catalog_client(config)?)?;

    watch_job(&registry, job.id()).await?;
    let groups = job
        .handle
        .await
        .map_err(|e| crate::Error::other(format!("duplicate scan task failed: {}", e)))??;

    println!();
    if groups.is_empty() {
        println!("{}", "No duplicates found.".green());
        return Ok(());
    }

    println!("{}", format!("Found {} duplicate groups", groups.len()).bold());
    for group in &groups {
        println!();
        println!(
            "{} ({} copies, {})",
            group.original_name.bold(),
            group.duplicate_count,
            format_size(group.total_size)
        );
        for entry in &group.entries {
            println!("  {} {}", entry.id.dimmed(), entry.name);
        }
    }

    Ok(())
}
