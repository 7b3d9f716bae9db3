//! Cache command implementation.

use super::match_cache;
use crate::models::config::Config;
use crate::Result;
use colored::Colorize;
use std::time::Duration;

/// Remove expired match cache entries.
pub async fn sweep(config: &Config) -> Result<()> {
    let cache = match_cache(config)?;
    let removed = cache
        .sweep_if_due(&config.cache.sweep_marker(), Duration::ZERO)
        .await?
        .unwrap_or(0);
    println!(
        "{} Removed {} expired entries ({} left)",
        "[OK]".green(),
        removed,
        cache.len().await?
    );
    Ok(())
}

/// Show match cache size and settings.
pub async fn stats(config: &Config) -> Result<()> {
    let cache = match_cache(config)?;
    println!("{}", "Match cache".bold());
    println!("  {} {}", "File:".bold(), config.cache.file.display());
    println!("  {} {}", "Entries:".bold(), cache.len().await?);
    println!("  {} {} days", "TTL:".bold(), config.cache.ttl().num_days());
    println!(
        "  {} {} hours",
        "Sweep interval:".bold(),
        config.cache.sweep_interval().as_secs() / 3600
    );
    Ok(())
}
