//! Search command implementation.

use super::{catalog_client, format_size, tmdb_client};
use crate::core::organize::{missing_episodes, organize_series};
use crate::models::config::Config;
use crate::Result;
use colored::Colorize;

/// Search the catalog, optionally organising series episodes.
pub async fn search(config: &Config, query: &str, exact: bool, organize: bool) -> Result<()> {
    let catalog = catalog_client(config)?;
    let videos = catalog.search_all(query, exact).await?;

    if videos.is_empty() {
        println!("No videos found.");
        return Ok(());
    }

    if !organize {
        println!("{}", format!("Found {} videos", videos.len()).bold());
        println!();
        for video in &videos {
            println!("  {} {}", video.id.dimmed(), video.name);
            println!("     {}", format_size(video.size));
        }
        return Ok(());
    }

    let series = organize_series(&videos);
    if series.is_empty() {
        println!("No organized series episodes found.");
        println!("  Series must be named with a {{TMDB_ID}} marker and S01-E01 numbering.");
        return Ok(());
    }

    let tmdb = tmdb_client(config)?;
    let reports = missing_episodes(tmdb.as_ref(), &series).await;

    println!("{}", format!("Found {} series", reports.len()).bold());
    for report in &reports {
        println!();
        println!(
            "{} {}",
            report.series_name.bold().cyan(),
            format!("{{{}}}", report.external_id).dimmed()
        );
        println!(
            "  Seasons available: {}/{}",
            report.seasons_available, report.total_seasons
        );
        if !report.missing_seasons.is_empty() {
            let missing: Vec<String> = report.missing_seasons.iter().map(u16::to_string).collect();
            println!("  {} {}", "Missing seasons:".yellow(), missing.join(", "));
        }
        for season in &report.seasons {
            let line = format!(
                "  {}: {}/{} episodes",
                season.name, season.available_episodes, season.expected_episodes
            );
            if season.missing_episodes.is_empty() {
                println!("{}", line.green());
            } else {
                let missing: Vec<String> =
                    season.missing_episodes.iter().map(u16::to_string).collect();
                println!("{} (missing: {})", line, missing.join(", ").yellow());
            }
        }
    }

    Ok(())
}
