//! Match command implementation.

use super::{catalog_client, swept_match_cache};
use crate::core::matcher::{MatchRequest, MatchResponse, MatchScorer, MatchService};
use crate::models::config::Config;
use crate::Result;
use colored::Colorize;

/// Find the catalog video for a slug and/or TMDB ID.
pub async fn match_video(config: &Config, slug: Option<String>, tmdb_id: Option<u64>) -> Result<()> {
    let service = MatchService::new(
        catalog_client(config)?,
        swept_match_cache(config).await?,
        MatchScorer::new(config.matching),
        config.player_base_url.clone(),
    );

    let request = MatchRequest {
        slug,
        external_id: tmdb_id,
    };

    let response = service.match_request(&request).await?;
    let result = match &response {
        MatchResponse::NoMatch(outcome) => {
            println!("{} {}", "[NO MATCH]".yellow(), outcome.message());
            return Ok(());
        }
        MatchResponse::Cached(result) => {
            println!("{}", "[OK] Match found (cached)".bold().green());
            result
        }
        MatchResponse::Matched(result) => {
            println!("{}", "[OK] Match found".bold().green());
            result
        }
    };

    println!("  {} {}", "Name:".bold(), result.entry.name);
    println!("  {} {}", "ID:".bold(), result.entry.id);
    if let Some(score) = result.score {
        println!("  {} {}", "Score:".bold(), score);
    }
    if let Some(url) = &result.stream_url {
        println!("  {} {}", "Stream:".bold(), url.cyan());
    }
    if let Some(url) = &result.download_url {
        println!("  {} {}", "Download:".bold(), url.cyan());
    }

    Ok(())
}
