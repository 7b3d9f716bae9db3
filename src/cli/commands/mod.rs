//! CLI command implementations.

pub mod cache;
pub mod duplicates;
pub mod matching;
pub mod parse;
pub mod rename;
pub mod search;

use crate::core::cache::{JsonFileCacheStore, MatchCache, SystemClock};
use crate::core::jobs::JobRegistry;
use crate::models::config::Config;
use crate::models::job::{JobId, JobProgress};
use crate::services::catalog::StreamCatalogClient;
use crate::services::ollama::OllamaClient;
use crate::services::tmdb::TmdbClient;
use crate::services::AiTitleParser;
use crate::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

fn catalog_client(config: &Config) -> Result<Arc<StreamCatalogClient>> {
    Ok(Arc::new(StreamCatalogClient::new(config.catalog.clone())?))
}

fn tmdb_client(config: &Config) -> Result<Arc<TmdbClient>> {
    Ok(Arc::new(TmdbClient::new(&config.tmdb)?))
}

fn ai_parser(config: &Config, enabled: bool) -> Result<Option<Arc<dyn AiTitleParser>>> {
    if !enabled {
        return Ok(None);
    }
    let client = OllamaClient::with_config(config.ollama.clone())?;
    Ok(Some(Arc::new(client)))
}

fn match_cache(config: &Config) -> Result<Arc<MatchCache>> {
    let store = JsonFileCacheStore::open(&config.cache.file)?;
    Ok(Arc::new(MatchCache::new(
        Arc::new(store),
        Arc::new(SystemClock),
        config.cache.ttl(),
    )))
}

/// Match cache, swept first when the sweep interval has passed.
async fn swept_match_cache(config: &Config) -> Result<Arc<MatchCache>> {
    let cache = match_cache(config)?;
    let marker = config.cache.sweep_marker();
    if let Err(e) = cache.sweep_if_due(&marker, config.cache.sweep_interval()).await {
        tracing::warn!("Cache sweep failed: {}", e);
    }
    Ok(cache)
}

/// Show a progress bar for a running job until it finishes.
///
/// Ctrl-C requests cancellation; the job stops after its current item.
async fn watch_job(registry: &JobRegistry, id: JobId) -> Result<JobProgress> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut cancel_sent = false;

    loop {
        let progress = registry.progress(id)?;
        pb.set_length(progress.total as u64);
        pb.set_position(progress.current as u64);
        pb.set_message(progress.status.clone());

        if !progress.running {
            pb.finish_with_message(progress.status.clone());
            return Ok(progress);
        }

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(200)) => {}
            _ = &mut ctrl_c, if !cancel_sent => {
                registry.cancel(id)?;
                cancel_sent = true;
                pb.println("Cancelling after the current item...");
            }
        }
    }
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
