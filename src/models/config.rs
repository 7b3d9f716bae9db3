//! Configuration model.
//!
//! Loaded from `<config dir>/stream_manager/config.toml` when present, then
//! overridden by environment variables:
//! - `STREAM_API_KEYS`: comma-separated video catalog API keys
//! - `STREAM_API_BASE`: video catalog management endpoint
//! - `TMDB_API_KEY`: TMDB API key or bearer token
//! - `OLLAMA_HOST`, `OLLAMA_MODEL`, `OLLAMA_TIMEOUT`: AI fallback service
//! - `PLAYER_BASE_URL`: base URL used to derive stream/download links

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Video catalog configuration.
    pub catalog: CatalogConfig,
    /// TMDB configuration.
    pub tmdb: TmdbConfig,
    /// Ollama configuration.
    pub ollama: OllamaConfig,
    /// Scoring weights for candidate matching.
    pub matching: MatchWeights,
    /// Match cache configuration.
    pub cache: CacheConfig,
    /// Batch rename configuration.
    pub rename: RenameConfig,
    /// Player page used to build stream and download links.
    pub player_base_url: Option<String>,
}

/// Video catalog configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// API keys, rotated round-robin per request.
    pub api_keys: Vec<String>,
    /// Management endpoint.
    pub base_url: String,
    /// Results per page.
    pub per_page: u32,
    /// Pages fetched concurrently per group.
    pub page_batch: usize,
    /// Pause between page groups in milliseconds.
    pub page_delay_ms: u64,
}

/// TMDB configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    /// API key.
    pub api_key: Option<String>,
    /// Language for responses.
    pub language: String,
}

/// Ollama configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Service URL.
    pub host: String,
    /// Model to use.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout: u64,
}

/// Candidate scoring weights.
///
/// A scored candidate is accepted only when its score is strictly greater
/// than `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchWeights {
    /// Candidate name embeds `{externalId}`.
    pub external_id: i32,
    /// Normalized titles are equal.
    pub exact_title: i32,
    /// Candidate title contains the request title.
    pub partial_title: i32,
    /// Both are movies with the same year.
    pub year: i32,
    pub threshold: i32,
}

/// Match cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry lifetime in seconds.
    pub ttl_secs: u64,
    /// Sweep interval in seconds.
    pub sweep_interval_secs: u64,
    /// Cache file used by the CLI.
    pub file: PathBuf,
}

/// Batch rename configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameConfig {
    /// Pause after each processed entry in milliseconds.
    pub item_delay_ms: u64,
    /// Extension appended to canonical names.
    pub extension: String,
    /// Pending AI renames file used by the CLI.
    pub pending_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            tmdb: TmdbConfig::default(),
            ollama: OllamaConfig::default(),
            matching: MatchWeights::default(),
            cache: CacheConfig::default(),
            rename: RenameConfig::default(),
            player_base_url: None,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_keys: Vec::new(),
            base_url: "https://streamp2p.com/api/v1/video/manage".to_string(),
            per_page: 200,
            page_batch: 3,
            page_delay_ms: 500,
        }
    }
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            language: "en-US".to_string(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            model: "qwen2.5:7b".to_string(),
            timeout: 300,
        }
    }
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            external_id: 100,
            exact_title: 50,
            partial_title: 20,
            year: 40,
            threshold: 50,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 15 * 24 * 60 * 60,
            sweep_interval_secs: 6 * 60 * 60,
            file: dirs_config_path().join("match_cache.json"),
        }
    }
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            item_delay_ms: 500,
            extension: "mkv".to_string(),
            pending_file: dirs_config_path().join("pending_renames.json"),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.ttl_secs as i64)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// File recording when the cache was last swept.
    pub fn sweep_marker(&self) -> PathBuf {
        self.file.with_extension("sweep.json")
    }
}

impl RenameConfig {
    pub fn item_delay(&self) -> Duration {
        Duration::from_millis(self.item_delay_ms)
    }
}

impl CatalogConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

impl Config {
    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(keys) = std::env::var("STREAM_API_KEYS") {
            let keys: Vec<String> = keys
                .split(',')
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect();
            if !keys.is_empty() {
                self.catalog.api_keys = keys;
            }
        }
        if let Ok(base) = std::env::var("STREAM_API_BASE") {
            self.catalog.base_url = base;
        }
        if let Ok(key) = std::env::var("TMDB_API_KEY") {
            self.tmdb.api_key = Some(key);
        }
        if let Ok(host) = std::env::var("OLLAMA_HOST") {
            self.ollama.host = host;
        }
        if let Ok(model) = std::env::var("OLLAMA_MODEL") {
            self.ollama.model = model;
        }
        if let Some(timeout) = std::env::var("OLLAMA_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.ollama.timeout = timeout;
        }
        if let Ok(url) = std::env::var("PLAYER_BASE_URL") {
            self.player_base_url = Some(url);
        }
    }
}

/// Get the configuration directory path.
pub fn dirs_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stream_manager")
}

/// Load configuration from file, then apply environment overrides.
pub fn load_config() -> crate::Result<Config> {
    let config_path = dirs_config_path().join("config.toml");

    let mut config = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        toml::from_str(&content)?
    } else {
        Config::default()
    };

    config.apply_env();
    Ok(config)
}
