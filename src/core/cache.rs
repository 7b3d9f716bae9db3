//! Match cache.
//!
//! Successful matches are kept for a fixed TTL. Reads ignore expired entries
//! without deleting them; a periodic sweep removes them.

use crate::core::matcher::MatchResult;
use crate::utils::fs::{read_json, write_json};
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    pub fn advance(&self, by: ChronoDuration) {
        self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }

    pub fn set(&self, to: DateTime<Utc>) {
        self.millis.store(to.timestamp_millis(), Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.millis.load(Ordering::SeqCst))
            .single()
            .unwrap_or_else(Utc::now)
    }
}

/// One cached match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub data: MatchResult,
    pub timestamp: DateTime<Utc>,
}

/// Key to entry storage behind the match cache.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Insert or replace the entry for `entry.key`.
    async fn put(&self, entry: CacheEntry) -> Result<()>;

    /// Remove entries with `timestamp <= cutoff`; returns how many went.
    async fn remove_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize>;

    async fn len(&self) -> Result<usize>;
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, entry: CacheEntry) -> Result<()> {
        self.entries.write().await.insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn remove_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.timestamp > cutoff);
        Ok(before - entries.len())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }
}

/// Store persisted to a JSON file after every change.
#[derive(Debug)]
pub struct JsonFileCacheStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl JsonFileCacheStore {
    /// Open a store, loading the file if it exists.
    pub fn open(path: &Path) -> Result<Self> {
        let entries = read_json(path)?.unwrap_or_default();
        Ok(Self {
            path: path.to_path_buf(),
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CacheStore for JsonFileCacheStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, entry: CacheEntry) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(entry.key.clone(), entry);
        write_json(&self.path, &*entries)
    }

    async fn remove_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.timestamp > cutoff);
        let removed = before - entries.len();
        if removed > 0 {
            write_json(&self.path, &*entries)?;
        }
        Ok(removed)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }
}

/// TTL cache of match results.
pub struct MatchCache {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    ttl: ChronoDuration,
}

impl MatchCache {
    pub fn new(store: Arc<dyn CacheStore>, clock: Arc<dyn Clock>, ttl: ChronoDuration) -> Self {
        Self { store, clock, ttl }
    }

    /// In-memory cache on the wall clock.
    pub fn in_memory(ttl: ChronoDuration) -> Self {
        Self::new(Arc::new(MemoryCacheStore::new()), Arc::new(SystemClock), ttl)
    }

    /// Cached result for `key`, if younger than the TTL.
    pub async fn get(&self, key: &str) -> Option<MatchResult> {
        let entry = match self.store.get(key).await {
            Ok(entry) => entry?,
            Err(e) => {
                tracing::warn!("Cache read failed for {}: {}", key, e);
                return None;
            }
        };

        if self.clock.now() - entry.timestamp < self.ttl {
            Some(entry.data)
        } else {
            None
        }
    }

    /// Store a result, replacing any previous entry for `key`.
    pub async fn put(&self, key: &str, data: MatchResult) {
        let entry = CacheEntry {
            key: key.to_string(),
            data,
            timestamp: self.clock.now(),
        };
        if let Err(e) = self.store.put(entry).await {
            tracing::warn!("Cache write failed for {}: {}", key, e);
        }
    }

    /// Remove every entry whose age has reached the TTL.
    pub async fn sweep(&self) -> Result<usize> {
        let cutoff = self.clock.now() - self.ttl;
        let removed = self.store.remove_older_than(cutoff).await?;
        tracing::info!("Cache sweep removed {} expired entries", removed);
        Ok(removed)
    }

    /// Sweep unless the last sweep recorded in `marker` is younger than
    /// `interval`. The sweep time is written back to `marker`.
    ///
    /// Returns the number of removed entries, or `None` when no sweep was due.
    pub async fn sweep_if_due(&self, marker: &Path, interval: Duration) -> Result<Option<usize>> {
        let now = self.clock.now();
        let last: Option<DateTime<Utc>> = read_json(marker)?;
        let interval = ChronoDuration::seconds(interval.as_secs() as i64);
        if last.map_or(false, |at| now - at < interval) {
            tracing::debug!("Cache sweep not due yet");
            return Ok(None);
        }

        let removed = self.sweep().await?;
        write_json(marker, &now)?;
        Ok(Some(removed))
    }

    pub async fn len(&self) -> Result<usize> {
        self.store.len().await
    }

    /// Sweep on a fixed interval until the returned handle is aborted.
    ///
    /// The first sweep happens one interval after the call.
    pub fn spawn_sweeper(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = self.sweep().await {
                    tracing::error!("Cache sweep failed: {}", e);
                }
            }
        })
    }
}
