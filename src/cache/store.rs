//! File-backed response store with lazy TTL expiry.

use super::backend::{CacheBackend, FileCache, NullCache};
use super::entry::CacheEntry;
use super::key::Fingerprint;
use crate::types::Message;
use crate::Result;
use chrono::Utc;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl: Duration,
    pub directory: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(3600),
            directory: PathBuf::from(".cache"),
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }
}

/// Why a lookup produced no response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissReason {
    /// Caching is turned off.
    Disabled,
    /// No entry for this fingerprint.
    Absent,
    /// The entry had outlived the TTL and was deleted. If a concurrent `set`
    /// replaced it after it was read, the new entry is kept.
    Expired,
    /// The entry could not be parsed. It is left on disk for `clear` to collect.
    Corrupt,
}

/// Outcome of [`CacheStore::get`].
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Hit(Value),
    Miss(MissReason),
}

impl CacheLookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }

    pub fn into_hit(self) -> Option<Value> {
        match self {
            CacheLookup::Hit(v) => Some(v),
            CacheLookup::Miss(_) => None,
        }
    }

    pub fn miss_reason(&self) -> Option<MissReason> {
        match self {
            CacheLookup::Hit(_) => None,
            CacheLookup::Miss(reason) => Some(*reason),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expired: u64,
    pub corrupt: u64,
    pub sets: u64,
    pub deletes: u64,
    pub errors: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
    corrupt: AtomicU64,
    sets: AtomicU64,
    deletes: AtomicU64,
    errors: AtomicU64,
}

impl AtomicStats {
    fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expired: AtomicU64::new(0),
            corrupt: AtomicU64::new(0),
            sets: AtomicU64::new(0),
            deletes: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
    fn to_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            corrupt: self.corrupt.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Content-addressed response cache.
///
/// Every `get`/`set` goes to the backend; there is no in-memory layer and no
/// background sweeper. Expired entries are removed when read, or in bulk by
/// [`clear`](Self::clear).
pub struct CacheStore {
    config: CacheConfig,
    backend: Box<dyn CacheBackend>,
    stats: Arc<AtomicStats>,
}

impl CacheStore {
    /// Build a store from configuration. A disabled store never touches the
    /// filesystem, not even to create its directory.
    pub async fn open(config: CacheConfig) -> Result<Self> {
        let backend: Box<dyn CacheBackend> = if config.enabled {
            Box::new(FileCache::open(&config.directory).await?)
        } else {
            Box::new(NullCache::new())
        };
        Ok(Self::with_backend(config, backend))
    }

    pub fn with_backend(config: CacheConfig, backend: Box<dyn CacheBackend>) -> Self {
        Self {
            config,
            backend,
            stats: Arc::new(AtomicStats::new()),
        }
    }

    pub async fn get(&self, model: &str, messages: &[Message]) -> Result<CacheLookup> {
        let key = Fingerprint::of(model, messages);
        self.get_by_fingerprint(&key).await
    }

    pub async fn get_by_fingerprint(&self, key: &Fingerprint) -> Result<CacheLookup> {
        if !self.config.enabled {
            return Ok(CacheLookup::Miss(MissReason::Disabled));
        }

        let data = match self.backend.read(key).await {
            Ok(Some(data)) => data,
            Ok(None) => return Ok(self.miss(key, MissReason::Absent)),
            Err(e) => {
                AtomicStats::bump(&self.stats.errors);
                return Err(e);
            }
        };

        let entry = match CacheEntry::from_bytes(&data) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(fingerprint = %key, error = %e, "skipping corrupt cache entry");
                AtomicStats::bump(&self.stats.corrupt);
                return Ok(self.miss(key, MissReason::Corrupt));
            }
        };

        if entry.is_older_than(Utc::now(), self.config.ttl) {
            self.delete_if_unchanged(key, &data).await?;
            AtomicStats::bump(&self.stats.expired);
            return Ok(self.miss(key, MissReason::Expired));
        }

        AtomicStats::bump(&self.stats.hits);
        debug!(fingerprint = %key, model = %entry.model, "cache hit");
        Ok(CacheLookup::Hit(entry.response))
    }

    /// Store `response`, replacing any previous entry for the same request.
    pub async fn set(&self, model: &str, messages: &[Message], response: &Value) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }
        let key = Fingerprint::of(model, messages);
        let data = CacheEntry::now(model, messages, response.clone()).to_bytes()?;
        match self.backend.write(&key, &data).await {
            Ok(()) => {
                AtomicStats::bump(&self.stats.sets);
                debug!(fingerprint = %key, model, "cache set");
                Ok(())
            }
            Err(e) => {
                AtomicStats::bump(&self.stats.errors);
                Err(e)
            }
        }
    }

    /// Remove entries and return how many were deleted.
    ///
    /// With `max_age == None` every entry goes. Otherwise an entry goes when it
    /// is at least `max_age` old, and corrupt entries go unconditionally since
    /// their age cannot be known.
    pub async fn clear(&self, max_age: Option<Duration>) -> Result<usize> {
        let now = Utc::now();
        let mut removed = 0;

        for key in self.backend.keys().await? {
            let eligible = match max_age {
                None => true,
                Some(limit) => match self.backend.read(&key).await? {
                    None => false,
                    Some(data) => match CacheEntry::from_bytes(&data) {
                        Ok(entry) => entry.is_older_than(now, limit),
                        Err(_) => true,
                    },
                },
            };
            if eligible && self.delete(&key).await? {
                removed += 1;
            }
        }

        info!(removed, max_age_secs = ?max_age.map(|d| d.as_secs()), "cache cleared");
        Ok(removed)
    }

    /// Number of entries currently on disk, expired ones included.
    pub async fn len(&self) -> Result<usize> {
        Ok(self.backend.keys().await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Where the entry for `key` lives (or would live).
    pub fn entry_path(&self, key: &Fingerprint) -> PathBuf {
        self.config.directory.join(key.file_name())
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.to_stats()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    fn miss(&self, key: &Fingerprint, reason: MissReason) -> CacheLookup {
        AtomicStats::bump(&self.stats.misses);
        debug!(fingerprint = %key, ?reason, "cache miss");
        CacheLookup::Miss(reason)
    }

    /// Delete `key` only while it still holds `seen`. A rename can still land
    /// between the re-read and the removal; that window is a few syscalls wide.
    async fn delete_if_unchanged(&self, key: &Fingerprint, seen: &[u8]) -> Result<bool> {
        let current = match self.backend.read(key).await {
            Ok(current) => current,
            Err(e) => {
                AtomicStats::bump(&self.stats.errors);
                return Err(e);
            }
        };
        match current {
            Some(current) if current == seen => self.delete(key).await,
            Some(_) => {
                debug!(fingerprint = %key, "expired entry replaced concurrently, keeping it");
                Ok(false)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, key: &Fingerprint) -> Result<bool> {
        match self.backend.remove(key).await {
            Ok(deleted) => {
                if deleted {
                    AtomicStats::bump(&self.stats.deletes);
                }
                Ok(deleted)
            }
            Err(e) => {
                AtomicStats::bump(&self.stats.errors);
                Err(e)
            }
        }
    }
}
