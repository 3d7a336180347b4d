//! Two-tier content-addressed build cache
//!
//! Tier 1 is an in-process map, tier 2 a [`PersistentStore`] (by default one
//! JSON record per key on disk). Both tiers share the same [`CacheKey`].
//!
//! - `get`: tier 1, then tier 2 with promotion; expired or corrupt records are a miss
//! - `set`: write-through; tier-2 failures are logged and swallowed
//! - eviction: after each successful tier-2 write, oldest records are removed
//!   until the aggregate size fits `max_size`. Best-effort, not transactional.

mod clock;
mod entry;
mod key;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, EntryMeta};
pub use key::{sha256_hex, CacheKey, ENGINE_BUILD_RESULT, STRATEGY_RESOLUTION};
pub use store::{FileStore, PersistentStore};

use crate::error::CacheError;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub dir: PathBuf,
    /// Default entry time-to-live
    pub ttl: Duration,
    /// Persistent tier budget in bytes; `None` disables eviction
    pub max_size: Option<u64>,
}

/// Result of a lookup. A miss is distinct from a cached `null`.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Hit(CacheEntry),
    Miss,
}

impl CacheLookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Hit(entry) => Some(entry.value),
            Self::Miss => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvictionReport {
    pub bytes_before: u64,
    pub bytes_after: u64,
    pub evicted: Vec<String>,
    /// Deletes that failed; their bytes still count toward `bytes_after`
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub total_bytes: u64,
    pub memory_entries: usize,
    pub max_size: Option<u64>,
    pub ttl_secs: u64,
}

pub struct BuildCache {
    memory: RwLock<HashMap<String, CacheEntry>>,
    store: Arc<dyn PersistentStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    max_size: Option<u64>,
}

impl BuildCache {
    /// File-backed cache using the system clock
    pub fn new(config: CacheConfig) -> Self {
        Self::with_store(Arc::new(FileStore::new(config.dir)), config.ttl, config.max_size)
    }

    pub fn with_store(store: Arc<dyn PersistentStore>, ttl: Duration, max_size: Option<u64>) -> Self {
        Self {
            memory: RwLock::new(HashMap::new()),
            store,
            clock: Arc::new(SystemClock),
            ttl,
            max_size,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_size(&self) -> Option<u64> {
        self.max_size
    }

    fn memory(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry>> {
        self.memory.read().unwrap_or_else(|e| e.into_inner())
    }

    fn memory_mut(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry>> {
        self.memory.write().unwrap_or_else(|e| e.into_inner())
    }

    pub async fn get(&self, key: &CacheKey) -> CacheLookup {
        let now = self.clock.now();
        let id = key.as_str();

        let cached = self.memory().get(id).cloned();
        if let Some(entry) = cached {
            if !entry.is_expired(now, self.ttl) {
                debug!("Cache hit (memory) for {}", key);
                return CacheLookup::Hit(entry);
            }
            debug!("Cache entry {} expired", key);
            self.discard(id).await;
            return CacheLookup::Miss;
        }

        match self.store.read(id).await {
            Ok(Some(entry)) => {
                if entry.key != id || !entry.verify() {
                    warn!("Cache record {} failed integrity check, discarding", key);
                    self.discard(id).await;
                    return CacheLookup::Miss;
                }
                if entry.is_expired(now, self.ttl) {
                    debug!("Cache record {} expired", key);
                    self.discard(id).await;
                    return CacheLookup::Miss;
                }
                debug!("Cache hit (disk) for {}, promoting", key);
                self.memory_mut().insert(id.to_string(), entry.clone());
                CacheLookup::Hit(entry)
            }
            Ok(None) => CacheLookup::Miss,
            Err(err @ CacheError::Corrupt { .. }) => {
                warn!("{}", err);
                self.discard(id).await;
                CacheLookup::Miss
            }
            Err(err) => {
                warn!("{}", err);
                CacheLookup::Miss
            }
        }
    }

    /// Stores `value` under the default TTL
    pub async fn set(&self, key: &CacheKey, value: Value) {
        self.insert(key, value, None).await
    }

    /// Stores `value` with a per-entry TTL
    pub async fn set_with_ttl(&self, key: &CacheKey, value: Value, ttl: Duration) {
        self.insert(key, value, Some(ttl)).await
    }

    async fn insert(&self, key: &CacheKey, value: Value, ttl: Option<Duration>) {
        let entry = match CacheEntry::new(key, value, self.clock.now(), ttl) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Cannot cache value for {}: {}", key, e);
                return;
            }
        };

        self.memory_mut()
            .insert(entry.key.clone(), entry.clone());

        if let Err(err) = self.store.write(&entry).await {
            warn!("{}", err);
            return;
        }

        if self.max_size.is_some() {
            self.evict().await;
        }
    }

    /// Removes `key` from both tiers
    pub async fn delete(&self, key: &CacheKey) -> Result<bool, CacheError> {
        let in_memory = self.memory_mut().remove(key.as_str()).is_some();
        let on_disk = self.store.remove(key.as_str()).await?;
        Ok(in_memory || on_disk)
    }

    /// Empties both tiers; a missing persistent location is not an error
    pub async fn clear(&self) -> Result<(), CacheError> {
        self.memory_mut().clear();
        self.store.clear().await?;
        info!("Cache cleared");
        Ok(())
    }

    async fn discard(&self, id: &str) {
        self.memory_mut().remove(id);
        if let Err(err) = self.store.remove(id).await {
            warn!("{}", err);
        }
    }

    /// Deletes the oldest persisted records until the total fits `max_size`
    pub async fn evict(&self) -> EvictionReport {
        let Some(max_size) = self.max_size else {
            return EvictionReport::default();
        };

        let mut metas = match self.store.list().await {
            Ok(metas) => metas,
            Err(err) => {
                warn!("Skipping eviction: {}", err);
                return EvictionReport::default();
            }
        };
        metas.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.key.cmp(&b.key))
        });

        let bytes_before: u64 = metas.iter().map(|m| m.size_bytes).sum();
        let mut report = EvictionReport {
            bytes_before,
            bytes_after: bytes_before,
            ..Default::default()
        };

        for meta in metas {
            if report.bytes_after <= max_size {
                break;
            }
            match self.store.remove(&meta.key).await {
                Ok(_) => {
                    self.memory_mut().remove(&meta.key);
                    report.bytes_after -= meta.size_bytes;
                    report.evicted.push(meta.key);
                }
                Err(err) => {
                    warn!("Eviction could not remove {}: {}", meta.key, err);
                    report.failed += 1;
                }
            }
        }

        if !report.evicted.is_empty() {
            info!(
                "Evicted {} cache records ({} -> {} bytes, budget {})",
                report.evicted.len(),
                report.bytes_before,
                report.bytes_after,
                max_size
            );
        }
        report
    }

    pub async fn stats(&self) -> Result<CacheStats, CacheError> {
        let metas = self.store.list().await?;
        Ok(CacheStats {
            entries: metas.len(),
            total_bytes: metas.iter().map(|m| m.size_bytes).sum(),
            memory_entries: self.memory().len(),
            max_size: self.max_size,
            ttl_secs: self.ttl.as_secs(),
        })
    }
}
