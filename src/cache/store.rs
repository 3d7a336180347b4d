//! Persistent cache tier

use super::entry::{CacheEntry, EntryMeta};
use crate::error::CacheError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

const RECORD_EXTENSION: &str = "json";

/// Slow, durable tier of the build cache
#[async_trait]
pub trait PersistentStore: Send + Sync {
    /// `Ok(None)` when no record exists for `key`
    async fn read(&self, key: &str) -> Result<Option<CacheEntry>, CacheError>;

    async fn write(&self, entry: &CacheEntry) -> Result<(), CacheError>;

    /// Returns whether a record was removed
    async fn remove(&self, key: &str) -> Result<bool, CacheError>;

    /// Size and age of every record
    async fn list(&self) -> Result<Vec<EntryMeta>, CacheError>;

    async fn clear(&self) -> Result<(), CacheError>;
}

/// One JSON record per key under a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, RECORD_EXTENSION))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!(".{}.{}.tmp", key, uuid::Uuid::new_v4().simple()))
    }
}

#[async_trait]
impl PersistentStore for FileStore {
    async fn read(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let bytes = match fs::read(self.record_path(key)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CacheError::Read {
                    key: key.to_string(),
                    source,
                })
            }
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| CacheError::Corrupt {
                key: key.to_string(),
                source,
            })
    }

    async fn write(&self, entry: &CacheEntry) -> Result<(), CacheError> {
        let write_err = |source| CacheError::Write {
            key: entry.key.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).await.map_err(write_err)?;

        let bytes = serde_json::to_vec_pretty(entry).map_err(|source| CacheError::Corrupt {
            key: entry.key.clone(),
            source,
        })?;

        let temp = self.temp_path(&entry.key);
        fs::write(&temp, &bytes).await.map_err(write_err)?;
        if let Err(source) = fs::rename(&temp, self.record_path(&entry.key)).await {
            let _ = fs::remove_file(&temp).await;
            return Err(write_err(source));
        }

        debug!("Persisted cache record {} ({} bytes)", entry.key, bytes.len());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, CacheError> {
        match fs::remove_file(self.record_path(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(CacheError::Remove {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn list(&self) -> Result<Vec<EntryMeta>, CacheError> {
        let list_err = |source| CacheError::List {
            dir: self.dir.clone(),
            source,
        };

        let mut read_dir = match fs::read_dir(&self.dir).await {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(list_err(source)),
        };

        let mut metas = Vec::new();
        while let Some(dir_entry) = read_dir.next_entry().await.map_err(list_err)? {
            let path = dir_entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };

            match self.read(&key).await {
                Ok(Some(entry)) => metas.push(EntryMeta::from(&entry)),
                Ok(None) => {}
                Err(err) => {
                    // Unreadable records sort first so eviction removes them early
                    warn!("{}", err);
                    let size_bytes = dir_entry.metadata().await.map(|m| m.len()).unwrap_or(0);
                    metas.push(EntryMeta {
                        key,
                        size_bytes,
                        created_at: DateTime::<Utc>::default(),
                    });
                }
            }
        }

        Ok(metas)
    }

    async fn clear(&self) -> Result<(), CacheError> {
        match fs::remove_dir_all(&self.dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CacheError::List {
                dir: self.dir.clone(),
                source,
            }),
        }
    }
}
