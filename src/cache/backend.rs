//! Cache backend implementations.

use super::key::Fingerprint;
use crate::{Error, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Raw byte storage addressed by fingerprint.
///
/// Backends know nothing about entry contents or expiry; that lives in
/// [`CacheStore`](super::CacheStore).
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// `Ok(None)` when no entry exists for `key`.
    async fn read(&self, key: &Fingerprint) -> Result<Option<Vec<u8>>>;
    /// Replace the entry for `key`. Readers see either the old or the new bytes.
    async fn write(&self, key: &Fingerprint, value: &[u8]) -> Result<()>;
    /// `Ok(false)` when there was nothing to remove.
    async fn remove(&self, key: &Fingerprint) -> Result<bool>;
    /// Every key currently stored.
    async fn keys(&self) -> Result<Vec<Fingerprint>>;
    fn name(&self) -> &'static str;
}

/// One JSON file per entry in a single flat directory.
///
/// Only files named `<64 hex>.json` are considered entries. Anything else in
/// the directory is left alone, and subdirectories are never entered.
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Open the cache directory, creating it if absent.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::cache_storage(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &Fingerprint) -> PathBuf {
        self.dir.join(key.file_name())
    }

    // Dot-prefixed and `.tmp`-suffixed, so never mistaken for an entry.
    fn temp_path_for(&self, key: &Fingerprint) -> PathBuf {
        let nonce = uuid::Uuid::new_v4().simple();
        self.dir.join(format!(".{}.{}.tmp", key.as_str(), nonce))
    }
}

#[async_trait]
impl CacheBackend for FileCache {
    async fn read(&self, key: &Fingerprint) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::cache_storage(path, e)),
        }
    }

    async fn write(&self, key: &Fingerprint, value: &[u8]) -> Result<()> {
        let path = self.path_for(key);
        let tmp = self.temp_path_for(key);

        let written = async {
            let mut file = fs::File::create(&tmp).await?;
            file.write_all(value).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&tmp, &path).await
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp).await;
            return Err(Error::cache_storage(path, e));
        }
        Ok(())
    }

    async fn remove(&self, key: &Fingerprint) -> Result<bool> {
        let path = self.path_for(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::cache_storage(path, e)),
        }
    }

    async fn keys(&self) -> Result<Vec<Fingerprint>> {
        let mut dir = match fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::cache_storage(&self.dir, e)),
        };

        let mut keys = Vec::new();
        while let Some(item) = dir
            .next_entry()
            .await
            .map_err(|e| Error::cache_storage(&self.dir, e))?
        {
            let file_type = item
                .file_type()
                .await
                .map_err(|e| Error::cache_storage(item.path(), e))?;
            if !file_type.is_file() {
                continue;
            }
            if let Some(key) = item.file_name().to_str().and_then(Fingerprint::from_file_name) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// Backend used when caching is disabled. Touches nothing.
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheBackend for NullCache {
    async fn read(&self, _: &Fingerprint) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }
    async fn write(&self, _: &Fingerprint, _: &[u8]) -> Result<()> {
        Ok(())
    }
    async fn remove(&self, _: &Fingerprint) -> Result<bool> {
        Ok(false)
    }
    async fn keys(&self) -> Result<Vec<Fingerprint>> {
        Ok(Vec::new())
    }
    fn name(&self) -> &'static str {
        "null"
    }
}
