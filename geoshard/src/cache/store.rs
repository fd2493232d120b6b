//! Persistent blob stores.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::error::CacheError;
use super::keys::PersistentKey;

/// Boxed future returned by object-safe store methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// File extension of stored blobs.
pub const BLOB_EXTENSION: &str = "json.gz";

/// Size summary of a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub entries: u64,
    pub size_bytes: u64,
}

/// Durable key/blob storage used as the persistent cache tier.
///
/// Concurrent writers to one key race with last-write-wins semantics.
pub trait BlobStore: Send + Sync {
    /// Reads the blob for `key`, `None` when absent.
    fn get(&self, key: &PersistentKey) -> BoxFuture<'_, Result<Option<Vec<u8>>, CacheError>>;

    /// Stores `blob` under `key`, replacing any previous value.
    fn put(&self, key: &PersistentKey, blob: Vec<u8>) -> BoxFuture<'_, Result<(), CacheError>>;

    /// Removes every blob and returns how many were removed.
    ///
    /// Disk-backed stores also drop temporary files left by interrupted
    /// writes; those are not counted.
    fn clear(&self) -> BoxFuture<'_, Result<u64, CacheError>>;

    fn stats(&self) -> BoxFuture<'_, Result<StoreStats, CacheError>>;
}

/// Store that keeps nothing. Used when the persistent tier is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBlobStore;

impl BlobStore for NoopBlobStore {
    fn get(&self, _key: &PersistentKey) -> BoxFuture<'_, Result<Option<Vec<u8>>, CacheError>> {
        Box::pin(async { Ok(None) })
    }

    fn put(&self, _key: &PersistentKey, _blob: Vec<u8>) -> BoxFuture<'_, Result<(), CacheError>> {
        Box::pin(async { Ok(()) })
    }

    fn clear(&self) -> BoxFuture<'_, Result<u64, CacheError>> {
        Box::pin(async { Ok(0) })
    }

    fn stats(&self) -> BoxFuture<'_, Result<StoreStats, CacheError>> {
        Box::pin(async { Ok(StoreStats::default()) })
    }
}

/// One file per key in a flat directory.
///
/// File names are the SHA-256 of the key, so any key maps to a safe name.
/// Writes go to a unique temporary file that is then renamed into place.
#[derive(Debug)]
pub struct DiskBlobStore {
    directory: PathBuf,
    write_seq: AtomicU64,
}

impl DiskBlobStore {
    /// Opens a store rooted at `directory`, creating it if needed.
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory)?;
        Ok(Self {
            directory,
            write_seq: AtomicU64::new(0),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn key_to_filename(key: &PersistentKey) -> String {
        let digest = Sha256::digest(key.as_str().as_bytes());
        format!("{:x}.{}", digest, BLOB_EXTENSION)
    }

    /// Path of the blob for `key`.
    pub fn key_path(&self, key: &PersistentKey) -> PathBuf {
        self.directory.join(Self::key_to_filename(key))
    }

    fn is_blob_name(name: &str) -> bool {
        name.ends_with(BLOB_EXTENSION)
    }

    /// Leftover of a write that never reached its rename.
    fn is_temp_name(name: &str) -> bool {
        name.ends_with(".tmp") && name.contains(".json.")
    }

    fn blob_files(directory: &Path) -> Result<Vec<(PathBuf, u64)>, CacheError> {
        Self::files_matching(directory, Self::is_blob_name)
    }

    fn files_matching(
        directory: &Path,
        matches: impl Fn(&str) -> bool,
    ) -> Result<Vec<(PathBuf, u64)>, CacheError> {
        let mut files = Vec::new();
        let entries = match std::fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(files),
            Err(e) => return Err(e.into()),
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let wanted = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(&matches);
            if !wanted {
                continue;
            }
            if let Ok(metadata) = entry.metadata() {
                if metadata.is_file() {
                    files.push((path, metadata.len()));
                }
            }
        }
        Ok(files)
    }
}

impl BlobStore for DiskBlobStore {
    fn get(&self, key: &PersistentKey) -> BoxFuture<'_, Result<Option<Vec<u8>>, CacheError>> {
        let path = self.key_path(key);
        Box::pin(async move {
            match tokio::fs::read(&path).await {
                Ok(data) => Ok(Some(data)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(CacheError::Io(e)),
            }
        })
    }

    fn put(&self, key: &PersistentKey, blob: Vec<u8>) -> BoxFuture<'_, Result<(), CacheError>> {
        let path = self.key_path(key);
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        let temp_path = path.with_extension(format!("{}.{}.tmp", std::process::id(), seq));
        Box::pin(async move {
            tokio::fs::write(&temp_path, &blob).await?;
            if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
                let _ = tokio::fs::remove_file(&temp_path).await;
                return Err(e.into());
            }
            debug!(path = %path.display(), bytes = blob.len(), "Blob written");
            Ok(())
        })
    }

    fn clear(&self) -> BoxFuture<'_, Result<u64, CacheError>> {
        let directory = self.directory.clone();
        Box::pin(async move {
            let removed = tokio::task::spawn_blocking(move || {
                let mut removed = 0u64;
                for (path, _) in Self::blob_files(&directory)? {
                    std::fs::remove_file(&path)?;
                    removed += 1;
                }
                let stale = Self::files_matching(&directory, Self::is_temp_name)?;
                for (path, _) in &stale {
                    std::fs::remove_file(path)?;
                }
                if !stale.is_empty() {
                    debug!(count = stale.len(), "Removed stale temporary files");
                }
                Ok::<_, CacheError>(removed)
            })
            .await
            .map_err(|e| CacheError::Task(e.to_string()))??;

            info!(removed, "Persistent cache cleared");
            Ok(removed)
        })
    }

    fn stats(&self) -> BoxFuture<'_, Result<StoreStats, CacheError>> {
        let directory = self.directory.clone();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || {
                let files = Self::blob_files(&directory)?;
                Ok(StoreStats {
                    entries: files.len() as u64,
                    size_bytes: files.iter().map(|(_, size)| size).sum(),
                })
            })
            .await
            .map_err(|e| CacheError::Task(e.to_string()))?
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{DetailLevel, Layer};
    use tempfile::TempDir;

    fn key(layer: Layer) -> PersistentKey {
        PersistentKey::new("France", "Paris", 500.0, DetailLevel::Simplified, layer)
    }

    fn create_temp_store() -> (DiskBlobStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = DiskBlobStore::new(temp_dir.path().join("blobs")).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn test_filename_is_sha256_of_key() {
        let name = DiskBlobStore::key_to_filename(&key(Layer::Roads));
        assert!(name.ends_with(".json.gz"));
        assert_eq!(name.len(), 64 + ".json.gz".len());
        assert_ne!(name, DiskBlobStore::key_to_filename(&key(Layer::Water)));
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let (store, _temp) = create_temp_store();
        store.put(&key(Layer::Roads), vec![1, 2, 3]).await.unwrap();

        assert_eq!(store.get(&key(Layer::Roads)).await.unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(store.get(&key(Layer::Water)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let (store, _temp) = create_temp_store();
        store.put(&key(Layer::Roads), vec![1]).await.unwrap();
        store.put(&key(Layer::Roads), vec![2, 2]).await.unwrap();

        assert_eq!(store.get(&key(Layer::Roads)).await.unwrap(), Some(vec![2, 2]));
        let stats = store.stats().await.unwrap();
        assert_eq!(stats, StoreStats { entries: 1, size_bytes: 2 });
    }

    #[tokio::test]
    async fn test_persistence_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = DiskBlobStore::new(temp_dir.path()).unwrap();
            store.put(&key(Layer::Parks), vec![9; 16]).await.unwrap();
        }
        let reopened = DiskBlobStore::new(temp_dir.path()).unwrap();
        assert_eq!(reopened.get(&key(Layer::Parks)).await.unwrap(), Some(vec![9; 16]));
    }

    #[tokio::test]
    async fn test_clear_removes_blobs_only() {
        let (store, _temp) = create_temp_store();
        store.put(&key(Layer::Roads), vec![1]).await.unwrap();
        store.put(&key(Layer::Water), vec![2]).await.unwrap();
        std::fs::write(store.directory().join("notes.txt"), b"keep").unwrap();

        assert_eq!(store.clear().await.unwrap(), 2);
        assert_eq!(store.stats().await.unwrap().entries, 0);
        assert!(store.directory().join("notes.txt").exists());
    }

    #[tokio::test]
    async fn test_clear_removes_interrupted_writes() {
        let (store, _temp) = create_temp_store();
        store.put(&key(Layer::Roads), vec![1]).await.unwrap();
        let blob = store.key_path(&key(Layer::Water));
        let leftover = blob.with_extension("4242.0.tmp");
        std::fs::write(&leftover, b"partial").unwrap();

        assert_eq!(store.stats().await.unwrap().entries, 1);
        assert_eq!(store.clear().await.unwrap(), 1);
        assert!(!leftover.exists());
        assert_eq!(std::fs::read_dir(store.directory()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_noop_store_keeps_nothing() {
        let store = NoopBlobStore;
        store.put(&key(Layer::Roads), vec![1]).await.unwrap();
        assert_eq!(store.get(&key(Layer::Roads)).await.unwrap(), None);
    }
}
