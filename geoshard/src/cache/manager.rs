//! Two-tier cache coordination.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::codec::{decode_blob, encode_blob};
use super::keys::{MemoryKey, PersistentKey};
use super::memory::MemoryTier;
use super::stats::{CacheCounters, CacheStats};
use super::store::BlobStore;
use crate::encode::{LayerBuffer, RegionBuffers};
use crate::geometry::FeatureCollection;
use crate::layer::{DetailLevel, Layer};

/// Identifies a cached region.
#[derive(Debug, Clone, Copy)]
pub struct RegionSpec<'a> {
    pub country: &'a str,
    pub city: &'a str,
    pub radius_m: f64,
    pub detail: DetailLevel,
    pub layers: &'a [Layer],
}

impl RegionSpec<'_> {
    pub fn memory_key(&self) -> MemoryKey {
        MemoryKey::new(self.country, self.city, self.radius_m)
    }

    pub fn persistent_key(&self, layer: Layer) -> PersistentKey {
        PersistentKey::new(self.country, self.city, self.radius_m, self.detail, layer)
    }
}

/// Result of [`CacheManager::get_or_fetch`].
#[derive(Debug, Clone, PartialEq)]
pub struct CacheOutcome {
    /// Owned buffers for the requested layers
    pub buffers: RegionBuffers,
    /// True when served by either tier without fetching
    pub from_cache: bool,
}

/// Memory tier in front of a persistent blob store.
///
/// The memory tier holds encoded buffers keyed without the detail level.
/// The persistent tier holds the cleaned JSON per layer, so changes to the
/// binary layouts never invalidate it.
pub struct CacheManager {
    memory: MemoryTier,
    store: Arc<dyn BlobStore>,
    counters: Arc<CacheCounters>,
    pending_writes: Mutex<Vec<JoinHandle<()>>>,
}

impl CacheManager {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self {
            memory: MemoryTier::new(),
            store,
            counters: Arc::new(CacheCounters::new()),
            pending_writes: Mutex::new(Vec::new()),
        }
    }

    /// Returns buffers for `spec`, fetching on a miss.
    ///
    /// Tiers are checked in order: memory (entry must hold every requested
    /// layer), then persistent (every layer blob must be present and
    /// readable), then `fetch`. Fetched collections are encoded, written
    /// through to the persistent tier in the background, and stored in the
    /// memory tier. Only a failing `fetch` fails the call.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        spec: RegionSpec<'_>,
        fetch: F,
    ) -> Result<CacheOutcome, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<(Layer, FeatureCollection)>, E>>,
    {
        let memory_key = spec.memory_key();

        if let Some(entry) = self.memory.get(&memory_key) {
            if entry.contains_all(spec.layers) {
                self.counters.record_memory_hit();
                debug!(key = %memory_key, "Memory cache hit");
                return Ok(CacheOutcome {
                    buffers: entry.select(spec.layers),
                    from_cache: true,
                });
            }
        }

        if let Some(buffers) = self.read_persistent(&spec).await {
            self.counters.record_persistent_hit();
            info!(key = %memory_key, layers = buffers.len(), "Persistent cache hit");
            self.remember(memory_key, buffers.clone());
            return Ok(CacheOutcome {
                buffers,
                from_cache: true,
            });
        }

        self.counters.record_miss();
        debug!(key = %memory_key, "Cache miss, fetching");

        let collections = fetch().await?;
        let mut buffers = RegionBuffers::new();
        for (layer, collection) in collections {
            buffers.insert(layer, LayerBuffer::encode(layer, &collection));
            self.write_through(spec.persistent_key(layer), collection);
        }

        self.remember(memory_key, buffers.clone());
        Ok(CacheOutcome {
            buffers,
            from_cache: false,
        })
    }

    /// Reads every requested layer from the persistent tier. Any missing,
    /// unreadable or undecodable layer makes the whole read a miss.
    async fn read_persistent(&self, spec: &RegionSpec<'_>) -> Option<RegionBuffers> {
        if spec.layers.is_empty() {
            return None;
        }

        let keys: Vec<_> = spec
            .layers
            .iter()
            .map(|layer| (*layer, spec.persistent_key(*layer)))
            .collect();
        let reads = join_all(keys.iter().map(|(_, key)| self.store.get(key))).await;

        let mut buffers = RegionBuffers::new();
        for ((layer, key), read) in keys.iter().zip(reads) {
            let blob = match read {
                Ok(Some(blob)) => blob,
                Ok(None) => return None,
                Err(e) => {
                    warn!(key = %key, error = %e, "Persistent cache read failed");
                    return None;
                }
            };

            match decode_blob(&blob) {
                Ok(collection) => buffers.insert(*layer, LayerBuffer::encode(*layer, &collection)),
                Err(e) => {
                    self.counters.record_decode_failure();
                    warn!(key = %key, error = %e, "Corrupt cache blob, treating as miss");
                    return None;
                }
            }
        }

        Some(buffers)
    }

    /// Replaces the memory entry with `buffers` merged over what it held.
    fn remember(&self, key: MemoryKey, buffers: RegionBuffers) {
        let mut entry = self.memory.get(&key).unwrap_or_default();
        entry.merge(buffers);
        self.memory.insert(key, entry);
    }

    fn write_through(&self, key: PersistentKey, collection: FeatureCollection) {
        let store = Arc::clone(&self.store);
        let counters = Arc::clone(&self.counters);

        let handle = tokio::spawn(async move {
            let result = match encode_blob(&collection) {
                Ok(blob) => store.put(&key, blob).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => {
                    counters.record_write();
                    debug!(key = %key, "Cache write complete");
                }
                Err(e) => {
                    counters.record_write_failure();
                    warn!(key = %key, error = %e, "Cache write failed");
                }
            }
        });

        let mut pending = self.pending_writes.lock();
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    /// Waits for every background write started so far.
    pub async fn flush(&self) {
        let handles: Vec<_> = std::mem::take(&mut *self.pending_writes.lock());
        for result in join_all(handles).await {
            if let Err(e) = result {
                warn!(error = %e, "Cache write task failed");
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    pub fn memory(&self) -> &MemoryTier {
        &self.memory
    }
}
