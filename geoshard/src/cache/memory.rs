//! In-process tier.

use dashmap::DashMap;

use super::keys::MemoryKey;
use crate::encode::RegionBuffers;

/// Region buffers kept for the lifetime of the process.
///
/// Reads always return a copy; callers may move the buffers on to workers.
/// Writes replace whole entries.
#[derive(Debug, Default)]
pub struct MemoryTier {
    entries: DashMap<MemoryKey, RegionBuffers>,
}

impl MemoryTier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the entry for `key`.
    pub fn get(&self, key: &MemoryKey) -> Option<RegionBuffers> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn insert(&self, key: MemoryKey, buffers: RegionBuffers) {
        self.entries.insert(key, buffers);
    }

    pub fn remove(&self, key: &MemoryKey) -> Option<RegionBuffers> {
        self.entries.remove(key).map(|(_, buffers)| buffers)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
