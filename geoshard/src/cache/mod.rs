//! Two-tier cache for fetched regions.
//!
//! The memory tier maps `<country>:<city>:<radius>` to encoded buffers for
//! the life of the process. The persistent tier stores one gzip-compressed
//! GeoJSON blob per `<country>:<city>:<radius>:<detail>:<layer>` key.
//! [`CacheManager`] checks memory, then disk, then fetches, and writes
//! fetched data back through both tiers.

mod codec;
mod error;
mod keys;
mod manager;
mod memory;
mod stats;
mod store;

pub use codec::{decode_blob, encode_blob};
pub use error::CacheError;
pub use keys::{MemoryKey, PersistentKey};
pub use manager::{CacheManager, CacheOutcome, RegionSpec};
pub use memory::MemoryTier;
pub use stats::{CacheCounters, CacheStats};
pub use store::{BlobStore, BoxFuture, DiskBlobStore, NoopBlobStore, StoreStats, BLOB_EXTENSION};
