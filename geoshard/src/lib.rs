//! GeoShard - geodata acquisition and binary encoding for parallel map rendering
//!
//! The library fetches OpenStreetMap features around a point, simplifies
//! and normalizes them, encodes each layer as a flat `f64` buffer and
//! splits the road network into shards that renderers process in
//! parallel.
//!
//! # High-Level API
//!
//! ```ignore
//! use geoshard::cache::{CacheManager, DiskBlobStore};
//! use geoshard::pipeline::{MapRequest, PipelineOrchestrator, ProjectionPool};
//! use geoshard::source::{AsyncReqwestClient, FailoverRouter, OverpassSource};
//!
//! let client = Arc::new(AsyncReqwestClient::new()?);
//! let source = OverpassSource::new(client, FailoverRouter::with_default_mirrors());
//! let cache = CacheManager::new(Arc::new(DiskBlobStore::new(cache_dir)?));
//! let orchestrator =
//!     PipelineOrchestrator::new(Arc::new(source), Arc::new(cache), ProjectionPool::new(4)?);
//!
//! let request = MapRequest::new("France", "Paris", LatLon::new(48.8566, 2.3522), 500.0);
//! let output = orchestrator.run(&request).await?;
//! ```

pub mod cache;
pub mod config;
pub mod coord;
pub mod encode;
pub mod geometry;
pub mod layer;
pub mod logging;
pub mod pipeline;
pub mod source;

/// Version of the GeoShard library and CLI.
///
/// Defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
