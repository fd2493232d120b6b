//! CLI command implementations.
//!
//! - [`cache`] - Persistent cache management (clear, stats)
//! - [`config`] - Configuration file management (init, path, show)
//! - [`fetch`] - Fetch, encode and shard a region

pub mod cache;
pub mod common;
pub mod config;
pub mod fetch;
