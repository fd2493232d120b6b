//! Default values for every configuration setting.

use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;
use crate::layer::DetailLevel;
use crate::pipeline::{default_workers, DEFAULT_SHARDS};
use crate::source::{
    DEFAULT_MAX_RETRIES, DEFAULT_MIRRORS, DEFAULT_TILE_CONCURRENCY, DEFAULT_TILE_URL,
    DEFAULT_TIMEOUT_SECS,
};

/// Default log file name inside the logging directory.
pub const DEFAULT_LOG_FILE: &str = "geoshard.log";

/// Platform cache directory for the persistent tier.
pub fn default_cache_directory() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("geoshard")
}

/// `<config dir>/logs`
pub fn default_log_directory() -> PathBuf {
    config_directory().join("logs")
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            backend: SourceKind::default(),
            mirrors: DEFAULT_MIRRORS.iter().map(|m| m.to_string()).collect(),
            max_retries: DEFAULT_MAX_RETRIES,
            timeout: DEFAULT_TIMEOUT_SECS,
            tile_url: DEFAULT_TILE_URL.to_string(),
            tile_concurrency: DEFAULT_TILE_CONCURRENCY,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            directory: default_cache_directory(),
            enabled: true,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            shards: DEFAULT_SHARDS,
            workers: default_workers(),
            detail: DetailLevel::default(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            source: SourceSettings::default(),
            cache: CacheSettings::default(),
            pipeline: PipelineSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}
