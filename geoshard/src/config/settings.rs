//! Settings structs for each configuration section.
//!
//! Each struct represents one `[section]` of the INI file. These are pure
//! data types with no parsing or serialization logic.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::layer::DetailLevel;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub source: SourceSettings,
    pub cache: CacheSettings,
    pub pipeline: PipelineSettings,
    pub logging: LoggingSettings,
}

/// Which feature source the CLI builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    /// Query-based Overpass mirrors
    #[default]
    Overpass,
    /// Pre-rendered GeoJSON tiles
    Tiles,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Overpass => "overpass",
            SourceKind::Tiles => "tiles",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "overpass" => Ok(SourceKind::Overpass),
            "tiles" => Ok(SourceKind::Tiles),
            other => Err(format!("unknown source backend '{}'", other)),
        }
    }
}

/// `[source]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSettings {
    pub backend: SourceKind,
    /// Overpass endpoints in rotation order
    pub mirrors: Vec<String>,
    /// Extra attempts after the first failure
    pub max_retries: usize,
    /// HTTP client timeout in seconds
    pub timeout: u64,
    /// Tile URL template with `{z}`, `{x}` and `{y}` placeholders
    pub tile_url: String,
    /// Tiles fetched at once by the tiles backend
    pub tile_concurrency: usize,
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    /// Directory holding the persistent tier
    pub directory: PathBuf,
    /// When false, only the in-process memory tier is used
    pub enabled: bool,
}

/// `[pipeline]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub shards: usize,
    /// Projection worker threads
    pub workers: usize,
    pub detail: DetailLevel,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub file: String,
}
