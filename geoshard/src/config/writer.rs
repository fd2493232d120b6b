//! INI serialization: `ConfigFile` → commented INI string.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[source]
; Feature source backend:
;   overpass - Overpass API mirrors with fail-over (default)
;   tiles    - pre-rendered GeoJSON tiles at zoom 15
backend = {}
; Comma-separated Overpass endpoints, tried in rotation
mirrors = {}
; Extra attempts after the first failure (default: 2)
max_retries = {}
; HTTP timeout in seconds (default: 60)
timeout = {}
; Tile URL template for the tiles backend
tile_url = {}
; Tiles fetched at once by the tiles backend (default: 8)
tile_concurrency = {}

[cache]
; Directory for the persistent cache (gzip-compressed GeoJSON per layer)
directory = {}
; Set to false to keep results in memory only
enabled = {}

[pipeline]
; Number of road shards handed to renderers (default: 4)
shards = {}
; Projection worker threads (default: number of CPU cores)
workers = {}
; Road detail: simplified (major roads only past 5 km) or detailed
detail = {}

[logging]
; Directory for log files
directory = {}
; Log file name, truncated at the start of each run
file = {}
"#,
        config.source.backend,
        config.source.mirrors.join(", "),
        config.source.max_retries,
        config.source.timeout,
        config.source.tile_url,
        config.source.tile_concurrency,
        path_to_string(&config.cache.directory),
        config.cache.enabled,
        config.pipeline.shards,
        config.pipeline.workers,
        config.pipeline.detail,
        path_to_string(&config.logging.directory),
        config.logging.file,
    )
}

/// Renders a path, abbreviating the home directory as `~`.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
