//! INI parsing: `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;
use std::str::FromStr;

use super::file::ConfigFileError;
use super::settings::{ConfigFile, SourceKind};
use crate::layer::DetailLevel;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [source] section
    if let Some(section) = ini.section(Some("source")) {
        if let Some(v) = section.get("backend") {
            config.source.backend = parse_value::<SourceKind>(
                "source",
                "backend",
                v,
                "must be 'overpass' or 'tiles'",
            )?;
        }
        if let Some(v) = section.get("mirrors") {
            let mirrors: Vec<String> = v
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect();
            if mirrors.is_empty() {
                return Err(invalid(
                    "source",
                    "mirrors",
                    v,
                    "at least one mirror URL is required",
                ));
            }
            config.source.mirrors = mirrors;
        }
        if let Some(v) = section.get("max_retries") {
            config.source.max_retries =
                parse_value("source", "max_retries", v, "must be a non-negative integer")?;
        }
        if let Some(v) = section.get("timeout") {
            config.source.timeout = parse_positive(
                "source",
                "timeout",
                v,
                "must be a positive integer (seconds)",
            )?;
        }
        if let Some(v) = section.get("tile_url") {
            let v = v.trim();
            if !(v.contains("{z}") && v.contains("{x}") && v.contains("{y}")) {
                return Err(invalid(
                    "source",
                    "tile_url",
                    v,
                    "must contain {z}, {x} and {y} placeholders",
                ));
            }
            config.source.tile_url = v.to_string();
        }
        if let Some(v) = section.get("tile_concurrency") {
            config.source.tile_concurrency =
                parse_positive("source", "tile_concurrency", v, "must be a positive integer")?;
        }
    }

    // [cache] section
    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.cache.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("enabled") {
            config.cache.enabled = parse_bool(v);
        }
    }

    // [pipeline] section
    if let Some(section) = ini.section(Some("pipeline")) {
        if let Some(v) = section.get("shards") {
            config.pipeline.shards =
                parse_positive("pipeline", "shards", v, "must be a positive integer")?;
        }
        if let Some(v) = section.get("workers") {
            config.pipeline.workers =
                parse_positive("pipeline", "workers", v, "must be a positive integer")?;
        }
        if let Some(v) = section.get("detail") {
            config.pipeline.detail = parse_value::<DetailLevel>(
                "pipeline",
                "detail",
                v,
                "must be 'simplified' or 'detailed'",
            )?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = v.to_string();
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_value<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

fn parse_positive<T>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError>
where
    T: FromStr + PartialOrd + Default,
{
    let parsed: T = parse_value(section, key, value, reason)?;
    if parsed <= T::default() {
        return Err(invalid(section, key, value, reason));
    }
    Ok(parsed)
}

/// Parse a boolean value from string.
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
