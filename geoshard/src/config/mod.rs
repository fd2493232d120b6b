//! Configuration file support for `~/.geoshard/config.ini`.
//!
//! Settings structs live in [`settings`], defaults in [`defaults`], INI
//! parsing in `parser` and serialization in `writer`.

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFile, ConfigFileError};
pub use settings::{CacheSettings, LoggingSettings, PipelineSettings, SourceKind, SourceSettings};
