//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and exit codes.

use std::fmt;
use std::process;

use geoshard::cache::CacheError;
use geoshard::config::ConfigFileError;
use geoshard::pipeline::PipelineError;
use geoshard::source::SourceError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to start the async runtime
    Runtime(String),
    /// Failed to build the HTTP client or mirror router
    SourceSetup(SourceError),
    /// Persistent cache error
    Cache(CacheError),
    /// The pipeline failed to produce buffers
    Fetch(PipelineError),
    /// Failed to write an output file
    FileWrite { path: String, error: std::io::Error },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Fetch(PipelineError::Source(SourceError::Transport(_))) => {
                eprintln!();
                eprintln!("Every mirror failed. Check your connection or list other");
                eprintln!("endpoints under [source] mirrors in the config file.");
            }
            CliError::Fetch(PipelineError::Source(SourceError::TooManyTiles { .. })) => {
                eprintln!();
                eprintln!("Reduce --radius or switch to the overpass backend.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Runtime(msg) => write!(f, "Failed to start runtime: {}", msg),
            CliError::SourceSetup(e) => write!(f, "Failed to set up feature source: {}", e),
            CliError::Cache(e) => write!(f, "Cache error: {}", e),
            CliError::Fetch(e) => write!(f, "Failed to fetch map data: {}", e),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path, error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::SourceSetup(e) => Some(e),
            CliError::Cache(e) => Some(e),
            CliError::Fetch(e) => Some(e),
            CliError::FileWrite { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<CacheError> for CliError {
    fn from(e: CacheError) -> Self {
        CliError::Cache(e)
    }
}

impl From<PipelineError> for CliError {
    fn from(e: PipelineError) -> Self {
        CliError::Fetch(e)
    }
}
