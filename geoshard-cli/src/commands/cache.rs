//! Cache management CLI commands.

use clap::Subcommand;
use geoshard::cache::{BlobStore, DiskBlobStore};
use geoshard::config::ConfigFile;

use super::common::{block_on, format_bytes};
use crate::error::CliError;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Remove every persisted layer blob
    Clear,
    /// Show persistent cache statistics
    Stats,
}

/// Run a cache subcommand.
pub fn run(action: CacheAction) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let cache_dir = &config.cache.directory;
    let store = DiskBlobStore::new(cache_dir)?;

    match action {
        CacheAction::Clear => {
            println!("Clearing persistent cache at: {}", cache_dir.display());
            let removed = block_on(store.clear())??;
            println!("Deleted {} cached layers", removed);
        }
        CacheAction::Stats => {
            let stats = block_on(store.stats())??;
            println!("Persistent cache: {}", cache_dir.display());
            println!("  Enabled: {}", config.cache.enabled);
            println!("  Layers:  {}", stats.entries);
            println!("  Size:    {}", format_bytes(stats.size_bytes));
        }
    }

    Ok(())
}
