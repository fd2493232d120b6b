use thiserror::Error;

/// Cache-related errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// I/O error, including gzip (de)compression failures
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Blob is not a valid feature collection
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A blocking cache task panicked or was cancelled
    #[error("Cache task failed: {0}")]
    Task(String),
}
