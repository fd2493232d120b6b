//! Error types for the acquisition pipeline.

use thiserror::Error;

use crate::encode::DecodeError;
use crate::source::SourceError;

/// Errors that end a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Request parameters are unusable
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A layer fetch failed, failing the whole request
    #[error("fetch failed: {0}")]
    Source(#[from] SourceError),

    /// A buffer handed to the workers is not a valid layout
    #[error("corrupt buffer: {0}")]
    Decode(#[from] DecodeError),

    /// The projection pool could not be built or a task panicked
    #[error("worker pool failure: {0}")]
    Worker(String),
}
