//! Request pipeline.
//!
//! [`PipelineOrchestrator::run`] takes a [`MapRequest`] through the cache,
//! fetches missing layers concurrently, shards the road network and
//! optionally projects every buffer on the [`ProjectionPool`].

mod error;
mod orchestrator;
mod projection;
mod request;
mod worker;

pub use error::PipelineError;
pub use orchestrator::{PipelineOrchestrator, PipelineOutput};
pub use projection::{project_buffer, project_roads};
pub use request::{MapRequest, DEFAULT_SHARDS};
pub use worker::{default_workers, ProjectionPool};
