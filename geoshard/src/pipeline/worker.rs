//! Projection worker pool.
//!
//! Buffers are moved into the pool and handed back in input order. The
//! rayon pool is entered from a blocking task so the async runtime keeps
//! serving network I/O while coordinates are projected.

use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use super::error::PipelineError;
use super::projection::{project_buffer, project_roads};
use crate::encode::{LayerBuffer, RegionBuffers, RoadBuffer};
use crate::layer::Layer;

/// Default worker count: the machine's available parallelism.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// A bounded rayon pool for coordinate projection.
#[derive(Clone)]
pub struct ProjectionPool {
    pool: Arc<ThreadPool>,
    workers: usize,
}

impl ProjectionPool {
    /// Builds a pool with `workers` threads (at least one).
    pub fn new(workers: usize) -> Result<Self, PipelineError> {
        let workers = workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("geoshard-proj-{}", i))
            .build()
            .map_err(|e| PipelineError::Worker(e.to_string()))?;

        Ok(Self {
            pool: Arc::new(pool),
            workers,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Projects each shard in place. Shards come back in the order given.
    pub async fn project_shards(
        &self,
        shards: Vec<RoadBuffer>,
    ) -> Result<Vec<RoadBuffer>, PipelineError> {
        let pool = Arc::clone(&self.pool);
        let count = shards.len();

        let projected = tokio::task::spawn_blocking(move || {
            pool.install(|| {
                shards
                    .into_par_iter()
                    .map(|mut shard| -> Result<RoadBuffer, PipelineError> {
                        project_roads(&mut shard)?;
                        Ok(shard)
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
        })
        .await
        .map_err(|e| PipelineError::Worker(e.to_string()))??;

        debug!(shards = count, "Projected road shards");
        Ok(projected)
    }

    /// Projects every layer of `buffers` in place, one task per layer.
    pub async fn project_region(
        &self,
        buffers: RegionBuffers,
    ) -> Result<RegionBuffers, PipelineError> {
        let pool = Arc::clone(&self.pool);
        let layers: Vec<_> = buffers.into_iter().collect();

        tokio::task::spawn_blocking(move || {
            pool.install(|| {
                layers
                    .into_par_iter()
                    .map(|(layer, mut buffer)| -> Result<(Layer, LayerBuffer), PipelineError> {
                        project_buffer(&mut buffer)?;
                        Ok((layer, buffer))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
        })
        .await
        .map_err(|e| PipelineError::Worker(e.to_string()))?
        .map(|layers| layers.into_iter().collect())
    }
}
