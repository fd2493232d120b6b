//! Request orchestration: cache lookup, concurrent fetch, encode, shard
//! and optional projection.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info};

use super::error::PipelineError;
use super::request::MapRequest;
use super::worker::ProjectionPool;
use crate::cache::CacheManager;
use crate::encode::{shard_roads, RegionBuffers, RoadBuffer};
use crate::source::{fetch_layer, FeatureSource, SourceError};

/// Buffers produced for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Road network split for parallel rendering, in feature order
    pub road_shards: Vec<RoadBuffer>,
    /// Every other requested layer
    pub buffers: RegionBuffers,
    pub from_cache: bool,
    /// Coordinates are Web Mercator meters rather than degrees
    pub projected: bool,
}

impl PipelineOutput {
    pub fn road_feature_count(&self) -> usize {
        self.road_shards.iter().map(RoadBuffer::feature_count).sum()
    }
}

/// Drives a [`MapRequest`] through the cache, the source and the workers.
pub struct PipelineOrchestrator<S: FeatureSource> {
    source: Arc<S>,
    cache: Arc<CacheManager>,
    pool: ProjectionPool,
}

impl<S: FeatureSource> PipelineOrchestrator<S> {
    pub fn new(source: Arc<S>, cache: Arc<CacheManager>, pool: ProjectionPool) -> Self {
        Self {
            source,
            cache,
            pool,
        }
    }

    pub fn cache(&self) -> &Arc<CacheManager> {
        &self.cache
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Produces the buffers for `request`.
    ///
    /// Layers are fetched concurrently on a cache miss. A single failed
    /// layer fails the whole request; nothing partial is returned.
    pub async fn run(&self, request: &MapRequest) -> Result<PipelineOutput, PipelineError> {
        request.validate()?;

        info!(
            country = %request.country,
            city = %request.city,
            radius_m = request.radius_m,
            detail = %request.detail,
            layers = request.layers.len(),
            source = self.source.name(),
            "Processing map request"
        );

        let source = &*self.source;
        let outcome = self
            .cache
            .get_or_fetch(request.region(), || {
                try_join_all(request.layers.iter().map(|&layer| async move {
                    let collection = fetch_layer(
                        source,
                        layer,
                        request.center,
                        request.radius_m,
                        request.detail,
                    )
                    .await?;
                    debug!(layer = %layer, features = collection.len(), "Layer fetched");
                    Ok::<_, SourceError>((layer, collection))
                }))
            })
            .await?;

        let mut buffers = outcome.buffers;
        let road_shards = match buffers.take_roads() {
            Some(roads) => shard_roads(roads, request.shards),
            None => Vec::new(),
        };

        let sizes: Vec<usize> = road_shards.iter().map(RoadBuffer::feature_count).collect();
        debug!(shards = ?sizes, "Road network sharded");

        let (road_shards, buffers) = if request.project {
            let shards = self.pool.project_shards(road_shards).await?;
            let buffers = self.pool.project_region(buffers).await?;
            (shards, buffers)
        } else {
            (road_shards, buffers)
        };

        let output = PipelineOutput {
            road_shards,
            buffers,
            from_cache: outcome.from_cache,
            projected: request.project,
        };

        info!(
            from_cache = output.from_cache,
            road_features = output.road_feature_count(),
            shards = output.road_shards.len(),
            "Map request complete"
        );
        Ok(output)
    }
}
