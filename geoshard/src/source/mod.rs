//! Geodata acquisition.
//!
//! Two interchangeable [`FeatureSource`] implementations are provided: the
//! query-based [`OverpassSource`], which spreads requests across mirrors
//! through a [`FailoverRouter`], and the tile-based [`TileSource`]. Both
//! return cleaned, normalized feature collections.
//!
//! HTTP access goes through [`AsyncHttpClient`] so tests can script
//! responses with the doubles in [`testing`].

mod failover;
mod http;
mod overpass;
mod query;
mod tile;
mod types;

pub mod testing;

pub use failover::{FailoverRouter, MirrorRotation, DEFAULT_MAX_RETRIES, DEFAULT_MIRRORS};
pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use overpass::OverpassSource;
pub use query::{
    feature_query, layer_filters, matches_any, park_filters, poi_filters, road_classes,
    road_query, water_filters, TagFilter, TagMatch, MAJOR_ROAD_CLASSES, MINOR_ROAD_CLASSES,
    SIMPLIFIED_RADIUS_THRESHOLD_M,
};
pub use tile::{
    TileSource, DEFAULT_TILE_CONCURRENCY, DEFAULT_TILE_URL, MAX_TILES_PER_REQUEST, TILE_ZOOM,
};
pub use types::{FeatureSource, SourceError};

use std::sync::Arc;

use crate::coord::LatLon;
use crate::geometry::FeatureCollection;
use crate::layer::{DetailLevel, Layer};

/// Runtime choice between the two source kinds.
pub enum SourceBackend<C: AsyncHttpClient> {
    Overpass(OverpassSource<C>),
    Tiles(TileSource<C>),
}

impl<C: AsyncHttpClient> SourceBackend<C> {
    pub fn overpass(client: Arc<C>, router: FailoverRouter) -> Self {
        SourceBackend::Overpass(OverpassSource::new(client, router))
    }

    pub fn tiles(client: Arc<C>, url_template: impl Into<String>, concurrency: usize) -> Self {
        SourceBackend::Tiles(TileSource::new(client, url_template).with_concurrency(concurrency))
    }
}

impl<C: AsyncHttpClient> FeatureSource for SourceBackend<C> {
    async fn fetch_roads(
        &self,
        center: LatLon,
        radius_m: f64,
        detail: DetailLevel,
    ) -> Result<FeatureCollection, SourceError> {
        match self {
            SourceBackend::Overpass(s) => s.fetch_roads(center, radius_m, detail).await,
            SourceBackend::Tiles(s) => s.fetch_roads(center, radius_m, detail).await,
        }
    }

    async fn fetch_features(
        &self,
        center: LatLon,
        radius_m: f64,
        filters: &[TagFilter],
        layer: Layer,
    ) -> Result<FeatureCollection, SourceError> {
        match self {
            SourceBackend::Overpass(s) => s.fetch_features(center, radius_m, filters, layer).await,
            SourceBackend::Tiles(s) => s.fetch_features(center, radius_m, filters, layer).await,
        }
    }

    async fn fetch_pois(
        &self,
        center: LatLon,
        radius_m: f64,
    ) -> Result<FeatureCollection, SourceError> {
        match self {
            SourceBackend::Overpass(s) => s.fetch_pois(center, radius_m).await,
            SourceBackend::Tiles(s) => s.fetch_pois(center, radius_m).await,
        }
    }

    fn name(&self) -> &str {
        match self {
            SourceBackend::Overpass(s) => s.name(),
            SourceBackend::Tiles(s) => s.name(),
        }
    }
}

/// Fetches one layer from `source` using the layer's fixed tag set.
pub async fn fetch_layer<S: FeatureSource>(
    source: &S,
    layer: Layer,
    center: LatLon,
    radius_m: f64,
    detail: DetailLevel,
) -> Result<FeatureCollection, SourceError> {
    match layer {
        Layer::Roads => source.fetch_roads(center, radius_m, detail).await,
        Layer::Water | Layer::Parks => {
            let filters = layer_filters(layer);
            source.fetch_features(center, radius_m, &filters, layer).await
        }
        Layer::Pois => source.fetch_pois(center, radius_m).await,
    }
}
