//! Source error type and the feature source trait.

use std::future::Future;

use thiserror::Error;

use crate::coord::{CoordError, LatLon};
use crate::geometry::FeatureCollection;
use crate::layer::{DetailLevel, Layer};

use super::query::TagFilter;

/// Errors raised while acquiring geodata.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    /// Network failure or non-2xx status
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Request parameters rejected before any network call
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Response body could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Tile source request exceeds the per-request tile cap
    #[error("Request covers {requested} tiles, the cap is {cap}")]
    TooManyTiles { requested: usize, cap: usize },
}

impl SourceError {
    /// Whether another mirror might answer this request successfully.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SourceError::Transport(_) | SourceError::InvalidResponse(_)
        )
    }
}

impl From<CoordError> for SourceError {
    fn from(err: CoordError) -> Self {
        SourceError::MalformedInput(err.to_string())
    }
}

/// A remote service that returns normalized, cleaned feature collections.
///
/// Implementations validate the region before touching the network, convert
/// the service's native representation, and run the cleaning pass.
pub trait FeatureSource: Send + Sync {
    /// Fetches the street network around `center`.
    fn fetch_roads(
        &self,
        center: LatLon,
        radius_m: f64,
        detail: DetailLevel,
    ) -> impl Future<Output = Result<FeatureCollection, SourceError>> + Send;

    /// Fetches polygon features matching any of `filters`.
    fn fetch_features(
        &self,
        center: LatLon,
        radius_m: f64,
        filters: &[TagFilter],
        layer: Layer,
    ) -> impl Future<Output = Result<FeatureCollection, SourceError>> + Send;

    /// Fetches point features of the fixed POI categories.
    fn fetch_pois(
        &self,
        center: LatLon,
        radius_m: f64,
    ) -> impl Future<Output = Result<FeatureCollection, SourceError>> + Send;

    /// Name used in logs.
    fn name(&self) -> &str;
}
