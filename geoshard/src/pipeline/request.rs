//! Map request parameters.

use crate::cache::RegionSpec;
use crate::coord::LatLon;
use crate::layer::{DetailLevel, Layer};

use super::error::PipelineError;

/// Default number of road shards.
pub const DEFAULT_SHARDS: usize = 4;

/// Everything needed to produce the buffers for one map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapRequest {
    pub country: String,
    pub city: String,
    pub center: LatLon,
    pub radius_m: f64,
    pub detail: DetailLevel,
    pub layers: Vec<Layer>,
    pub shards: usize,
    /// Project coordinates to Web Mercator meters before returning
    pub project: bool,
}

impl MapRequest {
    /// A request for the standard layers with default detail and sharding.
    pub fn new(
        country: impl Into<String>,
        city: impl Into<String>,
        center: LatLon,
        radius_m: f64,
    ) -> Self {
        Self {
            country: country.into(),
            city: city.into(),
            center,
            radius_m,
            detail: DetailLevel::default(),
            layers: Layer::STANDARD.to_vec(),
            shards: DEFAULT_SHARDS,
            project: false,
        }
    }

    pub fn with_detail(mut self, detail: DetailLevel) -> Self {
        self.detail = detail;
        self
    }

    /// Replaces the layer list, dropping duplicates but keeping order.
    pub fn with_layers(mut self, layers: &[Layer]) -> Self {
        self.layers.clear();
        for layer in layers {
            if !self.layers.contains(layer) {
                self.layers.push(*layer);
            }
        }
        self
    }

    pub fn with_shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    pub fn with_projection(mut self, project: bool) -> Self {
        self.project = project;
        self
    }

    /// Cache identity of this request.
    pub fn region(&self) -> RegionSpec<'_> {
        RegionSpec {
            country: &self.country,
            city: &self.city,
            radius_m: self.radius_m,
            detail: self.detail,
            layers: &self.layers,
        }
    }

    /// Rejects requests that could never be fetched.
    ///
    /// Coordinates themselves are validated by the sources, which refuse a
    /// non-finite bounding box before any network call.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(self.radius_m.is_finite() && self.radius_m > 0.0) {
            return Err(PipelineError::InvalidRequest(format!(
                "radius must be a positive number of meters, got {}",
                self.radius_m
            )));
        }
        if self.layers.is_empty() {
            return Err(PipelineError::InvalidRequest(
                "at least one layer is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paris() -> MapRequest {
        MapRequest::new("France", "Paris", LatLon::new(48.8566, 2.3522), 500.0)
    }

    #[test]
    fn test_defaults() {
        let request = paris();
        assert_eq!(request.layers, Layer::STANDARD.to_vec());
        assert_eq!(request.detail, DetailLevel::Simplified);
        assert_eq!(request.shards, DEFAULT_SHARDS);
        assert!(!request.project);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_with_layers_dedups() {
        let request = paris().with_layers(&[Layer::Pois, Layer::Roads, Layer::Pois]);
        assert_eq!(request.layers, vec![Layer::Pois, Layer::Roads]);
    }

    #[test]
    fn test_validate_rejects_bad_radius_and_empty_layers() {
        for radius in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let mut request = paris();
            request.radius_m = radius;
            assert!(matches!(request.validate(), Err(PipelineError::InvalidRequest(_))));
        }
        assert!(paris().with_layers(&[]).validate().is_err());
    }

    #[test]
    fn test_region_spec_keys() {
        let request = paris().with_detail(DetailLevel::Detailed);
        let region = request.region();
        assert_eq!(region.memory_key().as_str(), "France:Paris:500");
        assert_eq!(
            region.persistent_key(Layer::Roads).as_str(),
            "France:Paris:500:detailed:roads"
        );
    }
}
