//! Cleaning pass applied to every fetched layer before encoding.

use std::collections::HashMap;

use super::simplify::simplify;
use super::types::{Feature, FeatureCollection, Geometry, Properties, TagValue};
use crate::layer::Layer;

/// Simplification tolerance in degrees, roughly one meter at the equator.
pub const DEFAULT_SIMPLIFY_TOLERANCE: f64 = 0.00001;

/// Simplifies every line and ring with one shared `tolerance` and strips
/// properties down to what `layer` retains.
///
/// Feature order is preserved. Lines and rings are simplified independently.
pub fn clean_collection(
    collection: FeatureCollection,
    tolerance: f64,
    layer: Layer,
) -> FeatureCollection {
    collection
        .features
        .into_iter()
        .map(|feature| clean_feature(feature, tolerance, layer))
        .collect()
}

fn clean_feature(feature: Feature, tolerance: f64, layer: Layer) -> Feature {
    let geometry = match feature.geometry {
        Geometry::Point(p) => Geometry::Point(p),
        Geometry::LineString(line) => Geometry::LineString(simplify(&line, tolerance)),
        Geometry::Polygon(rings) => Geometry::Polygon(simplify_rings(&rings, tolerance)),
        Geometry::MultiLineString(lines) => {
            Geometry::MultiLineString(simplify_rings(&lines, tolerance))
        }
        Geometry::MultiPolygon(polygons) => Geometry::MultiPolygon(
            polygons
                .iter()
                .map(|rings| simplify_rings(rings, tolerance))
                .collect(),
        ),
    };

    let properties = match layer {
        Layer::Roads => Properties {
            highway: feature.properties.highway,
        },
        Layer::Water | Layer::Parks | Layer::Pois => Properties::default(),
    };

    Feature::new(geometry, properties)
}

fn simplify_rings(rings: &[Vec<(f64, f64)>], tolerance: f64) -> Vec<Vec<(f64, f64)>> {
    rings.iter().map(|ring| simplify(ring, tolerance)).collect()
}

/// Builds the retained properties for `layer` from raw OSM tags.
pub fn properties_for_layer(layer: Layer, tags: &HashMap<String, String>) -> Properties {
    match layer {
        Layer::Roads => Properties {
            highway: tags.get("highway").map(|v| TagValue::Single(v.clone())),
        },
        Layer::Water | Layer::Parks | Layer::Pois => Properties::default(),
    }
}
