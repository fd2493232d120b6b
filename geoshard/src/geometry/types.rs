//! Feature collection types.
//!
//! The serialized form is GeoJSON-compatible so persisted cache blobs can be
//! inspected with ordinary tooling.

use serde::{Deserialize, Serialize};

/// An `(x, y)` coordinate pair, i.e. `(longitude, latitude)` in degrees.
pub type Position = (f64, f64);

/// Geometry of a feature, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Position),
    LineString(Vec<Position>),
    /// Exterior ring first, then holes
    Polygon(Vec<Vec<Position>>),
    MultiLineString(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

impl Geometry {
    /// Total number of coordinate pairs across all parts.
    pub fn point_count(&self) -> usize {
        match self {
            Geometry::Point(_) => 1,
            Geometry::LineString(line) => line.len(),
            Geometry::Polygon(rings) | Geometry::MultiLineString(rings) => {
                rings.iter().map(Vec::len).sum()
            }
            Geometry::MultiPolygon(polygons) => polygons
                .iter()
                .flat_map(|rings| rings.iter())
                .map(Vec::len)
                .sum(),
        }
    }
}

/// An OSM tag value, either a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Single(String),
    List(Vec<String>),
}

impl TagValue {
    /// The value itself, or the first element of a list.
    pub fn first(&self) -> Option<&str> {
        match self {
            TagValue::Single(value) => Some(value.as_str()),
            TagValue::List(values) => values.first().map(String::as_str),
        }
    }

    /// Converts a loosely typed JSON value. Non-string list items are skipped.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(TagValue::Single(s.clone())),
            serde_json::Value::Array(items) => Some(TagValue::List(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            )),
            _ => None,
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::Single(value.to_string())
    }
}

/// Properties retained on a normalized feature.
///
/// Only `highway` ever survives the cleaning pass, and only on roads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highway: Option<TagValue>,
}

impl Properties {
    pub fn road(highway: impl Into<TagValue>) -> Self {
        Self {
            highway: Some(highway.into()),
        }
    }
}

/// A geometry plus its retained properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    pub geometry: Geometry,
    #[serde(default)]
    pub properties: Properties,
}

impl Feature {
    pub fn new(geometry: Geometry, properties: Properties) -> Self {
        Self {
            geometry,
            properties,
        }
    }

    /// A road line with the given `highway` tag.
    pub fn road(coords: Vec<Position>, highway: &str) -> Self {
        Self::new(Geometry::LineString(coords), Properties::road(highway))
    }

    /// A feature without retained properties.
    pub fn bare(geometry: Geometry) -> Self {
        Self::new(geometry, Properties::default())
    }
}

/// Ordered sequence of features. Order is preserved end to end.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_features(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }

    /// Appends every feature of `other`, keeping its order.
    pub fn extend(&mut self, other: FeatureCollection) {
        self.features.extend(other.features);
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}
