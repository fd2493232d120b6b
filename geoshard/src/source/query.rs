//! Overpass query construction and tag predicates.

use std::collections::HashMap;

use crate::coord::BoundingBox;
use crate::layer::{DetailLevel, Layer};

/// Road classes kept at every detail level.
pub const MAJOR_ROAD_CLASSES: &[&str] = &["motorway", "trunk", "primary", "secondary", "tertiary"];

/// Road classes dropped from simplified queries over large radii.
pub const MINOR_ROAD_CLASSES: &[&str] =
    &["residential", "unclassified", "living_street", "service"];

/// Radius in meters above which simplified queries keep major roads only.
pub const SIMPLIFIED_RADIUS_THRESHOLD_M: f64 = 5000.0;

/// Server-side query timeout in seconds.
pub const QUERY_TIMEOUT_SECS: u32 = 60;

/// Highway values requested for `detail` at `radius_m`.
pub fn road_classes(detail: DetailLevel, radius_m: f64) -> Vec<&'static str> {
    let mut classes = MAJOR_ROAD_CLASSES.to_vec();
    let major_only = detail == DetailLevel::Simplified && radius_m > SIMPLIFIED_RADIUS_THRESHOLD_M;
    if !major_only {
        classes.extend_from_slice(MINOR_ROAD_CLASSES);
    }
    classes
}

/// How a [`TagFilter`] compares the tag value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagMatch {
    /// Value equals the string
    Equals(String),
    /// Value equals one of the strings
    AnyOf(Vec<String>),
    /// Tag is present with any value
    Present,
}

/// A single OSM tag predicate. Filters in a list combine with logical OR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilter {
    pub key: String,
    pub matcher: TagMatch,
}

impl TagFilter {
    pub fn equals(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            matcher: TagMatch::Equals(value.to_string()),
        }
    }

    pub fn any_of(key: &str, values: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            matcher: TagMatch::AnyOf(values.iter().map(|v| v.to_string()).collect()),
        }
    }

    pub fn present(key: &str) -> Self {
        Self {
            key: key.to_string(),
            matcher: TagMatch::Present,
        }
    }

    /// Evaluates the predicate against a tag map.
    pub fn matches(&self, tags: &HashMap<String, String>) -> bool {
        match (tags.get(&self.key), &self.matcher) {
            (None, _) => false,
            (Some(_), TagMatch::Present) => true,
            (Some(value), TagMatch::Equals(expected)) => value == expected,
            (Some(value), TagMatch::AnyOf(options)) => options.iter().any(|o| o == value),
        }
    }

    /// The Overpass `nwr` statement for this filter within `bbox`.
    pub fn to_overpass(&self, bbox: &str) -> String {
        match &self.matcher {
            TagMatch::Equals(value) => format!("nwr[\"{}\"=\"{}\"]({});", self.key, value, bbox),
            TagMatch::AnyOf(values) => {
                format!("nwr[\"{}\"~\"{}\"]({});", self.key, values.join("|"), bbox)
            }
            TagMatch::Present => format!("nwr[\"{}\"]({});", self.key, bbox),
        }
    }
}

/// True when any filter in `filters` matches.
pub fn matches_any(filters: &[TagFilter], tags: &HashMap<String, String>) -> bool {
    filters.iter().any(|f| f.matches(tags))
}

pub fn water_filters() -> Vec<TagFilter> {
    vec![
        TagFilter::equals("natural", "water"),
        TagFilter::equals("waterway", "riverbank"),
    ]
}

pub fn park_filters() -> Vec<TagFilter> {
    vec![
        TagFilter::equals("leisure", "park"),
        TagFilter::equals("landuse", "grass"),
    ]
}

pub fn poi_filters() -> Vec<TagFilter> {
    vec![
        TagFilter::any_of("amenity", &["cafe", "restaurant", "bar", "pub"]),
        TagFilter::any_of("tourism", &["attraction", "museum", "viewpoint"]),
        TagFilter::present("historic"),
    ]
}

/// The fixed tag filters of a polygon or point layer. Roads use class
/// filters instead and get an empty list.
pub fn layer_filters(layer: Layer) -> Vec<TagFilter> {
    match layer {
        Layer::Roads => Vec::new(),
        Layer::Water => water_filters(),
        Layer::Parks => park_filters(),
        Layer::Pois => poi_filters(),
    }
}

/// Road network query for the given highway classes.
pub fn road_query(bbox: &BoundingBox, classes: &[&str]) -> String {
    format!(
        "[out:json][timeout:{}];\nway[\"highway\"~\"{}\"]({});\nout geom qt;",
        QUERY_TIMEOUT_SECS,
        classes.join("|"),
        bbox.to_query_string()
    )
}

/// Union query over `filters`, each applied to nodes, ways and relations.
pub fn feature_query(bbox: &BoundingBox, filters: &[TagFilter]) -> String {
    let bbox = bbox.to_query_string();
    let mut query = format!("[out:json][timeout:{}];(", QUERY_TIMEOUT_SECS);
    for filter in filters {
        query.push_str(&filter.to_overpass(&bbox));
    }
    query.push_str(");out geom qt;");
    query
}
