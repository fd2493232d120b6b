//! Shared fixtures for integration tests.

#![allow(dead_code)]

use geoshard::coord::LatLon;

/// Overpass reply with one primary and one residential two-point road.
pub const PARIS_ROADS: &str = r#"{
    "version": 0.6,
    "elements": [
        {"type": "way", "id": 101, "tags": {"highway": "primary"},
         "geometry": [{"lat": 48.85, "lon": 2.35}, {"lat": 48.86, "lon": 2.36}]},
        {"type": "way", "id": 102, "tags": {"highway": "residential"},
         "geometry": [{"lat": 48.855, "lon": 2.355}, {"lat": 48.855, "lon": 2.365}]}
    ]
}"#;

/// Overpass reply with a single motorway.
pub const SINGLE_MOTORWAY: &str = r#"{
    "elements": [
        {"type": "way", "id": 7, "tags": {"highway": "motorway"},
         "geometry": [{"lat": 48.80, "lon": 2.30}, {"lat": 48.90, "lon": 2.40}]}
    ]
}"#;

/// The road buffer both Paris roads encode to.
pub const PARIS_ROAD_BUFFER: [f64; 13] = [
    2.0, 1.0, 2.0, 2.35, 48.85, 2.36, 48.86, 4.0, 2.0, 2.355, 48.855, 2.365, 48.855,
];

pub fn paris() -> LatLon {
    LatLon::new(48.8566, 2.3522)
}
