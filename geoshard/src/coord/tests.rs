//! Tests for coordinate conversion

use super::*;

#[test]
fn test_new_york_city_at_zoom_16() {
    // New York City: 40.7128°N, 74.0060°W
    let tile = to_tile_coords(40.7128, -74.0060, 16).unwrap();
    assert_eq!(tile.row, 24640);
    assert_eq!(tile.col, 19295);
    assert_eq!(tile.zoom, 16);
}

#[test]
fn test_london_at_zoom_10() {
    let tile = to_tile_coords(51.5074, -0.1278, 10).unwrap();
    assert_eq!(tile.row, 340);
    assert_eq!(tile.col, 511);
}

#[test]
fn test_equator_prime_meridian() {
    // At zoom 1: 2×2 tiles, center is at (1, 1)
    let tile = to_tile_coords(0.0, 0.0, 1).unwrap();
    assert_eq!(tile.row, 1);
    assert_eq!(tile.col, 1);
}

#[test]
fn test_antimeridian_is_clamped_to_last_column() {
    let tile = to_tile_coords(0.0, 180.0, 2).unwrap();
    assert_eq!(tile.col, 3);
}

#[test]
fn test_invalid_latitude() {
    let result = to_tile_coords(90.0, 0.0, 10);
    assert!(matches!(result, Err(CoordError::InvalidLatitude(_))));
}

#[test]
fn test_invalid_longitude() {
    let result = to_tile_coords(0.0, -181.0, 10);
    assert!(matches!(result, Err(CoordError::InvalidLongitude(_))));
}

#[test]
fn test_invalid_zoom() {
    let result = to_tile_coords(0.0, 0.0, MAX_ZOOM + 1);
    assert!(matches!(result, Err(CoordError::InvalidZoom(_))));
}

#[test]
fn test_bbox_around_paris() {
    let bbox = BoundingBox::around(LatLon::new(48.8566, 2.3522), 500.0).unwrap();

    let delta_lat = 500.0 / METERS_PER_DEGREE;
    assert!((bbox.north - (48.8566 + delta_lat)).abs() < 1e-12);
    assert!((bbox.south - (48.8566 - delta_lat)).abs() < 1e-12);

    // Longitude span is widened by 1 / cos(lat)
    let lon_span = bbox.east - bbox.west;
    let lat_span = bbox.north - bbox.south;
    assert!(lon_span > lat_span);
}

#[test]
fn test_bbox_query_string_has_four_decimals() {
    let bbox = BoundingBox::around(LatLon::new(48.8566, 2.3522), 500.0).unwrap();
    assert_eq!(bbox.to_query_string(), "48.8521,2.3454,48.8611,2.3590");
}

#[test]
fn test_bbox_rejects_non_finite_center() {
    let result = BoundingBox::around(LatLon::new(f64::NAN, 2.0), 500.0);
    assert!(matches!(result, Err(CoordError::MalformedBounds(_))));

    let result = BoundingBox::around(LatLon::new(48.0, 2.0), f64::INFINITY);
    assert!(matches!(result, Err(CoordError::MalformedBounds(_))));
}

#[test]
fn test_bbox_rejects_inverted_box() {
    let bbox = BoundingBox {
        south: 10.0,
        west: 0.0,
        north: 5.0,
        east: 1.0,
    };
    assert!(bbox.validate().is_err());
}

#[test]
fn test_tiles_covering_small_radius() {
    let bbox = BoundingBox::around(LatLon::new(48.8566, 2.3522), 500.0).unwrap();
    let tiles = tiles_covering(&bbox, 15).unwrap();

    assert_eq!(
        tiles,
        vec![
            TileCoord { row: 11272, col: 16597, zoom: 15 },
            TileCoord { row: 11272, col: 16598, zoom: 15 },
            TileCoord { row: 11273, col: 16597, zoom: 15 },
            TileCoord { row: 11273, col: 16598, zoom: 15 },
        ]
    );
}

#[test]
fn test_tile_count() {
    let a = TileCoord { row: 10, col: 20, zoom: 15 };
    let b = TileCoord { row: 12, col: 24, zoom: 15 };
    assert_eq!(tile_count(&a, &b), 15);
}

#[test]
fn test_project_point_paris() {
    let (x, y) = project_point(2.3522, 48.8566);
    assert!(x > 200_000.0 && x < 300_000.0);
    assert!(y > 6_000_000.0 && y < 7_000_000.0);
}

#[test]
fn test_project_point_origin() {
    let (x, y) = project_point(0.0, 0.0);
    assert_eq!(x, 0.0);
    assert!(y.abs() < 1e-9);
}

#[test]
fn test_compensated_radius() {
    assert_eq!(compensated_radius(18_000.0, 1200, 1600), 6_000.0);
    assert_eq!(compensated_radius(4_000.0, 1000, 1000), 1_000.0);
}
