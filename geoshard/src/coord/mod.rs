//! Coordinate conversion module
//!
//! Provides the geographic primitives used by the acquisition pipeline:
//! bounding boxes derived from a center and radius, slippy map tile math for
//! the tile-based source, and the Web Mercator projection applied by the
//! projection workers.

mod types;

pub use types::{
    BoundingBox, CoordError, LatLon, TileCoord, MAX_LAT, MAX_LON, MAX_ZOOM, METERS_PER_DEGREE,
    MIN_LAT, MIN_LON, MIN_ZOOM,
};

use std::f64::consts::PI;

/// Equatorial radius used by EPSG:3857.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Converts geographic coordinates to tile coordinates.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 20)
///
/// # Returns
///
/// A `Result` containing the tile coordinates or an error if inputs are invalid.
#[inline]
pub fn to_tile_coords(lat: f64, lon: f64, zoom: u8) -> Result<TileCoord, CoordError> {
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let n = 2.0_f64.powi(zoom as i32);
    let max_index = n as u32 - 1;

    // lon = 180 lands exactly on the antimeridian edge
    let col = (((lon + 180.0) / 360.0 * n).floor() as u32).min(max_index);

    let lat_rad = lat * PI / 180.0;
    let row = (((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n).floor() as u32).min(max_index);

    Ok(TileCoord { row, col, zoom })
}

/// Top-left and bottom-right tiles at `zoom` of the area covered by `bbox`.
///
/// Latitudes outside the Web Mercator range are clamped to it.
pub fn tile_range(bbox: &BoundingBox, zoom: u8) -> Result<(TileCoord, TileCoord), CoordError> {
    bbox.validate()?;

    let north = bbox.north.clamp(MIN_LAT, MAX_LAT);
    let south = bbox.south.clamp(MIN_LAT, MAX_LAT);
    let west = bbox.west.clamp(MIN_LON, MAX_LON);
    let east = bbox.east.clamp(MIN_LON, MAX_LON);

    Ok((
        to_tile_coords(north, west, zoom)?,
        to_tile_coords(south, east, zoom)?,
    ))
}

/// Enumerates every tile at `zoom` that intersects `bbox`.
///
/// Tiles are returned in row-major order (north to south, west to east).
pub fn tiles_covering(bbox: &BoundingBox, zoom: u8) -> Result<Vec<TileCoord>, CoordError> {
    let (top_left, bottom_right) = tile_range(bbox, zoom)?;

    let mut tiles = Vec::with_capacity(tile_count(&top_left, &bottom_right));
    for row in top_left.row..=bottom_right.row {
        for col in top_left.col..=bottom_right.col {
            tiles.push(TileCoord { row, col, zoom });
        }
    }
    Ok(tiles)
}

/// Counts the tiles in the inclusive rectangle spanned by two corners.
pub fn tile_count(top_left: &TileCoord, bottom_right: &TileCoord) -> usize {
    let rows = bottom_right.row.saturating_sub(top_left.row) as usize + 1;
    let cols = bottom_right.col.saturating_sub(top_left.col) as usize + 1;
    rows * cols
}

/// Web Mercator (EPSG:3857) projection of a WGS84 position, in meters.
#[inline]
pub fn project_point(lon: f64, lat: f64) -> (f64, f64) {
    let x = lon.to_radians() * EARTH_RADIUS_M;
    let y = lat.to_radians().tan().asinh() * EARTH_RADIUS_M;
    (x, y)
}

/// Widens a radius so a non-square viewport cropped from the fetched area
/// still covers the requested radius on its short side.
pub fn compensated_radius(radius_m: f64, width: u32, height: u32) -> f64 {
    let max_dim = width.max(height).max(1) as f64;
    let min_dim = width.min(height).max(1) as f64;
    radius_m * (max_dim / min_dim) / 4.0
}

#[cfg(test)]
mod tests;
