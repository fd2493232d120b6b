//! Coordinate type definitions

use std::fmt;

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Slippy map zoom range
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 20;

/// Meters per degree of latitude used by the flat-Earth bounding box approximation.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// A geographic position in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Returns `true` if both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lon)
    }
}

/// Axis-aligned geographic bounding box in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    /// Builds a box of `radius_m` meters around `center`.
    ///
    /// Uses the flat-Earth approximation
    /// `dlat = r / 111320`, `dlon = r / (111320 * cos(lat))`.
    /// Any non-finite component (including the polar `cos(lat) == 0` case)
    /// is rejected here so no network call is ever made with it.
    pub fn around(center: LatLon, radius_m: f64) -> Result<Self, CoordError> {
        let delta_lat = radius_m / METERS_PER_DEGREE;
        let delta_lon = radius_m / (METERS_PER_DEGREE * center.lat.to_radians().cos());

        let bbox = Self {
            south: center.lat - delta_lat,
            west: center.lon - delta_lon,
            north: center.lat + delta_lat,
            east: center.lon + delta_lon,
        };
        bbox.validate()?;
        Ok(bbox)
    }

    /// Checks that every edge is finite and the box is not inverted.
    pub fn validate(&self) -> Result<(), CoordError> {
        let finite = [self.south, self.west, self.north, self.east]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.south > self.north || self.west > self.east {
            return Err(CoordError::MalformedBounds(*self));
        }
        Ok(())
    }

    /// Formats the box as `south,west,north,east` with 4 decimal places,
    /// the order Overpass QL expects.
    pub fn to_query_string(&self) -> String {
        format!(
            "{:.4},{:.4},{:.4},{:.4}",
            self.south, self.west, self.north, self.east
        )
    }
}

/// Tile coordinates in the Web Mercator / slippy map system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Y coordinate (north-south), 0 at north
    pub row: u32,
    /// X coordinate (east-west), 0 at west
    pub col: u32,
    /// Zoom level
    pub zoom: u8,
}

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Latitude is outside the Web Mercator range
    InvalidLatitude(f64),
    /// Longitude is outside valid range (-180.0 to 180.0)
    InvalidLongitude(f64),
    /// Zoom level is outside the supported range
    InvalidZoom(u8),
    /// Bounding box has a non-finite or inverted edge
    MalformedBounds(BoundingBox),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidLatitude(lat) => {
                write!(
                    f,
                    "Invalid latitude: {} (must be between {} and {})",
                    lat, MIN_LAT, MAX_LAT
                )
            }
            CoordError::InvalidLongitude(lon) => {
                write!(
                    f,
                    "Invalid longitude: {} (must be between {} and {})",
                    lon, MIN_LON, MAX_LON
                )
            }
            CoordError::InvalidZoom(zoom) => {
                write!(
                    f,
                    "Invalid zoom level: {} (must be between {} and {})",
                    zoom, MIN_ZOOM, MAX_ZOOM
                )
            }
            CoordError::MalformedBounds(bbox) => {
                write!(
                    f,
                    "Malformed bounding box: south={} west={} north={} east={}",
                    bbox.south, bbox.west, bbox.north, bbox.east
                )
            }
        }
    }
}

impl std::error::Error for CoordError {}
