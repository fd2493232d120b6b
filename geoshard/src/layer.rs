//! Map layers and detail levels.
//!
//! A request names the layers it needs; each layer has a stable lowercase
//! name that is used in persistent cache keys.

use std::fmt;
use std::str::FromStr;

/// A thematic layer of the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    /// Street network, encoded as a road buffer
    Roads,
    /// Water bodies, encoded as a polygon buffer
    Water,
    /// Parks and green areas, encoded as a polygon buffer
    Parks,
    /// Points of interest, encoded as a point buffer
    Pois,
}

impl Layer {
    /// Every layer in canonical order.
    pub const ALL: [Layer; 4] = [Layer::Roads, Layer::Water, Layer::Parks, Layer::Pois];

    /// The layers of a standard poster request.
    pub const STANDARD: [Layer; 3] = [Layer::Roads, Layer::Water, Layer::Parks];

    /// Stable name used in cache keys and file names.
    pub fn name(&self) -> &'static str {
        match self {
            Layer::Roads => "roads",
            Layer::Water => "water",
            Layer::Parks => "parks",
            Layer::Pois => "pois",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Layer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "roads" => Ok(Layer::Roads),
            "water" => Ok(Layer::Water),
            "parks" => Ok(Layer::Parks),
            "pois" => Ok(Layer::Pois),
            other => Err(format!(
                "unknown layer '{}' (expected roads, water, parks or pois)",
                other
            )),
        }
    }
}

/// Level of detail requested for the road network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DetailLevel {
    /// Major roads only once the radius is large
    #[default]
    Simplified,
    /// Major and minor roads at any radius
    Detailed,
}

impl DetailLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetailLevel::Simplified => "simplified",
            DetailLevel::Detailed => "detailed",
        }
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetailLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simplified" => Ok(DetailLevel::Simplified),
            "detailed" => Ok(DetailLevel::Detailed),
            other => Err(format!(
                "unknown detail level '{}' (expected simplified or detailed)",
                other
            )),
        }
    }
}
