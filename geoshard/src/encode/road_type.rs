//! Road importance classes.

use crate::geometry::{Properties, TagValue};

/// Road importance bucket, ordered from most to least important.
///
/// The discriminants are part of the binary road layout and drive colour and
/// stroke width in the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum RoadType {
    Motorway = 0,
    Primary = 1,
    Secondary = 2,
    Tertiary = 3,
    Residential = 4,
    Other = 5,
}

impl RoadType {
    /// Buckets a `highway` tag value.
    pub fn from_highway(highway: &str) -> Self {
        match highway {
            "motorway" | "motorway_link" => RoadType::Motorway,
            "trunk" | "trunk_link" | "primary" | "primary_link" => RoadType::Primary,
            "secondary" | "secondary_link" => RoadType::Secondary,
            "tertiary" | "tertiary_link" => RoadType::Tertiary,
            "residential" | "living_street" | "unclassified" => RoadType::Residential,
            _ => RoadType::Other,
        }
    }

    /// Classifies an optional tag. Lists use their first element and an
    /// empty list reads as `unclassified`. A missing tag falls into
    /// [`RoadType::Other`].
    pub fn classify(highway: Option<&TagValue>) -> Self {
        match highway {
            None => RoadType::Other,
            Some(tag) => Self::from_highway(tag.first().unwrap_or("unclassified")),
        }
    }

    pub fn of(properties: &Properties) -> Self {
        Self::classify(properties.highway.as_ref())
    }

    /// Decodes a layout code. Out-of-range codes map to [`RoadType::Other`].
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => RoadType::Motorway,
            1 => RoadType::Primary,
            2 => RoadType::Secondary,
            3 => RoadType::Tertiary,
            4 => RoadType::Residential,
            _ => RoadType::Other,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}
