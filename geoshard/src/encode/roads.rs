//! Road layout: `[count, {road_type, point_count, x1, y1, ...}+]`.

use std::ops::Range;

use super::buffer::{positions, DecodeError, LayoutReader, RoadBuffer};
use super::road_type::RoadType;
use crate::geometry::{FeatureCollection, Geometry, Position};

/// A road entry read back from a [`RoadBuffer`].
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRoad {
    pub road_type: RoadType,
    pub points: Vec<Position>,
}

/// Encodes each line feature of `collection` as one road entry.
///
/// A `MultiLineString` contributes only its first line, and one with no
/// lines is skipped. Other geometry kinds are skipped.
pub fn encode_roads(collection: &FeatureCollection) -> RoadBuffer {
    let capacity = 1 + collection
        .iter()
        .map(|f| 2 * f.geometry.point_count() + 2)
        .sum::<usize>();
    let mut data = Vec::with_capacity(capacity);
    data.push(0.0);

    let mut count = 0usize;
    for feature in collection.iter() {
        let road_type = RoadType::of(&feature.properties);
        match &feature.geometry {
            Geometry::LineString(line) => {
                push_road(&mut data, road_type, line);
                count += 1;
            }
            Geometry::MultiLineString(lines) => {
                if let Some(line) = lines.first() {
                    push_road(&mut data, road_type, line);
                    count += 1;
                }
            }
            _ => {}
        }
    }

    data[0] = count as f64;
    RoadBuffer::from_vec(data)
}

fn push_road(data: &mut Vec<f64>, road_type: RoadType, line: &[Position]) {
    data.push(f64::from(road_type.code()));
    data.push(line.len() as f64);
    for (x, y) in line {
        data.push(*x);
        data.push(*y);
    }
}

/// Walks a road buffer, calling `visit` with each entry's type code and
/// coordinate range. Fails on malformed counts, truncation or trailing
/// values. An empty slice holds no roads.
fn walk_roads(
    data: &[f64],
    mut visit: impl FnMut(usize, Range<usize>),
) -> Result<usize, DecodeError> {
    if data.is_empty() {
        return Ok(0);
    }

    let mut reader = LayoutReader::new(data);
    let count = reader.count()?;
    for _ in 0..count {
        let code = reader.count()?;
        let point_count = reader.count()?;
        visit(code, reader.coordinates(point_count)?);
    }

    reader.finish()?;
    Ok(count)
}

/// Strictly decodes a road buffer.
pub fn decode_roads(data: &[f64]) -> Result<Vec<DecodedRoad>, DecodeError> {
    let mut roads = Vec::new();
    walk_roads(data, |code, range| {
        roads.push(DecodedRoad {
            road_type: RoadType::from_code(u8::try_from(code).unwrap_or(u8::MAX)),
            points: positions(data, range),
        });
    })?;
    Ok(roads)
}

/// Index ranges of every coordinate run in a road buffer.
pub(crate) fn road_coordinate_ranges(data: &[f64]) -> Result<Vec<Range<usize>>, DecodeError> {
    let mut ranges = Vec::new();
    walk_roads(data, |_, range| ranges.push(range))?;
    Ok(ranges)
}
