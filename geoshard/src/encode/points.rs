//! Point layout: `[count, x1, y1, x2, y2, ...]`.

use std::ops::Range;

use super::buffer::{positions, DecodeError, LayoutReader, PointBuffer};
use crate::geometry::{FeatureCollection, Geometry, Position};

/// Encodes the `Point` features of `collection`; everything else is skipped.
pub fn encode_points(collection: &FeatureCollection) -> PointBuffer {
    let mut data = vec![0.0];
    for feature in collection.iter() {
        if let Geometry::Point((x, y)) = feature.geometry {
            data.push(x);
            data.push(y);
        }
    }
    data[0] = ((data.len() - 1) / 2) as f64;
    PointBuffer::from_vec(data)
}

/// Strictly decodes a point buffer. An empty slice decodes to no points.
pub fn decode_points(data: &[f64]) -> Result<Vec<Position>, DecodeError> {
    Ok(point_coordinate_ranges(data)?
        .pop()
        .map(|range| positions(data, range))
        .unwrap_or_default())
}

/// The single coordinate run of a point buffer, if any.
pub(crate) fn point_coordinate_ranges(data: &[f64]) -> Result<Vec<Range<usize>>, DecodeError> {
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = LayoutReader::new(data);
    let count = reader.count()?;
    let range = reader.coordinates(count)?;
    reader.finish()?;
    Ok(vec![range])
}
