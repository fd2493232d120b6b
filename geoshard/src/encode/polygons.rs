//! Polygon layout.
//!
//! ```text
//! [count, {exterior_count, hole_count, x1, y1, ...,
//!          {ring_count, x1, y1, ...} × hole_count}+]
//! ```

use std::ops::Range;

use super::buffer::{positions, DecodeError, LayoutReader, PolygonBuffer};
use crate::geometry::{FeatureCollection, Geometry, Position};

/// A polygon read back from a [`PolygonBuffer`].
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPolygon {
    pub exterior: Vec<Position>,
    pub holes: Vec<Vec<Position>>,
}

/// Encodes the polygons of `collection`.
///
/// Only the first polygon of a `MultiPolygon` is kept. Polygons without any
/// ring and non-polygon geometries are skipped.
pub fn encode_polygons(collection: &FeatureCollection) -> PolygonBuffer {
    let mut data = vec![0.0];
    let mut count = 0usize;

    for feature in collection.iter() {
        let rings = match &feature.geometry {
            Geometry::Polygon(rings) => rings,
            Geometry::MultiPolygon(polygons) => match polygons.first() {
                Some(rings) => rings,
                None => continue,
            },
            _ => continue,
        };

        let Some((exterior, holes)) = rings.split_first() else {
            continue;
        };

        data.push(exterior.len() as f64);
        data.push(holes.len() as f64);
        push_ring(&mut data, exterior);
        for hole in holes {
            data.push(hole.len() as f64);
            push_ring(&mut data, hole);
        }
        count += 1;
    }

    data[0] = count as f64;
    PolygonBuffer::from_vec(data)
}

fn push_ring(data: &mut Vec<f64>, ring: &[Position]) {
    for (x, y) in ring {
        data.push(*x);
        data.push(*y);
    }
}

/// Walks a polygon buffer, calling `visit` with each polygon's exterior
/// range and hole ranges.
fn walk_polygons(
    data: &[f64],
    mut visit: impl FnMut(Range<usize>, Vec<Range<usize>>),
) -> Result<usize, DecodeError> {
    if data.is_empty() {
        return Ok(0);
    }

    let mut reader = LayoutReader::new(data);
    let count = reader.count()?;
    for _ in 0..count {
        let exterior_count = reader.count()?;
        let hole_count = reader.count()?;
        let exterior = reader.coordinates(exterior_count)?;

        let mut holes = Vec::with_capacity(hole_count.min(data.len()));
        for _ in 0..hole_count {
            let ring_count = reader.count()?;
            holes.push(reader.coordinates(ring_count)?);
        }
        visit(exterior, holes);
    }

    reader.finish()?;
    Ok(count)
}

/// Strictly decodes a polygon buffer. An empty slice decodes to no polygons.
pub fn decode_polygons(data: &[f64]) -> Result<Vec<DecodedPolygon>, DecodeError> {
    let mut polygons = Vec::new();
    walk_polygons(data, |exterior, holes| {
        polygons.push(DecodedPolygon {
            exterior: positions(data, exterior),
            holes: holes.into_iter().map(|h| positions(data, h)).collect(),
        });
    })?;
    Ok(polygons)
}

/// Index ranges of every ring in a polygon buffer.
pub(crate) fn polygon_coordinate_ranges(data: &[f64]) -> Result<Vec<Range<usize>>, DecodeError> {
    let mut ranges = Vec::new();
    walk_polygons(data, |exterior, holes| {
        ranges.push(exterior);
        ranges.extend(holes);
    })?;
    Ok(ranges)
}
