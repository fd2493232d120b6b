//! In-place Web Mercator projection of encoded buffers.

use std::ops::Range;

use crate::coord::project_point;
use crate::encode::{road_coordinate_ranges, DecodeError, LayerBuffer, RoadBuffer};

/// Projects every `(lon, lat)` pair of `buffer` to EPSG:3857 meters.
///
/// The layout is validated first; a corrupt buffer is left untouched.
pub fn project_buffer(buffer: &mut LayerBuffer) -> Result<usize, DecodeError> {
    let ranges = buffer.coordinate_ranges()?;
    Ok(project_ranges(buffer.as_mut_slice(), ranges))
}

/// Road-only variant of [`project_buffer`], used on shards.
pub fn project_roads(buffer: &mut RoadBuffer) -> Result<usize, DecodeError> {
    let ranges = road_coordinate_ranges(buffer)?;
    Ok(project_ranges(buffer.as_mut_slice(), ranges))
}

fn project_ranges(data: &mut [f64], ranges: Vec<Range<usize>>) -> usize {
    let mut projected = 0;
    for range in ranges {
        for xy in data[range].chunks_exact_mut(2) {
            let (x, y) = project_point(xy[0], xy[1]);
            xy[0] = x;
            xy[1] = y;
            projected += 1;
        }
    }
    projected
}
