//! Flat binary layouts consumed by the rendering workers.
//!
//! All three layouts are sequences of `f64` starting with a feature count:
//!
//! ```text
//! roads:    [count, {road_type, point_count, x1, y1, ...}+]
//! polygons: [count, {exterior_count, hole_count, x1, y1, ...,
//!                    {ring_count, x1, y1, ...} × hole_count}+]
//! points:   [count, x1, y1, x2, y2, ...]
//! ```
//!
//! The renderer decodes by fixed offsets, so field order and the road type
//! codes must never change.

mod buffer;
mod points;
mod polygons;
mod region;
mod road_type;
mod roads;
mod shard;

pub use buffer::{DecodeError, PointBuffer, PolygonBuffer, RoadBuffer};
pub use points::{decode_points, encode_points};
pub use polygons::{decode_polygons, encode_polygons, DecodedPolygon};
pub use region::{LayerBuffer, RegionBuffers};
pub use road_type::RoadType;
pub use roads::{decode_roads, encode_roads, DecodedRoad};
pub(crate) use roads::road_coordinate_ranges;
pub use shard::shard_roads;
