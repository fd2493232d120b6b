//! Normalized vector feature model and geometry processing.
//!
//! Every source adapter converts its native response into a
//! [`FeatureCollection`]; the [`clean`] pass then simplifies geometries and
//! strips properties down to the per-layer whitelist before encoding.

mod clean;
mod simplify;
mod types;

pub use clean::{clean_collection, properties_for_layer, DEFAULT_SIMPLIFY_TOLERANCE};
pub use simplify::{segment_distance_sq, simplify};
pub use types::{Feature, FeatureCollection, Geometry, Position, Properties, TagValue};
