//! Per-layer buffers for one region.

use std::collections::BTreeMap;
use std::ops::Range;

use super::buffer::{DecodeError, PointBuffer, PolygonBuffer, RoadBuffer};
use super::points::{encode_points, point_coordinate_ranges};
use super::polygons::{encode_polygons, polygon_coordinate_ranges};
use super::roads::{encode_roads, road_coordinate_ranges};
use crate::geometry::FeatureCollection;
use crate::layer::Layer;

/// The encoded form of one layer.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerBuffer {
    Roads(RoadBuffer),
    Polygons(PolygonBuffer),
    Points(PointBuffer),
}

impl LayerBuffer {
    /// Encodes `collection` with the layout `layer` uses.
    pub fn encode(layer: Layer, collection: &FeatureCollection) -> Self {
        match layer {
            Layer::Roads => LayerBuffer::Roads(encode_roads(collection)),
            Layer::Water | Layer::Parks => LayerBuffer::Polygons(encode_polygons(collection)),
            Layer::Pois => LayerBuffer::Points(encode_points(collection)),
        }
    }

    pub fn feature_count(&self) -> usize {
        match self {
            LayerBuffer::Roads(b) => b.feature_count(),
            LayerBuffer::Polygons(b) => b.feature_count(),
            LayerBuffer::Points(b) => b.feature_count(),
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        match self {
            LayerBuffer::Roads(b) => b.as_slice(),
            LayerBuffer::Polygons(b) => b.as_slice(),
            LayerBuffer::Points(b) => b.as_slice(),
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        match self {
            LayerBuffer::Roads(b) => b.as_mut_slice(),
            LayerBuffer::Polygons(b) => b.as_mut_slice(),
            LayerBuffer::Points(b) => b.as_mut_slice(),
        }
    }

    /// Index ranges of every coordinate run, validating the layout.
    pub fn coordinate_ranges(&self) -> Result<Vec<Range<usize>>, DecodeError> {
        match self {
            LayerBuffer::Roads(b) => road_coordinate_ranges(b),
            LayerBuffer::Polygons(b) => polygon_coordinate_ranges(b),
            LayerBuffer::Points(b) => point_coordinate_ranges(b),
        }
    }

    pub fn to_le_bytes(&self) -> Vec<u8> {
        match self {
            LayerBuffer::Roads(b) => b.to_le_bytes(),
            LayerBuffer::Polygons(b) => b.to_le_bytes(),
            LayerBuffer::Points(b) => b.to_le_bytes(),
        }
    }
}

/// Encoded buffers of a region, keyed by layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionBuffers {
    layers: BTreeMap<Layer, LayerBuffer>,
}

impl RegionBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, layer: Layer, buffer: LayerBuffer) {
        self.layers.insert(layer, buffer);
    }

    pub fn get(&self, layer: Layer) -> Option<&LayerBuffer> {
        self.layers.get(&layer)
    }

    pub fn remove(&mut self, layer: Layer) -> Option<LayerBuffer> {
        self.layers.remove(&layer)
    }

    /// True when every layer in `layers` is present.
    pub fn contains_all(&self, layers: &[Layer]) -> bool {
        layers.iter().all(|l| self.layers.contains_key(l))
    }

    /// A copy holding only `layers`.
    pub fn select(&self, layers: &[Layer]) -> Self {
        Self {
            layers: self
                .layers
                .iter()
                .filter(|(layer, _)| layers.contains(*layer))
                .map(|(layer, buffer)| (*layer, buffer.clone()))
                .collect(),
        }
    }

    /// Adds every layer of `other`, replacing existing ones.
    pub fn merge(&mut self, other: RegionBuffers) {
        self.layers.extend(other.layers);
    }

    pub fn roads(&self) -> Option<&RoadBuffer> {
        match self.layers.get(&Layer::Roads) {
            Some(LayerBuffer::Roads(b)) => Some(b),
            _ => None,
        }
    }

    pub fn water(&self) -> Option<&PolygonBuffer> {
        self.polygons(Layer::Water)
    }

    pub fn parks(&self) -> Option<&PolygonBuffer> {
        self.polygons(Layer::Parks)
    }

    fn polygons(&self, layer: Layer) -> Option<&PolygonBuffer> {
        match self.layers.get(&layer) {
            Some(LayerBuffer::Polygons(b)) => Some(b),
            _ => None,
        }
    }

    pub fn pois(&self) -> Option<&PointBuffer> {
        match self.layers.get(&Layer::Pois) {
            Some(LayerBuffer::Points(b)) => Some(b),
            _ => None,
        }
    }

    /// Moves the road buffer out, e.g. to hand it to the sharder.
    pub fn take_roads(&mut self) -> Option<RoadBuffer> {
        match self.layers.remove(&Layer::Roads) {
            Some(LayerBuffer::Roads(b)) => Some(b),
            Some(other) => {
                self.layers.insert(Layer::Roads, other);
                None
            }
            None => None,
        }
    }

    pub fn layers(&self) -> impl Iterator<Item = Layer> + '_ {
        self.layers.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Layer, &LayerBuffer)> {
        self.layers.iter().map(|(l, b)| (*l, b))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Layer, &mut LayerBuffer)> {
        self.layers.iter_mut().map(|(l, b)| (*l, b))
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl FromIterator<(Layer, LayerBuffer)> for RegionBuffers {
    fn from_iter<I: IntoIterator<Item = (Layer, LayerBuffer)>>(iter: I) -> Self {
        Self {
            layers: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for RegionBuffers {
    type Item = (Layer, LayerBuffer);
    type IntoIter = std::collections::btree_map::IntoIter<Layer, LayerBuffer>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Feature, Geometry};

    fn sample() -> RegionBuffers {
        let roads = FeatureCollection::from_features(vec![Feature::road(
            vec![(0.0, 0.0), (1.0, 1.0)],
            "primary",
        )]);
        let water = FeatureCollection::from_features(vec![Feature::bare(Geometry::Polygon(
            vec![vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]],
        ))]);

        [
            (Layer::Roads, LayerBuffer::encode(Layer::Roads, &roads)),
            (Layer::Water, LayerBuffer::encode(Layer::Water, &water)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_encode_picks_layout_per_layer() {
        let fc = FeatureCollection::from_features(vec![Feature::bare(Geometry::Point((1.0, 2.0)))]);
        assert!(matches!(LayerBuffer::encode(Layer::Pois, &fc), LayerBuffer::Points(_)));
        assert!(matches!(LayerBuffer::encode(Layer::Parks, &fc), LayerBuffer::Polygons(_)));
        assert_eq!(LayerBuffer::encode(Layer::Pois, &fc).as_slice(), &[1.0, 1.0, 2.0]);
    }

    #[test]
    fn test_coordinate_ranges_per_layout() {
        let region = sample();
        let roads = region.get(Layer::Roads).unwrap();
        assert_eq!(roads.coordinate_ranges().unwrap(), vec![3..7]);

        // [1, 4, 0, ring...]
        let water = region.get(Layer::Water).unwrap();
        assert_eq!(water.coordinate_ranges().unwrap(), vec![3..11]);

        let broken = LayerBuffer::Points(PointBuffer::from_vec(vec![3.0, 1.0]));
        assert!(broken.coordinate_ranges().is_err());
    }

    #[test]
    fn test_typed_accessors() {
        let region = sample();
        assert_eq!(region.roads().map(|b| b.feature_count()), Some(1));
        assert_eq!(region.water().map(|b| b.feature_count()), Some(1));
        assert!(region.parks().is_none());
        assert!(region.pois().is_none());
    }

    #[test]
    fn test_contains_all_and_select() {
        let region = sample();
        assert!(region.contains_all(&[Layer::Roads, Layer::Water]));
        assert!(!region.contains_all(&[Layer::Roads, Layer::Parks]));

        let roads_only = region.select(&[Layer::Roads]);
        assert_eq!(roads_only.layers().collect::<Vec<_>>(), vec![Layer::Roads]);
    }

    #[test]
    fn test_take_roads_moves_buffer_out() {
        let mut region = sample();
        let roads = region.take_roads().unwrap();
        assert_eq!(roads.feature_count(), 1);
        assert!(region.roads().is_none());
        assert_eq!(region.len(), 1);
    }
}
