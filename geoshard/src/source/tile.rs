//! Tile-based source serving GeoJSON vector tiles.

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::http::AsyncHttpClient;
use super::query::{matches_any, poi_filters, road_classes, TagFilter};
use super::types::{FeatureSource, SourceError};
use crate::coord::{tile_count, tile_range, tiles_covering, BoundingBox, LatLon, TileCoord};
use crate::geometry::{
    clean_collection, Feature, FeatureCollection, Geometry, Properties, TagValue,
    DEFAULT_SIMPLIFY_TOLERANCE,
};
use crate::layer::{DetailLevel, Layer};

/// Zoom level every tile request uses.
pub const TILE_ZOOM: u8 = 15;

/// Upper bound on tiles fetched for one request.
pub const MAX_TILES_PER_REQUEST: usize = 1000;

/// Tiles in flight at once.
pub const DEFAULT_TILE_CONCURRENCY: usize = 8;

/// Template used when none is configured.
pub const DEFAULT_TILE_URL: &str = "http://localhost:8080/tiles/{z}/{x}/{y}.geojson";

#[derive(Debug, Deserialize)]
struct TileBody {
    #[serde(default)]
    features: Vec<TileFeature>,
}

#[derive(Debug, Deserialize)]
struct TileFeature {
    #[serde(default)]
    geometry: Option<Value>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

/// What a request keeps from each tile.
enum Selection<'a> {
    Roads(Vec<&'static str>),
    Polygons(&'a [TagFilter]),
    Points(&'a [TagFilter]),
}

impl Selection<'_> {
    fn keep(&self, geometry: Geometry, properties: &Map<String, Value>) -> Option<Feature> {
        match self {
            Selection::Roads(classes) => {
                if !matches!(geometry, Geometry::LineString(_) | Geometry::MultiLineString(_)) {
                    return None;
                }
                let highway = properties.get("highway").and_then(TagValue::from_json)?;
                let wanted = classes.iter().any(|c| Some(*c) == highway.first());
                wanted.then(|| Feature::new(geometry, Properties { highway: Some(highway) }))
            }
            Selection::Polygons(filters) => {
                let polygonal =
                    matches!(geometry, Geometry::Polygon(_) | Geometry::MultiPolygon(_));
                (polygonal && matches_any(filters, &string_tags(properties)))
                    .then(|| Feature::bare(geometry))
            }
            Selection::Points(filters) => {
                let point = matches!(geometry, Geometry::Point(_));
                (point && matches_any(filters, &string_tags(properties)))
                    .then(|| Feature::bare(geometry))
            }
        }
    }
}

fn string_tags(properties: &Map<String, Value>) -> HashMap<String, String> {
    properties
        .iter()
        .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
        .collect()
}

/// Feature source that assembles a region from fixed-zoom GeoJSON tiles.
///
/// Tiles are fetched concurrently but merged in row-major tile order. A
/// failed tile fails the whole call.
pub struct TileSource<C: AsyncHttpClient> {
    client: Arc<C>,
    url_template: String,
    zoom: u8,
    max_tiles: usize,
    concurrency: usize,
}

impl<C: AsyncHttpClient> TileSource<C> {
    pub fn new(client: Arc<C>, url_template: impl Into<String>) -> Self {
        Self {
            client,
            url_template: url_template.into(),
            zoom: TILE_ZOOM,
            max_tiles: MAX_TILES_PER_REQUEST,
            concurrency: DEFAULT_TILE_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Tiles fetched at once.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// URL of `tile`, with `{z}`, `{x}` (column) and `{y}` (row) filled in.
    pub fn tile_url(&self, tile: &TileCoord) -> String {
        self.url_template
            .replace("{z}", &tile.zoom.to_string())
            .replace("{x}", &tile.col.to_string())
            .replace("{y}", &tile.row.to_string())
    }

    async fn fetch_region(
        &self,
        center: LatLon,
        radius_m: f64,
        selection: Selection<'_>,
        layer: Layer,
    ) -> Result<FeatureCollection, SourceError> {
        let bbox = BoundingBox::around(center, radius_m)?;
        let (top_left, bottom_right) = tile_range(&bbox, self.zoom)?;
        let requested = tile_count(&top_left, &bottom_right);
        if requested > self.max_tiles {
            warn!(requested, cap = self.max_tiles, "Tile request over cap");
            return Err(SourceError::TooManyTiles {
                requested,
                cap: self.max_tiles,
            });
        }

        let tiles = tiles_covering(&bbox, self.zoom)?;
        info!(layer = %layer, tiles = tiles.len(), zoom = self.zoom, "Fetching tiles");

        let client = &self.client;
        let bodies: Vec<Vec<u8>> = stream::iter(tiles)
            .map(|tile| {
                let url = self.tile_url(&tile);
                async move { client.get(&url).await }
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let mut collection = FeatureCollection::new();
        for body in &bodies {
            let tile: TileBody = serde_json::from_slice(body)
                .map_err(|e| SourceError::InvalidResponse(format!("tile GeoJSON: {}", e)))?;

            for feature in tile.features {
                let Some(geometry) = feature
                    .geometry
                    .and_then(|g| serde_json::from_value::<Geometry>(g).ok())
                else {
                    continue;
                };
                let properties = feature.properties.unwrap_or_default();
                if let Some(kept) = selection.keep(geometry, &properties) {
                    collection.push(kept);
                }
            }
        }

        debug!(layer = %layer, features = collection.len(), "Tiles merged");
        Ok(clean_collection(collection, DEFAULT_SIMPLIFY_TOLERANCE, layer))
    }
}

impl<C: AsyncHttpClient> FeatureSource for TileSource<C> {
    async fn fetch_roads(
        &self,
        center: LatLon,
        radius_m: f64,
        detail: DetailLevel,
    ) -> Result<FeatureCollection, SourceError> {
        let selection = Selection::Roads(road_classes(detail, radius_m));
        self.fetch_region(center, radius_m, selection, Layer::Roads)
            .await
    }

    async fn fetch_features(
        &self,
        center: LatLon,
        radius_m: f64,
        filters: &[TagFilter],
        layer: Layer,
    ) -> Result<FeatureCollection, SourceError> {
        self.fetch_region(center, radius_m, Selection::Polygons(filters), layer)
            .await
    }

    async fn fetch_pois(
        &self,
        center: LatLon,
        radius_m: f64,
    ) -> Result<FeatureCollection, SourceError> {
        let filters = poi_filters();
        self.fetch_region(center, radius_m, Selection::Points(&filters), Layer::Pois)
            .await
    }

    fn name(&self) -> &str {
        "tiles"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::query::park_filters;
    use crate::source::testing::ScriptedHttpClient;

    const TEMPLATE: &str = "https://tiles.test/{z}/{x}/{y}.geojson";
    const EMPTY_TILE: &str = r#"{"type": "FeatureCollection", "features": []}"#;

    fn paris() -> LatLon {
        LatLon::new(48.8566, 2.3522)
    }

    fn road_tile(highway: &str, x: f64) -> Vec<u8> {
        format!(
            r#"{{"type": "FeatureCollection", "features": [
                {{"type": "Feature",
                  "geometry": {{"type": "LineString", "coordinates": [[{x}, 48.85], [{x}, 48.86]]}},
                  "properties": {{"highway": "{highway}", "name": "x"}}}},
                {{"type": "Feature",
                  "geometry": {{"type": "MultiPoint", "coordinates": [[0, 0]]}},
                  "properties": {{"highway": "primary"}}}}
            ]}}"#
        )
        .into_bytes()
    }

    #[test]
    fn test_tile_url_substitution() {
        let source = TileSource::new(Arc::new(ScriptedHttpClient::new()), TEMPLATE);
        let tile = TileCoord {
            row: 11272,
            col: 16597,
            zoom: 15,
        };
        assert_eq!(
            source.tile_url(&tile),
            "https://tiles.test/15/16597/11272.geojson"
        );
    }

    #[test]
    fn test_concurrency_is_at_least_one() {
        let source = TileSource::new(Arc::new(ScriptedHttpClient::new()), TEMPLATE);
        assert_eq!(source.concurrency(), DEFAULT_TILE_CONCURRENCY);
        assert_eq!(source.with_concurrency(0).concurrency(), 1);
    }

    #[tokio::test]
    async fn test_single_tile_in_flight_keeps_order() {
        let client = Arc::new(
            ScriptedHttpClient::new()
                .route("https://tiles.test/15/16597/11272", Ok(road_tile("primary", 1.0)))
                .route("https://tiles.test/15/16597/11273", Ok(road_tile("tertiary", 3.0)))
                .fallback(Ok(EMPTY_TILE.into())),
        );
        let source = TileSource::new(client.clone(), TEMPLATE).with_concurrency(1);

        let fc = source
            .fetch_roads(paris(), 500.0, DetailLevel::Detailed)
            .await
            .unwrap();

        assert_eq!(client.call_count(), 4);
        assert_eq!(fc.features[0].properties, Properties::road("primary"));
        assert_eq!(fc.features[1].properties, Properties::road("tertiary"));
    }

    #[tokio::test]
    async fn test_roads_merged_in_tile_order() {
        let client = Arc::new(
            ScriptedHttpClient::new()
                .route("https://tiles.test/15/16597/11272", Ok(road_tile("primary", 1.0)))
                .route("https://tiles.test/15/16598/11272", Ok(road_tile("footway", 2.0)))
                .route("https://tiles.test/15/16597/11273", Ok(road_tile("residential", 3.0)))
                .fallback(Ok(EMPTY_TILE.into())),
        );
        let source = TileSource::new(client.clone(), TEMPLATE);

        let fc = source
            .fetch_roads(paris(), 500.0, DetailLevel::Detailed)
            .await
            .unwrap();

        assert_eq!(client.call_count(), 4);
        assert_eq!(fc.len(), 2);
        assert_eq!(fc.features[0].properties, Properties::road("primary"));
        assert_eq!(fc.features[1].properties, Properties::road("residential"));
    }

    #[tokio::test]
    async fn test_polygon_filtering() {
        let body = r#"{"features": [
            {"type": "Feature",
             "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]},
             "properties": {"leisure": "park"}},
            {"type": "Feature",
             "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]},
             "properties": {"leisure": "pitch"}},
            {"type": "Feature",
             "geometry": {"type": "Point", "coordinates": [0, 0]},
             "properties": {"leisure": "park"}},
            {"type": "Feature", "geometry": null, "properties": null}
        ]}"#;
        let client = Arc::new(
            ScriptedHttpClient::new()
                .route("https://tiles.test/15/16597/11272", Ok(body.into()))
                .fallback(Ok(EMPTY_TILE.into())),
        );
        let source = TileSource::new(client, TEMPLATE);

        let fc = source
            .fetch_features(paris(), 500.0, &park_filters(), Layer::Parks)
            .await
            .unwrap();
        assert_eq!(fc.len(), 1);
        assert!(matches!(fc.features[0].geometry, Geometry::Polygon(_)));
    }

    #[tokio::test]
    async fn test_tile_cap_rejects_before_fetching() {
        let client = Arc::new(ScriptedHttpClient::new().fallback(Ok(EMPTY_TILE.into())));
        let source = TileSource::new(client.clone(), TEMPLATE);

        let result = source.fetch_pois(paris(), 50_000.0).await;

        assert!(matches!(
            result,
            Err(SourceError::TooManyTiles { cap: 1000, .. })
        ));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_tile_fails_request() {
        let client = Arc::new(
            ScriptedHttpClient::new()
                .route(
                    "https://tiles.test/15/16598/11273",
                    Err(SourceError::Transport("HTTP 500".into())),
                )
                .fallback(Ok(EMPTY_TILE.into())),
        );
        let source = TileSource::new(client, TEMPLATE);

        let result = source.fetch_roads(paris(), 500.0, DetailLevel::Simplified).await;
        assert_eq!(result, Err(SourceError::Transport("HTTP 500".into())));
    }
}
