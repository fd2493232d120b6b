//! Query-based source backed by the Overpass API.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use super::failover::FailoverRouter;
use super::http::AsyncHttpClient;
use super::query::{feature_query, poi_filters, road_classes, road_query, TagFilter};
use super::types::{FeatureSource, SourceError};
use crate::coord::{BoundingBox, LatLon};
use crate::geometry::{
    clean_collection, properties_for_layer, Feature, FeatureCollection, Geometry, Position,
    DEFAULT_SIMPLIFY_TOLERANCE,
};
use crate::layer::{DetailLevel, Layer};

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Element {
    Node {
        lat: Option<f64>,
        lon: Option<f64>,
    },
    Way {
        #[serde(default)]
        geometry: Vec<Option<LatLonPoint>>,
        #[serde(default)]
        tags: HashMap<String, String>,
    },
    Relation {
        #[serde(default)]
        members: Vec<Member>,
        #[serde(default)]
        tags: HashMap<String, String>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Member {
    #[serde(default)]
    role: String,
    #[serde(default)]
    geometry: Vec<Option<LatLonPoint>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct LatLonPoint {
    lat: f64,
    lon: f64,
}

fn to_line(points: &[Option<LatLonPoint>]) -> Vec<Position> {
    points.iter().flatten().map(|p| (p.lon, p.lat)).collect()
}

fn is_closed_ring(ring: &[Position]) -> bool {
    ring.len() >= 4 && ring.first() == ring.last()
}

/// Parses an Overpass JSON body into a feature collection for `layer`.
///
/// Roads keep ways as lines. Polygon layers keep closed ways and
/// multipolygon relations, whose closed outer members become polygons and
/// whose closed inner members become holes of the first polygon. The POI
/// layer keeps nodes only.
pub(crate) fn parse_elements(body: &[u8], layer: Layer) -> Result<FeatureCollection, SourceError> {
    let response: OverpassResponse = serde_json::from_slice(body)
        .map_err(|e| SourceError::InvalidResponse(format!("Overpass JSON: {}", e)))?;

    let mut collection = FeatureCollection::new();
    for element in response.elements {
        let feature = match (layer, element) {
            (Layer::Roads, Element::Way { geometry, tags }) => {
                let line = to_line(&geometry);
                (line.len() >= 2).then(|| {
                    Feature::new(Geometry::LineString(line), properties_for_layer(layer, &tags))
                })
            }
            (Layer::Water | Layer::Parks, Element::Way { geometry, .. }) => {
                let ring = to_line(&geometry);
                is_closed_ring(&ring).then(|| Feature::bare(Geometry::Polygon(vec![ring])))
            }
            (Layer::Water | Layer::Parks, Element::Relation { members, tags }) => {
                if tags.get("type").map(String::as_str) == Some("multipolygon") {
                    multipolygon(&members).map(Feature::bare)
                } else {
                    None
                }
            }
            (Layer::Pois, Element::Node { lat: Some(lat), lon: Some(lon), .. }) => {
                Some(Feature::bare(Geometry::Point((lon, lat))))
            }
            _ => None,
        };

        if let Some(feature) = feature {
            collection.push(feature);
        }
    }

    Ok(collection)
}

fn multipolygon(members: &[Member]) -> Option<Geometry> {
    let mut polygons: Vec<Vec<Vec<Position>>> = Vec::new();
    let mut holes = Vec::new();

    for member in members {
        let ring = to_line(&member.geometry);
        if !is_closed_ring(&ring) {
            continue;
        }
        match member.role.as_str() {
            "inner" => holes.push(ring),
            _ => polygons.push(vec![ring]),
        }
    }

    let first = polygons.first_mut()?;
    first.extend(holes);
    Some(Geometry::MultiPolygon(polygons))
}

/// Feature source that issues Overpass QL queries through a
/// [`FailoverRouter`].
pub struct OverpassSource<C: AsyncHttpClient> {
    client: Arc<C>,
    router: FailoverRouter,
}

impl<C: AsyncHttpClient> OverpassSource<C> {
    pub fn new(client: Arc<C>, router: FailoverRouter) -> Self {
        Self { client, router }
    }

    pub fn router(&self) -> &FailoverRouter {
        &self.router
    }

    /// Runs `query` with failover. The body is parsed inside each attempt so
    /// an unparseable reply moves on to the next mirror.
    async fn run(&self, query: String, layer: Layer) -> Result<FeatureCollection, SourceError> {
        let client = &self.client;
        let query = query.as_str();

        let raw = self
            .router
            .route(|mirror| async move {
                let body = client.post_form(&mirror, &[("data", query)]).await?;
                parse_elements(&body, layer)
            })
            .await?;

        let cleaned = clean_collection(raw, DEFAULT_SIMPLIFY_TOLERANCE, layer);
        info!(layer = %layer, features = cleaned.len(), "Overpass fetch complete");
        Ok(cleaned)
    }
}

impl<C: AsyncHttpClient> FeatureSource for OverpassSource<C> {
    async fn fetch_roads(
        &self,
        center: LatLon,
        radius_m: f64,
        detail: DetailLevel,
    ) -> Result<FeatureCollection, SourceError> {
        let bbox = BoundingBox::around(center, radius_m)?;
        let classes = road_classes(detail, radius_m);
        debug!(detail = %detail, classes = classes.len(), "Building road query");

        self.run(road_query(&bbox, &classes), Layer::Roads).await
    }

    async fn fetch_features(
        &self,
        center: LatLon,
        radius_m: f64,
        filters: &[TagFilter],
        layer: Layer,
    ) -> Result<FeatureCollection, SourceError> {
        let bbox = BoundingBox::around(center, radius_m)?;
        self.run(feature_query(&bbox, filters), layer).await
    }

    async fn fetch_pois(
        &self,
        center: LatLon,
        radius_m: f64,
    ) -> Result<FeatureCollection, SourceError> {
        let bbox = BoundingBox::around(center, radius_m)?;
        self.run(feature_query(&bbox, &poi_filters()), Layer::Pois)
            .await
    }

    fn name(&self) -> &str {
        "overpass"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Properties;
    use crate::source::query::water_filters;
    use crate::source::testing::{MockAsyncHttpClient, ScriptedHttpClient};

    const ROADS_BODY: &str = r#"{
        "version": 0.6,
        "elements": [
            {"type": "way", "id": 1, "tags": {"highway": "primary", "name": "Rue"},
             "geometry": [{"lat": 48.85, "lon": 2.35}, {"lat": 48.86, "lon": 2.36}]},
            {"type": "way", "id": 2, "tags": {"highway": "residential"},
             "geometry": [{"lat": 48.855, "lon": 2.355}, {"lat": 48.855, "lon": 2.365}]},
            {"type": "way", "id": 3, "tags": {"highway": "service"},
             "geometry": [{"lat": 48.0, "lon": 2.0}]},
            {"type": "node", "id": 4, "lat": 1.0, "lon": 2.0}
        ]
    }"#;

    const WATER_BODY: &str = r#"{
        "elements": [
            {"type": "way", "tags": {"natural": "water"},
             "geometry": [{"lat": 0, "lon": 0}, {"lat": 0, "lon": 1},
                          {"lat": 1, "lon": 1}, {"lat": 0, "lon": 0}]},
            {"type": "way", "tags": {"waterway": "riverbank"},
             "geometry": [{"lat": 0, "lon": 0}, {"lat": 0, "lon": 1}, {"lat": 1, "lon": 1}]},
            {"type": "relation", "tags": {"type": "multipolygon", "natural": "water"},
             "members": [
                {"type": "way", "role": "outer",
                 "geometry": [{"lat": 0, "lon": 0}, {"lat": 0, "lon": 10},
                              {"lat": 10, "lon": 10}, {"lat": 10, "lon": 0}, {"lat": 0, "lon": 0}]},
                {"type": "way", "role": "inner",
                 "geometry": [{"lat": 2, "lon": 2}, {"lat": 2, "lon": 3},
                              {"lat": 3, "lon": 3}, {"lat": 2, "lon": 2}]}
             ]}
        ]
    }"#;

    fn paris() -> LatLon {
        LatLon::new(48.8566, 2.3522)
    }

    fn source(body: &str) -> OverpassSource<MockAsyncHttpClient> {
        let client = Arc::new(MockAsyncHttpClient {
            response: Ok(body.as_bytes().to_vec()),
        });
        OverpassSource::new(client, FailoverRouter::with_default_mirrors())
    }

    #[test]
    fn test_parse_roads_keeps_ways_with_highway() {
        let fc = parse_elements(ROADS_BODY.as_bytes(), Layer::Roads).unwrap();
        assert_eq!(fc.len(), 2);
        assert_eq!(fc.features[0].properties, Properties::road("primary"));
        assert_eq!(
            fc.features[0].geometry,
            Geometry::LineString(vec![(2.35, 48.85), (2.36, 48.86)])
        );
    }

    #[test]
    fn test_parse_polygons_and_multipolygons() {
        let fc = parse_elements(WATER_BODY.as_bytes(), Layer::Water).unwrap();
        assert_eq!(fc.len(), 2);
        assert!(matches!(fc.features[0].geometry, Geometry::Polygon(_)));
        match &fc.features[1].geometry {
            Geometry::MultiPolygon(polygons) => {
                assert_eq!(polygons.len(), 1);
                assert_eq!(polygons[0].len(), 2);
            }
            other => panic!("unexpected geometry {:?}", other),
        }
    }

    #[test]
    fn test_parse_pois_keeps_nodes_only() {
        let fc = parse_elements(ROADS_BODY.as_bytes(), Layer::Pois).unwrap();
        assert_eq!(fc.features, vec![Feature::bare(Geometry::Point((2.0, 1.0)))]);
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(
            parse_elements(b"<html>rate limited</html>", Layer::Roads),
            Err(SourceError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_roads_cleans_and_strips() {
        let fc = source(ROADS_BODY)
            .fetch_roads(paris(), 500.0, DetailLevel::Simplified)
            .await
            .unwrap();
        assert_eq!(fc.len(), 2);
        assert_eq!(fc.features[1].properties, Properties::road("residential"));
    }

    #[tokio::test]
    async fn test_non_finite_center_rejected_before_network() {
        let client = Arc::new(ScriptedHttpClient::new().fallback(Ok(ROADS_BODY.into())));
        let source = OverpassSource::new(client.clone(), FailoverRouter::with_default_mirrors());

        let result = source
            .fetch_roads(LatLon::new(f64::NAN, 2.35), 500.0, DetailLevel::Detailed)
            .await;

        assert!(matches!(result, Err(SourceError::MalformedInput(_))));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_query_sent_as_data_field() {
        let client = Arc::new(ScriptedHttpClient::new().fallback(Ok(WATER_BODY.into())));
        let source = OverpassSource::new(client.clone(), FailoverRouter::with_default_mirrors());

        source
            .fetch_features(paris(), 500.0, &water_filters(), Layer::Water)
            .await
            .unwrap();

        let request = &client.requests()[0];
        assert_eq!(request.url, crate::source::DEFAULT_MIRRORS[0]);
        assert_eq!(request.fields[0].0, "data");
        assert!(request.fields[0].1.contains("nwr[\"natural\"=\"water\"]"));
    }

    #[tokio::test]
    async fn test_unparseable_reply_fails_over() {
        let client = Arc::new(
            ScriptedHttpClient::new()
                .route("https://m1", Ok(b"not json".to_vec()))
                .route("https://m2", Ok(ROADS_BODY.into())),
        );
        let router =
            FailoverRouter::new(vec!["https://m1".into(), "https://m2".into()]).unwrap();
        let source = OverpassSource::new(client.clone(), router);

        let fc = source
            .fetch_roads(paris(), 500.0, DetailLevel::Simplified)
            .await
            .unwrap();
        assert_eq!(fc.len(), 2);
        assert_eq!(client.call_count(), 2);
    }
}
