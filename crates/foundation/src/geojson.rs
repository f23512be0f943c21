//! Minimal GeoJSON model: point features with free-form properties.
//!
//! Only the subset the heatmap endpoint produces is modelled. Unknown geometry
//! types fail to decode rather than being silently dropped.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::geo::LngLat;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
enum CollectionTag {
    #[default]
    FeatureCollection,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
enum FeatureTag {
    #[default]
    Feature,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: LngLat },
}

impl Geometry {
    pub fn point(coordinate: LngLat) -> Self {
        Geometry::Point {
            coordinates: coordinate,
        }
    }

    pub fn anchor(&self) -> LngLat {
        match self {
            Geometry::Point { coordinates } => *coordinates,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default)]
    tag: FeatureTag,
    pub geometry: Geometry,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn new(geometry: Geometry, properties: Map<String, Value>) -> Self {
        Self {
            tag: FeatureTag::Feature,
            geometry,
            properties,
        }
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn f64_property(&self, key: &str) -> Option<f64> {
        self.properties.get(key).and_then(Value::as_f64)
    }

    pub fn u64_property(&self, key: &str) -> Option<u64> {
        self.properties.get(key).and_then(Value::as_u64)
    }

    pub fn str_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default)]
    tag: CollectionTag,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            tag: CollectionTag::FeatureCollection,
            features,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Feature, FeatureCollection, Geometry};
    use crate::geo::LngLat;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn decodes_heatmap_payload() {
        let payload = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [-157.85, 21.30]},
                "properties": {"id": 1, "name": "Ala Moana", "mention_count": 12,
                               "avg_sentiment": 0.2, "place_type": "mall", "city": null}
            }]
        });
        let fc: FeatureCollection = serde_json::from_value(payload).unwrap();
        assert_eq!(fc.len(), 1);
        let f = &fc.features[0];
        assert_eq!(f.geometry.anchor(), LngLat::new(-157.85, 21.30));
        assert_eq!(f.u64_property("mention_count"), Some(12));
        assert_eq!(f.str_property("name"), Some("Ala Moana"));
        assert_eq!(f.str_property("city"), None);
    }

    #[test]
    fn encodes_type_tags() {
        let fc = FeatureCollection::new(vec![Feature::new(
            Geometry::point(LngLat::new(1.0, 2.0)),
            Default::default(),
        )]);
        let v = serde_json::to_value(&fc).unwrap();
        assert_eq!(v["type"], "FeatureCollection");
        assert_eq!(v["features"][0]["type"], "Feature");
        assert_eq!(v["features"][0]["geometry"]["type"], "Point");
        assert_eq!(v["features"][0]["geometry"]["coordinates"], json!([1.0, 2.0]));
    }

    #[test]
    fn rejects_unknown_geometry() {
        let bad = json!({"type": "Feature", "geometry": {"type": "LineString", "coordinates": []}, "properties": {}});
        assert!(serde_json::from_value::<Feature>(bad).is_err());
    }
}
