//! Conversion between [`Location`] records and point features.
//!
//! Every attribute of a location travels as a feature property so that a
//! click on a rendered point can rebuild the full record.

use foundation::geojson::{Feature, FeatureCollection, Geometry};
use foundation::ids::LocationId;
use foundation::location::Location;
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureError {
    MissingAttribute(&'static str),
    InvalidAttribute(&'static str),
}

impl std::fmt::Display for FeatureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureError::MissingAttribute(key) => write!(f, "feature has no `{key}` property"),
            FeatureError::InvalidAttribute(key) => write!(f, "feature `{key}` property is invalid"),
        }
    }
}

impl std::error::Error for FeatureError {}

/// Point feature for `location`; `None` when it has no usable coordinate.
pub fn location_to_feature(location: &Location) -> Option<Feature> {
    let coordinate = location.coordinate.filter(|c| c.is_finite())?;

    let mut properties = Map::new();
    properties.insert("id".into(), json!(location.id.get()));
    properties.insert("name".into(), json!(location.name));
    properties.insert("mention_count".into(), json!(location.mention_count));
    properties.insert("avg_sentiment".into(), json!(location.avg_sentiment));
    properties.insert("place_type".into(), json!(location.place_type));
    properties.insert(
        "city".into(),
        location.city.as_ref().map_or(Value::Null, |c| json!(c)),
    );

    Some(Feature::new(Geometry::point(coordinate), properties))
}

/// Builds a complete collection. Locations without a coordinate are skipped.
pub fn locations_to_collection(locations: &[Location]) -> FeatureCollection {
    let mut features = Vec::with_capacity(locations.len());
    for location in locations {
        match location_to_feature(location) {
            Some(feature) => features.push(feature),
            None => tracing::debug!(id = %location.id, "skipping location without coordinate"),
        }
    }
    FeatureCollection::new(features)
}

pub fn location_from_feature(feature: &Feature) -> Result<Location, FeatureError> {
    let id = feature
        .u64_property("id")
        .ok_or_else(|| missing_or_invalid(feature, "id"))?;
    let name = feature
        .str_property("name")
        .ok_or_else(|| missing_or_invalid(feature, "name"))?;
    let mention_count = feature
        .u64_property("mention_count")
        .ok_or_else(|| missing_or_invalid(feature, "mention_count"))?;
    let avg_sentiment = feature
        .f64_property("avg_sentiment")
        .ok_or_else(|| missing_or_invalid(feature, "avg_sentiment"))?;
    let place_type = feature.str_property("place_type").unwrap_or_default();
    let city = match feature.property("city") {
        None | Some(Value::Null) => None,
        Some(Value::String(c)) => Some(c.clone()),
        Some(_) => return Err(FeatureError::InvalidAttribute("city")),
    };

    let coordinate = feature.geometry.anchor();
    if !coordinate.is_finite() {
        return Err(FeatureError::InvalidAttribute("coordinates"));
    }

    Ok(Location {
        id: LocationId::new(id),
        name: name.to_string(),
        place_type: place_type.to_string(),
        city,
        mention_count,
        avg_sentiment,
        coordinate: Some(coordinate),
    })
}

pub fn collection_to_locations(collection: &FeatureCollection) -> Vec<Location> {
    collection
        .features
        .iter()
        .filter_map(|f| match location_from_feature(f) {
            Ok(location) => Some(location),
            Err(err) => {
                tracing::debug!(%err, "ignoring malformed feature");
                None
            }
        })
        .collect()
}

fn missing_or_invalid(feature: &Feature, key: &'static str) -> FeatureError {
    if feature.property(key).is_some() {
        FeatureError::InvalidAttribute(key)
    } else {
        FeatureError::MissingAttribute(key)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        FeatureError, collection_to_locations, location_from_feature, location_to_feature,
        locations_to_collection,
    };
    use foundation::geo::LngLat;
    use foundation::geojson::{Feature, Geometry};
    use foundation::ids::LocationId;
    use foundation::location::Location;
    use pretty_assertions::assert_eq;
    use serde_json::{Map, json};

    fn waikiki() -> Location {
        Location {
            id: LocationId::new(7),
            name: "Waikiki Beach".into(),
            place_type: "beach".into(),
            city: Some("Honolulu".into()),
            mention_count: 42,
            avg_sentiment: 0.61,
            coordinate: Some(LngLat::new(-157.8294, 21.2764)),
        }
    }

    #[test]
    fn round_trip_preserves_every_attribute() {
        let mut no_city = waikiki();
        no_city.id = LocationId::new(8);
        no_city.city = None;
        let input = vec![waikiki(), no_city];

        let collection = locations_to_collection(&input);
        assert_eq!(collection.len(), 2);
        assert_eq!(collection_to_locations(&collection), input);
    }

    #[test]
    fn locations_without_coordinate_are_skipped() {
        let mut unresolved = waikiki();
        unresolved.coordinate = None;
        assert_eq!(location_to_feature(&unresolved), None);
        assert!(locations_to_collection(&[unresolved]).is_empty());
    }

    #[test]
    fn malformed_features_report_the_attribute() {
        let mut props = Map::new();
        props.insert("id".into(), json!(1));
        props.insert("name".into(), json!("Diamond Head"));
        props.insert("mention_count".into(), json!("many"));
        let feature = Feature::new(Geometry::point(LngLat::new(0.0, 0.0)), props);

        assert_eq!(
            location_from_feature(&feature),
            Err(FeatureError::InvalidAttribute("mention_count"))
        );

        let empty = Feature::new(Geometry::point(LngLat::new(0.0, 0.0)), Map::new());
        assert_eq!(
            location_from_feature(&empty),
            Err(FeatureError::MissingAttribute("id"))
        );
        assert!(collection_to_locations(&foundation::geojson::FeatureCollection::new(vec![empty])).is_empty());
    }
}
