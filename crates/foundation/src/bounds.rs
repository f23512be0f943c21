use crate::geo::LngLat;

/// Axis-aligned geographic bounding box (degrees).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub fn new(min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> Self {
        BoundingBox {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        }
    }

    pub fn contains(&self, p: LngLat) -> bool {
        p.lat >= self.min_lat && p.lat <= self.max_lat && p.lng >= self.min_lng && p.lng <= self.max_lng
    }

    /// Query pairs in the order the heatmap endpoint expects them.
    pub fn query_pairs(&self) -> [(&'static str, String); 4] {
        [
            ("min_lat", self.min_lat.to_string()),
            ("max_lat", self.max_lat.to_string()),
            ("min_lng", self.min_lng.to_string()),
            ("max_lng", self.max_lng.to_string()),
        ]
    }
}
