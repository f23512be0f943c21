use serde::{Deserialize, Serialize};

use crate::geo::LngLat;
use crate::ids::LocationId;

/// A point of interest with its aggregated mention statistics.
///
/// Heatmap features always carry a coordinate; search results do not, so the
/// coordinate stays optional until a detail fetch resolves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub place_type: String,
    #[serde(default)]
    pub city: Option<String>,
    pub mention_count: u64,
    pub avg_sentiment: f64,
    #[serde(default, rename = "coordinates", skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<LngLat>,
}

impl Location {
    /// Sentiment clamped into the documented `[-1, 1]` range.
    pub fn sentiment(&self) -> f64 {
        if self.avg_sentiment.is_nan() {
            return 0.0;
        }
        self.avg_sentiment.clamp(-1.0, 1.0)
    }

    /// City for display; the region name when the backend has none.
    pub fn display_city(&self) -> &str {
        self.city.as_deref().unwrap_or("Hawaii")
    }

    pub fn with_coordinate(mut self, coordinate: LngLat) -> Self {
        self.coordinate = Some(coordinate);
        self
    }
}
