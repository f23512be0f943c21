//! Request and response shapes of the locations API.
//!
//! ```text
//! GET {base}/heatmap?time_range=..[&min_lat&max_lat&min_lng&max_lng]  -> FeatureCollection
//! GET {base}/locations/search?q=..&time_range=..&limit=..             -> [SearchHit]
//! GET {base}/locations/{id}                                           -> LocationDetail
//! ```

use foundation::bounds::BoundingBox;
use foundation::geo::LngLat;
use foundation::ids::LocationId;
use foundation::location::Location;
use foundation::time::TimeRange;
use serde::{Deserialize, Serialize};

/// Default number of search results requested.
pub const SEARCH_LIMIT: usize = 20;

/// Upper bound the server accepts for `limit`.
pub const MAX_SEARCH_LIMIT: usize = 100;

/// A relative request: path under the API base plus query pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub path: String,
    pub query: Vec<(&'static str, String)>,
}

impl Endpoint {
    pub fn heatmap(time_range: TimeRange, bbox: Option<&BoundingBox>) -> Self {
        let mut query = vec![("time_range", time_range.as_str().to_string())];
        if let Some(bbox) = bbox {
            query.extend(bbox.query_pairs());
        }
        Self {
            path: "/heatmap".to_string(),
            query,
        }
    }

    pub fn search(q: &str, time_range: TimeRange, limit: usize) -> Self {
        Self {
            path: "/locations/search".to_string(),
            query: vec![
                ("q", q.to_string()),
                ("time_range", time_range.as_str().to_string()),
                ("limit", limit.clamp(1, MAX_SEARCH_LIMIT).to_string()),
            ],
        }
    }

    pub fn detail(id: LocationId) -> Self {
        Self {
            path: format!("/locations/{id}"),
            query: Vec::new(),
        }
    }

    /// `base` joined with the path; query pairs are left to the HTTP client.
    pub fn url(&self, base: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), self.path)
    }
}

/// One search result. Carries no coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: LocationId,
    pub name: String,
    pub place_type: String,
    #[serde(default)]
    pub city: Option<String>,
    pub mention_count: u64,
    pub avg_sentiment: f64,
}

impl From<SearchHit> for Location {
    fn from(hit: SearchHit) -> Self {
        Location {
            id: hit.id,
            name: hit.name,
            place_type: hit.place_type,
            city: hit.city,
            mention_count: hit.mention_count,
            avg_sentiment: hit.avg_sentiment,
            coordinate: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub reddit_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    pub subreddit: String,
    pub posted_at: String,
    pub scraped_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    pub id: u64,
    pub location_id: LocationId,
    pub post_id: u64,
    #[serde(default)]
    pub sentiment_score: f64,
    #[serde(default)]
    pub context: Option<String>,
    pub created_at: String,
    pub post: Post,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDetail {
    pub id: LocationId,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub place_type: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default = "default_state")]
    pub state: String,
    pub created_at: String,
    #[serde(default)]
    pub mention_count: u64,
    #[serde(default)]
    pub avg_sentiment: f64,
    /// Newest first, at most ten.
    #[serde(default)]
    pub recent_mentions: Vec<Mention>,
}

fn default_state() -> String {
    "HI".to_string()
}

impl LocationDetail {
    pub fn coordinate(&self) -> LngLat {
        LngLat::new(self.lng, self.lat)
    }

    pub fn to_location(&self) -> Location {
        Location {
            id: self.id,
            name: self.name.clone(),
            place_type: self.place_type.clone(),
            city: self.city.clone(),
            mention_count: self.mention_count,
            avg_sentiment: self.avg_sentiment,
            coordinate: Some(self.coordinate()),
        }
    }
}

/// Body of a non-2xx response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorBody {
    /// Parses a response body leniently; anything unreadable has no detail.
    pub fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }
}
