//! Heatmap data for the active time range, latest request wins.

use foundation::bounds::BoundingBox;
use foundation::geojson::FeatureCollection;
use foundation::time::TimeRange;
use runtime::sequence::{RequestSeq, Sequencer};

use crate::error::DataError;

/// One heatmap request to execute.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FetchTicket {
    pub seq: RequestSeq,
    pub time_range: TimeRange,
    pub bbox: Option<BoundingBox>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedOutcome {
    /// Newest data; push it to the map.
    Applied(FeatureCollection),
    /// Newest request failed; previous data stays.
    Failed(DataError),
    /// Superseded response, ignored.
    Stale,
}

#[derive(Debug, Default)]
pub struct LocationsFeed {
    time_range: TimeRange,
    bbox: Option<BoundingBox>,
    seq: Sequencer,
    loading: bool,
    error: Option<DataError>,
    data: Option<FeatureCollection>,
}

impl LocationsFeed {
    pub fn new(time_range: TimeRange) -> Self {
        Self {
            time_range,
            ..Self::default()
        }
    }

    pub fn time_range(&self) -> TimeRange {
        self.time_range
    }

    pub fn bbox(&self) -> Option<BoundingBox> {
        self.bbox
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&DataError> {
        self.error.as_ref()
    }

    /// Last successfully fetched collection.
    pub fn data(&self) -> Option<&FeatureCollection> {
        self.data.as_ref()
    }

    /// Issues a request for the current filter, superseding any in flight.
    pub fn request(&mut self) -> FetchTicket {
        self.loading = true;
        self.error = None;
        let ticket = FetchTicket {
            seq: self.seq.issue(),
            time_range: self.time_range,
            bbox: self.bbox,
        };
        tracing::debug!(seq = ticket.seq.0, range = %ticket.time_range, "heatmap requested");
        ticket
    }

    /// Switches the filter. Returns a request only when the range changed.
    pub fn set_time_range(&mut self, time_range: TimeRange) -> Option<FetchTicket> {
        if time_range == self.time_range {
            return None;
        }
        self.time_range = time_range;
        Some(self.request())
    }

    pub fn set_bbox(&mut self, bbox: Option<BoundingBox>) -> Option<FetchTicket> {
        if bbox == self.bbox {
            return None;
        }
        self.bbox = bbox;
        Some(self.request())
    }

    pub fn complete(
        &mut self,
        seq: RequestSeq,
        result: Result<FeatureCollection, DataError>,
    ) -> FeedOutcome {
        if !self.seq.accept(seq) {
            return FeedOutcome::Stale;
        }
        self.loading = false;
        match result {
            Ok(collection) => {
                tracing::debug!(features = collection.len(), "heatmap applied");
                self.data = Some(collection.clone());
                FeedOutcome::Applied(collection)
            }
            Err(err) => {
                tracing::warn!(%err, "heatmap fetch failed");
                self.error = Some(err.clone());
                FeedOutcome::Failed(err)
            }
        }
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Drops any request in flight.
    pub fn cancel(&mut self) {
        self.seq.invalidate();
        self.loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::{FeedOutcome, LocationsFeed};
    use crate::error::DataError;
    use foundation::geo::LngLat;
    use foundation::geojson::{Feature, FeatureCollection, Geometry};
    use foundation::time::TimeRange;
    use pretty_assertions::assert_eq;
    use serde_json::Map;

    fn collection(n: usize) -> FeatureCollection {
        FeatureCollection::new(
            (0..n)
                .map(|i| Feature::new(Geometry::point(LngLat::new(i as f64, 0.0)), Map::new()))
                .collect(),
        )
    }

    #[test]
    fn slow_all_time_response_cannot_overwrite_today() {
        let mut feed = LocationsFeed::new(TimeRange::All);
        let all = feed.request();
        let day = feed.set_time_range(TimeRange::Day).unwrap();

        assert_eq!(
            feed.complete(day.seq, Ok(collection(1))),
            FeedOutcome::Applied(collection(1))
        );
        assert_eq!(feed.complete(all.seq, Ok(collection(5))), FeedOutcome::Stale);
        assert_eq!(feed.data(), Some(&collection(1)));
        assert!(!feed.loading());
    }

    #[test]
    fn failure_keeps_last_data() {
        let mut feed = LocationsFeed::new(TimeRange::All);
        let first = feed.request();
        feed.complete(first.seq, Ok(collection(2)));

        let retry = feed.request();
        assert!(feed.loading());
        let outcome = feed.complete(retry.seq, Err(DataError::http(500, None)));
        assert_eq!(outcome, FeedOutcome::Failed(DataError::http(500, None)));
        assert_eq!(feed.data(), Some(&collection(2)));
        assert_eq!(feed.error().map(|e| e.to_string()), Some("HTTP error 500".into()));
    }

    #[test]
    fn unchanged_filter_issues_nothing() {
        let mut feed = LocationsFeed::new(TimeRange::Week);
        assert_eq!(feed.set_time_range(TimeRange::Week), None);
        assert_eq!(feed.set_bbox(None), None);
    }

    #[test]
    fn cancel_drops_in_flight() {
        let mut feed = LocationsFeed::new(TimeRange::All);
        let t = feed.request();
        feed.cancel();
        assert_eq!(feed.complete(t.seq, Ok(collection(1))), FeedOutcome::Stale);
        assert!(!feed.loading());
    }
}
