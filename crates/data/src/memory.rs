//! In-memory `DataLayer` with canned responses and a call log.

use std::cell::RefCell;
use std::collections::HashMap;

use foundation::bounds::BoundingBox;
use foundation::geojson::FeatureCollection;
use foundation::ids::LocationId;
use foundation::location::Location;
use foundation::time::TimeRange;

use crate::error::DataError;
use crate::layer::{DataLayer, LocalBoxFuture};
use crate::protocol::LocationDetail;

#[derive(Debug, Clone, PartialEq)]
pub enum DataCall {
    Heatmap {
        time_range: TimeRange,
        bbox: Option<BoundingBox>,
    },
    Search {
        query: String,
        time_range: TimeRange,
        limit: usize,
    },
    Detail(LocationId),
}

#[derive(Debug, Default)]
pub struct MemoryDataLayer {
    heatmaps: HashMap<TimeRange, FeatureCollection>,
    locations: Vec<Location>,
    details: HashMap<LocationId, LocationDetail>,
    fail_next: RefCell<Option<DataError>>,
    calls: RefCell<Vec<DataCall>>,
}

impl MemoryDataLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Heatmap served for `time_range`. Ranges without one fall back to `All`.
    pub fn with_heatmap(mut self, time_range: TimeRange, collection: FeatureCollection) -> Self {
        self.heatmaps.insert(time_range, collection);
        self
    }

    /// Search index.
    pub fn with_locations(mut self, locations: Vec<Location>) -> Self {
        self.locations = locations;
        self
    }

    pub fn with_detail(mut self, detail: LocationDetail) -> Self {
        self.details.insert(detail.id, detail);
        self
    }

    /// The next call of any kind fails with `err`.
    pub fn fail_next(&self, err: DataError) {
        *self.fail_next.borrow_mut() = Some(err);
    }

    pub fn calls(&self) -> Vec<DataCall> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: DataCall) -> Result<(), DataError> {
        self.calls.borrow_mut().push(call);
        match self.fail_next.borrow_mut().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn heatmap(&self, time_range: TimeRange, bbox: Option<BoundingBox>) -> FeatureCollection {
        let Some(all) = self
            .heatmaps
            .get(&time_range)
            .or_else(|| self.heatmaps.get(&TimeRange::All))
        else {
            return FeatureCollection::empty();
        };
        match bbox {
            None => all.clone(),
            Some(bbox) => FeatureCollection::new(
                all.features
                    .iter()
                    .filter(|f| bbox.contains(f.geometry.anchor()))
                    .cloned()
                    .collect(),
            ),
        }
    }

    fn search(&self, query: &str, limit: usize) -> Vec<Location> {
        let needle = query.trim().to_lowercase();
        let matches = |s: &str| s.to_lowercase().contains(&needle);
        let mut hits: Vec<Location> = self
            .locations
            .iter()
            .filter(|l| {
                matches(&l.name)
                    || matches(&l.place_type)
                    || l.city.as_deref().is_some_and(matches)
            })
            .map(|l| Location {
                coordinate: None,
                ..l.clone()
            })
            .collect();
        hits.sort_by(|a, b| b.mention_count.cmp(&a.mention_count));
        hits.truncate(limit);
        hits
    }
}

impl DataLayer for MemoryDataLayer {
    fn fetch_heatmap(
        &self,
        time_range: TimeRange,
        bbox: Option<BoundingBox>,
    ) -> LocalBoxFuture<'_, Result<FeatureCollection, DataError>> {
        let result = self
            .record(DataCall::Heatmap { time_range, bbox })
            .map(|()| self.heatmap(time_range, bbox));
        Box::pin(async move { result })
    }

    fn search_locations(
        &self,
        query: String,
        time_range: TimeRange,
        limit: usize,
    ) -> LocalBoxFuture<'_, Result<Vec<Location>, DataError>> {
        let result = self
            .record(DataCall::Search {
                query: query.clone(),
                time_range,
                limit,
            })
            .map(|()| self.search(&query, limit));
        Box::pin(async move { result })
    }

    fn fetch_location_detail(
        &self,
        id: LocationId,
    ) -> LocalBoxFuture<'_, Result<LocationDetail, DataError>> {
        let result = self.record(DataCall::Detail(id)).and_then(|()| {
            self.details
                .get(&id)
                .cloned()
                .ok_or_else(|| DataError::http(404, Some("Location not found".to_string())))
        });
        Box::pin(async move { result })
    }
}
