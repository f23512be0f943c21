use std::future::Future;
use std::pin::Pin;

use foundation::bounds::BoundingBox;
use foundation::geojson::FeatureCollection;
use foundation::ids::LocationId;
use foundation::location::Location;
use foundation::time::TimeRange;

use crate::error::DataError;
use crate::protocol::LocationDetail;

/// Boxed future for the single-threaded event loop; not `Send`.
pub type LocalBoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// The locations API as consumed by the map.
///
/// Methods return boxed futures so the trait stays dyn-compatible.
pub trait DataLayer {
    fn fetch_heatmap(
        &self,
        time_range: TimeRange,
        bbox: Option<BoundingBox>,
    ) -> LocalBoxFuture<'_, Result<FeatureCollection, DataError>>;

    /// Locations matching `query`, most mentioned first.
    fn search_locations(
        &self,
        query: String,
        time_range: TimeRange,
        limit: usize,
    ) -> LocalBoxFuture<'_, Result<Vec<Location>, DataError>>;

    fn fetch_location_detail(
        &self,
        id: LocationId,
    ) -> LocalBoxFuture<'_, Result<LocationDetail, DataError>>;
}
