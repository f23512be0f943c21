//! `DataLayer` over the browser's fetch API with `gloo-net`.

use foundation::bounds::BoundingBox;
use foundation::geojson::FeatureCollection;
use foundation::ids::LocationId;
use foundation::location::Location;
use foundation::time::TimeRange;
use gloo_net::http::Request;
use serde::de::DeserializeOwned;

use crate::error::DataError;
use crate::layer::{DataLayer, LocalBoxFuture};
use crate::protocol::{Endpoint, ErrorBody, LocationDetail, SearchHit};

#[derive(Debug, Clone)]
pub struct FetchDataLayer {
    base: String,
}

impl FetchDataLayer {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, DataError> {
        let url = endpoint.url(&self.base);
        let pairs = endpoint.query.iter().map(|(k, v)| (*k, v.as_str()));
        let resp = Request::get(&url)
            .header("Content-Type", "application/json")
            .query(pairs)
            .send()
            .await
            .map_err(|e| DataError::Transport(e.to_string()))?;

        if !resp.ok() {
            let body = resp.binary().await.unwrap_or_default();
            return Err(DataError::http(resp.status(), ErrorBody::parse(&body).detail));
        }
        resp.json::<T>()
            .await
            .map_err(|e| DataError::Decode(e.to_string()))
    }
}

impl DataLayer for FetchDataLayer {
    fn fetch_heatmap(
        &self,
        time_range: TimeRange,
        bbox: Option<BoundingBox>,
    ) -> LocalBoxFuture<'_, Result<FeatureCollection, DataError>> {
        Box::pin(self.get_json(Endpoint::heatmap(time_range, bbox.as_ref())))
    }

    fn search_locations(
        &self,
        query: String,
        time_range: TimeRange,
        limit: usize,
    ) -> LocalBoxFuture<'_, Result<Vec<Location>, DataError>> {
        Box::pin(async move {
            let hits: Vec<SearchHit> = self
                .get_json(Endpoint::search(&query, time_range, limit))
                .await?;
            Ok(hits.into_iter().map(Location::from).collect())
        })
    }

    fn fetch_location_detail(
        &self,
        id: LocationId,
    ) -> LocalBoxFuture<'_, Result<LocationDetail, DataError>> {
        Box::pin(self.get_json(Endpoint::detail(id)))
    }
}
