//! `DataLayer` over HTTP with `reqwest`.

use foundation::bounds::BoundingBox;
use foundation::geojson::FeatureCollection;
use foundation::ids::LocationId;
use foundation::location::Location;
use foundation::time::TimeRange;
use serde::de::DeserializeOwned;

use crate::error::DataError;
use crate::layer::{DataLayer, LocalBoxFuture};
use crate::protocol::{Endpoint, ErrorBody, LocationDetail, SearchHit};

#[derive(Debug, Clone)]
pub struct HttpDataLayer {
    base: String,
    client: reqwest::Client,
}

impl HttpDataLayer {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(base: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base: base.into(),
            client,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, DataError> {
        let url = endpoint.url(&self.base);
        tracing::debug!(%url, query = ?endpoint.query, "GET");

        let resp = self
            .client
            .get(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .query(&endpoint.query)
            .send()
            .await
            .map_err(|e| DataError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.bytes().await.unwrap_or_default();
            let detail = ErrorBody::parse(&body).detail;
            return Err(DataError::http(status.as_u16(), detail));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| DataError::Transport(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| DataError::Decode(e.to_string()))
    }
}

impl DataLayer for HttpDataLayer {
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
