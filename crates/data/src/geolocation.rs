//! Best-effort device position.

use foundation::geo::LngLat;

use crate::layer::LocalBoxFuture;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GeolocationError {
    Unsupported,
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Unknown,
}

impl GeolocationError {
    /// Maps a W3C `GeolocationPositionError.code`.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => GeolocationError::PermissionDenied,
            2 => GeolocationError::PositionUnavailable,
            3 => GeolocationError::Timeout,
            _ => GeolocationError::Unknown,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            GeolocationError::Unsupported => "Geolocation is not supported by your browser",
            GeolocationError::PermissionDenied => "User denied the request for Geolocation",
            GeolocationError::PositionUnavailable => "Location information is unavailable",
            GeolocationError::Timeout => "The request to get user location timed out",
            GeolocationError::Unknown => "An unknown error occurred",
        }
    }
}

impl std::fmt::Display for GeolocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for GeolocationError {}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Position {
    pub coordinate: LngLat,
    /// Meters.
    pub accuracy: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout_ms: u32,
    pub maximum_age_ms: u32,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout_ms: 10_000,
            maximum_age_ms: 0,
        }
    }
}

pub trait Geolocator {
    fn current_position(
        &self,
        options: PositionOptions,
    ) -> LocalBoxFuture<'_, Result<Position, GeolocationError>>;
}

/// Answers every request with the same result.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StaticGeolocator(pub Result<Position, GeolocationError>);

impl StaticGeolocator {
    pub fn unsupported() -> Self {
        Self(Err(GeolocationError::Unsupported))
    }

    pub fn at(coordinate: LngLat, accuracy: f64) -> Self {
        Self(Ok(Position {
            coordinate,
            accuracy,
        }))
    }
}

impl Geolocator for StaticGeolocator {
    fn current_position(
        &self,
        _options: PositionOptions,
    ) -> LocalBoxFuture<'_, Result<Position, GeolocationError>> {
        let result = self.0;
        Box::pin(async move { result })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeolocationState {
    pub position: Option<Position>,
    pub error: Option<GeolocationError>,
    pub loading: bool,
}

impl GeolocationState {
    pub fn begin(&mut self) {
        self.loading = true;
    }

    pub fn complete(&mut self, result: Result<Position, GeolocationError>) {
        self.loading = false;
        match result {
            Ok(position) => {
                self.position = Some(position);
                self.error = None;
            }
            Err(err) => {
                tracing::info!(%err, "geolocation unavailable");
                self.error = Some(err);
            }
        }
    }

    pub fn error_message(&self) -> Option<&'static str> {
        self.error.map(GeolocationError::message)
    }
}
