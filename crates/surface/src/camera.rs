use foundation::geo::LngLat;

/// Viewport state of a rendering surface.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraView {
    pub center: LngLat,
    pub zoom: f64,
}

impl CameraView {
    pub fn new(center: LngLat, zoom: f64) -> Self {
        Self { center, zoom }
    }
}

/// Animated camera move request.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FlyTo {
    pub center: LngLat,
    pub zoom: f64,
    pub duration_ms: u64,
}
