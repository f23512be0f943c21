//! Animated "focus on a place" camera moves.
//!
//! A focus always lands at a fixed detail zoom above the point-layer
//! threshold, so the focused location is drawn as an individual point. Moves
//! are not queued: each one replaces whatever animation is in flight.

use foundation::geo::LngLat;
use surface::camera::FlyTo;
use surface::error::SurfaceError;
use surface::surface::RenderSurface;

/// Zoom level a focused location is shown at.
pub const FOCUS_ZOOM: f64 = 14.0;

/// Duration of the focus animation in milliseconds.
pub const FOCUS_DURATION_MS: u64 = 1500;

#[derive(Debug, Clone, PartialEq)]
pub struct CameraController {
    focus_zoom: f64,
    duration_ms: u64,
    last: Option<FlyTo>,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(FOCUS_ZOOM, FOCUS_DURATION_MS)
    }
}

impl CameraController {
    pub fn new(focus_zoom: f64, duration_ms: u64) -> Self {
        Self {
            focus_zoom,
            duration_ms,
            last: None,
        }
    }

    pub fn focus_zoom(&self) -> f64 {
        self.focus_zoom
    }

    /// Most recent move issued to the surface.
    pub fn last_focus(&self) -> Option<FlyTo> {
        self.last
    }

    /// Flies to `coordinate`. Absent or non-finite coordinates are a no-op
    /// and return `Ok(None)`.
    pub fn focus<S>(
        &mut self,
        surface: &mut S,
        coordinate: Option<LngLat>,
    ) -> Result<Option<FlyTo>, SurfaceError>
    where
        S: RenderSurface + ?Sized,
    {
        let Some(center) = coordinate.filter(|c| c.is_finite()) else {
            tracing::debug!("focus skipped, no coordinate");
            return Ok(None);
        };

        let fly = FlyTo {
            center,
            zoom: self.focus_zoom,
            duration_ms: self.duration_ms,
        };
        surface.fly_to(fly)?;
        if self.last.is_some_and(|prev| prev != fly) {
            tracing::debug!(lng = center.lng, lat = center.lat, "superseding camera move");
        }
        self.last = Some(fly);
        Ok(Some(fly))
    }
}

#[cfg(test)]
mod tests {
    use super::{CameraController, FOCUS_DURATION_MS, FOCUS_ZOOM};
    use foundation::geo::LngLat;
    use pretty_assertions::assert_eq;
    use runtime::event_bus::EventQueue;
    use surface::headless::{HeadlessFactory, HeadlessSurface, SurfaceProbe};
    use surface::surface::{SurfaceFactory, SurfaceOptions};

    fn surface() -> (HeadlessSurface, SurfaceProbe) {
        let mut factory = HeadlessFactory::new();
        let queue = EventQueue::new();
        let options = SurfaceOptions {
            container: "map".into(),
            style_url: "style".into(),
            access_token: "tok".into(),
            center: LngLat::new(-157.8583, 21.3069),
            zoom: 7.0,
        };
        let surface = factory.create(&options, queue.sender()).unwrap();
        (surface, factory.last_probe().unwrap())
    }

    #[test]
    fn missing_coordinate_is_a_no_op() {
        let (mut surface, probe) = surface();
        let mut camera = CameraController::default();
        assert_eq!(camera.focus(&mut surface, None), Ok(None));
        assert_eq!(
            camera.focus(&mut surface, Some(LngLat::new(f64::NAN, 1.0))),
            Ok(None)
        );
        assert!(probe.fly_history().is_empty());
    }

    #[test]
    fn last_focus_wins() {
        let (mut surface, probe) = surface();
        let mut camera = CameraController::default();
        let a = LngLat::new(-157.85, 21.30);
        let b = LngLat::new(-155.08, 19.72);

        camera.focus(&mut surface, Some(a)).unwrap();
        probe.step_animation(200);
        camera.focus(&mut surface, Some(b)).unwrap();
        probe.step_animation(FOCUS_DURATION_MS);

        assert_eq!(probe.fly_history().len(), 2);
        assert_eq!(probe.camera().center, b);
        assert_eq!(probe.camera().zoom, FOCUS_ZOOM);
        assert_eq!(camera.last_focus().map(|f| f.center), Some(b));
    }
}
