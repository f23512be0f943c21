//! Creation, readiness and teardown of the rendering surface.
//!
//! ```text
//! Detached --initialize--> Pending --Loaded--> Ready
//!    ^                        |                  |
//!    +--------teardown--------+------------------+
//! ```
//!
//! Without an access token `initialize` lands in `Diagnostic` instead of
//! creating anything.

use foundation::geo::LngLat;
use runtime::event_bus::EventSender;
use surface::control::{ControlId, ControlPosition, ControlSpec, GeolocateOptions};
use surface::error::SurfaceError;
use surface::event::SurfaceEvent;
use surface::surface::{RenderSurface, SurfaceFactory, SurfaceOptions};

use crate::config::{AccessMode, ConfigError, ViewerConfig};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LifecycleState {
    Detached,
    /// Created, waiting for the load signal.
    Pending,
    Ready,
    Diagnostic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    Created,
    /// A handle is already live; nothing was done.
    AlreadyLive,
    Diagnostic(ConfigError),
}

pub struct SurfaceLifecycle<F: SurfaceFactory> {
    factory: F,
    access: AccessMode,
    style_url: String,
    surface: Option<F::Surface>,
    controls: Vec<ControlId>,
    ready: bool,
    diagnostic: Option<ConfigError>,
}

impl<F: SurfaceFactory> SurfaceLifecycle<F> {
    pub fn new(factory: F, config: &ViewerConfig) -> Self {
        Self {
            factory,
            access: config.access_mode(),
            style_url: config.style_url.clone(),
            surface: None,
            controls: Vec::new(),
            ready: false,
            diagnostic: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        match (&self.surface, self.ready) {
            (Some(_), true) => LifecycleState::Ready,
            (Some(_), false) => LifecycleState::Pending,
            (None, _) if self.diagnostic.is_some() => LifecycleState::Diagnostic,
            (None, _) => LifecycleState::Detached,
        }
    }

    pub fn is_live(&self) -> bool {
        self.surface.is_some()
    }

    pub fn is_ready(&self) -> bool {
        self.ready && self.surface.is_some()
    }

    pub fn diagnostic(&self) -> Option<&ConfigError> {
        self.diagnostic.as_ref()
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// The live surface, ready or not.
    pub fn surface_mut(&mut self) -> Option<&mut F::Surface> {
        self.surface.as_mut()
    }

    /// The live surface, only once it has signalled readiness.
    pub fn ready_surface_mut(&mut self) -> Option<&mut F::Surface> {
        if self.ready { self.surface.as_mut() } else { None }
    }

    /// Creates the surface and its controls. Idempotent while a handle is
    /// live.
    pub fn initialize(
        &mut self,
        container: &str,
        center: LngLat,
        zoom: f64,
        events: EventSender<SurfaceEvent>,
    ) -> Result<InitOutcome, SurfaceError> {
        if self.surface.is_some() {
            tracing::debug!(container, "surface already initialized");
            return Ok(InitOutcome::AlreadyLive);
        }

        let token = match &self.access {
            AccessMode::Token(token) => token.clone(),
            AccessMode::Diagnostic => {
                let err = ConfigError::MissingAccessToken;
                tracing::error!(%err, "map disabled");
                self.diagnostic = Some(err.clone());
                return Ok(InitOutcome::Diagnostic(err));
            }
        };

        let options = SurfaceOptions {
            container: container.to_string(),
            style_url: self.style_url.clone(),
            access_token: token,
            center,
            zoom,
        };
        let mut surface = self.factory.create(&options, events)?;

        let controls = [
            ControlSpec::Navigation,
            ControlSpec::Geolocate(GeolocateOptions::default()),
        ];
        for control in controls {
            match surface.add_control(control, ControlPosition::TopRight) {
                Ok(id) => self.controls.push(id),
                Err(err) => tracing::warn!(?control, %err, "control not added"),
            }
        }

        tracing::info!(container, style = %self.style_url, "surface created");
        self.surface = Some(surface);
        self.ready = false;
        self.diagnostic = None;
        Ok(InitOutcome::Created)
    }

    /// Records the load signal. True only the first time per handle.
    pub fn mark_ready(&mut self) -> bool {
        if self.surface.is_none() || self.ready {
            tracing::debug!("duplicate or orphaned load signal ignored");
            return false;
        }
        self.ready = true;
        tracing::info!("surface ready");
        true
    }

    /// Removes the controls, releases the surface and drops the handle.
    ///
    /// Layers and listeners belong to their owners and must be removed first.
    /// Safe with no handle or a handle that never became ready.
    pub fn teardown(&mut self) {
        self.ready = false;
        let Some(mut surface) = self.surface.take() else {
            self.controls.clear();
            return;
        };
        for id in self.controls.drain(..) {
            if let Err(err) = surface.remove_control(id) {
                tracing::debug!(%err, "control already gone");
            }
        }
        surface.release();
        tracing::info!("surface released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use runtime::event_bus::EventQueue;
    use surface::headless::{HeadlessFactory, ResourceCounts};

    fn lifecycle(token: Option<&str>) -> (SurfaceLifecycle<HeadlessFactory>, HeadlessFactory) {
        let factory = HeadlessFactory::new();
        let mut config = ViewerConfig::default();
        config.access_token = token.map(str::to_string);
        (SurfaceLifecycle::new(factory.clone(), &config), factory)
    }

    fn init(lc: &mut SurfaceLifecycle<HeadlessFactory>, queue: &EventQueue<SurfaceEvent>) -> InitOutcome {
        lc.initialize("map", LngLat::new(-157.8583, 21.3069), 7.0, queue.sender())
            .unwrap()
    }

    #[test]
    fn second_initialize_is_a_no_op() {
        let (mut lc, factory) = lifecycle(Some("pk.test"));
        let queue = EventQueue::new();

        assert_eq!(init(&mut lc, &queue), InitOutcome::Created);
        assert_eq!(init(&mut lc, &queue), InitOutcome::AlreadyLive);
        assert_eq!(factory.created(), 1);
        assert_eq!(lc.state(), LifecycleState::Pending);
    }

    #[test]
    fn surface_gets_style_token_and_top_right_controls() {
        let (mut lc, factory) = lifecycle(Some("pk.test"));
        let queue = EventQueue::new();
        init(&mut lc, &queue);

        let probe = factory.last_probe().unwrap();
        let options = probe.options();
        assert_eq!(options.access_token, "pk.test");
        assert_eq!(options.style_url, "mapbox://styles/mapbox/dark-v11");
        assert_eq!(options.zoom, 7.0);
        assert_eq!(
            probe.controls().len(),
            2,
            "navigation and geolocate controls"
        );
        assert!(
            probe
                .controls()
                .iter()
                .all(|(_, pos)| *pos == ControlPosition::TopRight)
        );
    }

    #[test]
    fn readiness_is_reported_once() {
        let (mut lc, _factory) = lifecycle(Some("pk.test"));
        assert!(!lc.mark_ready(), "no handle yet");

        let queue = EventQueue::new();
        init(&mut lc, &queue);
        assert!(lc.ready_surface_mut().is_none());
        assert!(lc.mark_ready());
        assert!(!lc.mark_ready());
        assert_eq!(lc.state(), LifecycleState::Ready);
        assert!(lc.ready_surface_mut().is_some());
    }

    #[test]
    fn missing_token_enters_diagnostic_mode() {
        let (mut lc, factory) = lifecycle(None);
        let queue = EventQueue::new();

        assert_eq!(
            init(&mut lc, &queue),
            InitOutcome::Diagnostic(ConfigError::MissingAccessToken)
        );
        assert_eq!(factory.created(), 0);
        assert_eq!(lc.state(), LifecycleState::Diagnostic);
        lc.teardown();
    }

    #[test]
    fn teardown_before_readiness_releases_and_allows_reinit() {
        let (mut lc, factory) = lifecycle(Some("pk.test"));
        let queue = EventQueue::new();
        lc.teardown();

        init(&mut lc, &queue);
        lc.teardown();
        let probe = factory.probe(0).unwrap();
        assert!(probe.is_released());
        assert_eq!(probe.released_with(), Some(ResourceCounts::default()));
        assert_eq!(lc.state(), LifecycleState::Detached);

        assert_eq!(init(&mut lc, &queue), InitOutcome::Created);
        assert_eq!(factory.created(), 2);
    }

    #[test]
    fn factory_failure_leaves_lifecycle_detached() {
        let (mut lc, factory) = lifecycle(Some("pk.test"));
        factory.fail_next(SurfaceError::Native("webgl unavailable".into()));
        let queue = EventQueue::new();

        let err = lc
            .initialize("map", LngLat::new(0.0, 0.0), 1.0, queue.sender())
            .unwrap_err();
        assert_eq!(err, SurfaceError::Native("webgl unavailable".into()));
        assert_eq!(lc.state(), LifecycleState::Detached);
    }
}
