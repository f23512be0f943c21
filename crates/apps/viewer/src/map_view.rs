//! The map component: one surface, its location layers and pointer handling.

use foundation::geo::LngLat;
use foundation::location::Location;
use interaction::camera::CameraController;
use interaction::tracker::InteractionTracker;
use layers::manager::{DataUpdate, LayerManager};
use runtime::event_bus::EventQueue;
use surface::camera::FlyTo;
use surface::error::SurfaceError;
use surface::event::SurfaceEvent;
use surface::surface::SurfaceFactory;

use crate::config::{ConfigError, ViewerConfig};
use crate::lifecycle::{InitOutcome, LifecycleState, SurfaceLifecycle};

/// What the page needs to hear about after draining surface events.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    Ready,
    /// A point was clicked.
    SelectionCandidate(Location),
    SurfaceError(String),
}

pub struct MapView<F: SurfaceFactory> {
    container: String,
    center: LngLat,
    zoom: f64,
    lifecycle: SurfaceLifecycle<F>,
    events: EventQueue<SurfaceEvent>,
    layers: LayerManager,
    tracker: InteractionTracker,
    camera: CameraController,
    loading: bool,
}

impl<F: SurfaceFactory> MapView<F> {
    pub fn new(factory: F, config: &ViewerConfig, container: impl Into<String>) -> Self {
        let layers = LayerManager::new();
        let tracker = InteractionTracker::new(layers.point_layer());
        Self {
            container: container.into(),
            center: config.initial_center,
            zoom: config.initial_zoom,
            lifecycle: SurfaceLifecycle::new(factory, config),
            events: EventQueue::new(),
            layers,
            tracker,
            camera: CameraController::new(config.focus_zoom, config.focus_duration_ms),
            loading: false,
        }
    }

    pub fn lifecycle(&self) -> &SurfaceLifecycle<F> {
        &self.lifecycle
    }

    pub fn layers(&self) -> &LayerManager {
        &self.layers
    }

    pub fn tracker(&self) -> &InteractionTracker {
        &self.tracker
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn diagnostic(&self) -> Option<&ConfigError> {
        self.lifecycle.diagnostic()
    }

    /// Drives the "Loading locations..." overlay.
    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    pub fn mount(&mut self) -> Result<InitOutcome, SurfaceError> {
        if self.events.is_closed() {
            self.events = EventQueue::new();
        }
        self.lifecycle
            .initialize(&self.container, self.center, self.zoom, self.events.sender())
    }

    /// Drains surface events and applies them in arrival order.
    pub fn process_events(&mut self) -> Vec<MapEvent> {
        let mut out = Vec::new();
        for event in self.events.drain() {
            match event {
                SurfaceEvent::Loaded => {
                    if self.lifecycle.mark_ready() {
                        out.extend(self.on_ready());
                    }
                }
                SurfaceEvent::Pointer(pointer) => {
                    let Some(surface) = self.lifecycle.ready_surface_mut() else {
                        continue;
                    };
                    if let Some(location) = self.tracker.handle(surface, &pointer) {
                        out.push(MapEvent::SelectionCandidate(location));
                    }
                }
                SurfaceEvent::Error(message) => {
                    tracing::warn!(%message, "surface reported an error");
                    out.push(MapEvent::SurfaceError(message));
                }
            }
        }
        out
    }

    fn on_ready(&mut self) -> Vec<MapEvent> {
        let Some(surface) = self.lifecycle.ready_surface_mut() else {
            return Vec::new();
        };
        if let Err(err) = self.layers.register_layers(surface) {
            tracing::error!(%err, "location layers not registered");
            return vec![MapEvent::SurfaceError(err.to_string())];
        }
        if let Err(err) = self.tracker.bind(surface) {
            tracing::error!(%err, "pointer listeners not bound");
            return vec![MapEvent::Ready, MapEvent::SurfaceError(err.to_string())];
        }
        vec![MapEvent::Ready]
    }

    /// Shows `locations`, or holds them until the layers exist.
    pub fn update_data(&mut self, locations: &[Location]) -> DataUpdate {
        self.layers
            .update_data(self.lifecycle.ready_surface_mut(), locations)
    }

    /// Animates to `coordinate` at the detail zoom.
    pub fn focus(&mut self, coordinate: Option<LngLat>) -> Option<FlyTo> {
        let surface = self.lifecycle.surface_mut()?;
        match self.camera.focus(surface, coordinate) {
            Ok(fly) => fly,
            Err(err) => {
                tracing::warn!(%err, "camera focus failed");
                None
            }
        }
    }

    /// Disposes the hover preview, unbinds listeners, removes layers and the
    /// source, releases the surface and closes the event queue.
    pub fn unmount(&mut self) {
        if let Some(surface) = self.lifecycle.surface_mut() {
            self.tracker.teardown(surface);
            self.layers.teardown(surface);
        } else {
            self.layers = LayerManager::new();
        }
        self.lifecycle.teardown();
        self.events.close();
        self.loading = false;
        tracing::debug!(container = %self.container, "map unmounted");
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::ids::LocationId;
    use layers::features::location_to_feature;
    use layers::layer::{DENSITY_LAYER_ID, LABEL_LAYER_ID, POINT_LAYER_ID};
    use pretty_assertions::assert_eq;
    use surface::event::Cursor;
    use surface::headless::{HeadlessFactory, ResourceCounts, SurfaceProbe};
    use surface::layer::LayerId;

    fn location(id: u64, lng: f64, lat: f64) -> Location {
        Location {
            id: LocationId(id),
            name: format!("Place {id}"),
            place_type: "beach".into(),
            city: Some("Honolulu".into()),
            mention_count: 25,
            avg_sentiment: 0.1,
            coordinate: Some(LngLat::new(lng, lat)),
        }
    }

    fn mounted() -> (MapView<HeadlessFactory>, SurfaceProbe) {
        let factory = HeadlessFactory::new();
        let config = ViewerConfig::default().with_access_token("pk.test");
        let mut view = MapView::new(factory.clone(), &config, "map");
        assert_eq!(view.mount(), Ok(InitOutcome::Created));
        let probe = factory.last_probe().unwrap();
        (view, probe)
    }

    #[test]
    fn layers_register_on_load_only() {
        let (mut view, probe) = mounted();
        assert!(view.process_events().is_empty());
        assert_eq!(probe.layer_ids(), Vec::<LayerId>::new());

        probe.fire_load();
        assert_eq!(view.process_events(), vec![MapEvent::Ready]);
        assert_eq!(
            probe.layer_ids(),
            vec![
                LayerId::new(DENSITY_LAYER_ID),
                LayerId::new(POINT_LAYER_ID),
                LayerId::new(LABEL_LAYER_ID)
            ]
        );
        assert_eq!(probe.counts().listeners, 3);
    }

    #[test]
    fn repeated_load_signal_registers_once() {
        let (mut view, probe) = mounted();
        probe.fire_load();
        probe.fire_load();
        assert_eq!(view.process_events(), vec![MapEvent::Ready]);
        assert_eq!(probe.counts().layers, 3);
        assert_eq!(probe.counts().listeners, 3);
    }

    #[test]
    fn data_before_load_is_shown_after_load() {
        let (mut view, probe) = mounted();
        let update = view.update_data(&[location(1, -157.8, 21.3), location(2, -157.7, 21.4)]);
        assert_eq!(update, DataUpdate::Buffered { features: 2 });

        probe.fire_load();
        view.process_events();
        let shown = probe.source_data(view.layers().source_id()).unwrap();
        assert_eq!(shown.len(), 2);
    }

    #[test]
    fn click_on_point_becomes_selection_candidate() {
        let (mut view, probe) = mounted();
        probe.fire_load();
        view.process_events();

        let clicked = location(9, -157.85, 21.30);
        let feature = location_to_feature(&clicked).unwrap();
        probe.click(&LayerId::new(POINT_LAYER_ID), feature);
        assert_eq!(
            view.process_events(),
            vec![MapEvent::SelectionCandidate(clicked)]
        );
    }

    #[test]
    fn surface_errors_are_forwarded() {
        let (mut view, probe) = mounted();
        probe.emit_error("style failed to load");
        assert_eq!(
            view.process_events(),
            vec![MapEvent::SurfaceError("style failed to load".into())]
        );
    }

    #[test]
    fn unmount_releases_everything_and_silences_callbacks() {
        let (mut view, probe) = mounted();
        probe.fire_load();
        view.process_events();
        let point = LayerId::new(POINT_LAYER_ID);
        let feature = location_to_feature(&location(3, -157.8, 21.3)).unwrap();
        probe.hover(&point, feature.clone());
        view.process_events();
        assert_eq!(probe.cursor(), Cursor::Pointer);
        assert_eq!(probe.counts().popups, 1);

        view.unmount();
        assert!(probe.is_released());
        assert_eq!(probe.released_with(), Some(ResourceCounts::default()));
        assert_eq!(probe.click(&point, feature), 0);
        assert!(view.process_events().is_empty());
    }

    #[test]
    fn remount_after_unmount_creates_a_fresh_surface() {
        let factory = HeadlessFactory::new();
        let config = ViewerConfig::default().with_access_token("pk.test");
        let mut view = MapView::new(factory.clone(), &config, "map");
        view.mount().unwrap();
        view.unmount();

        assert_eq!(view.mount(), Ok(InitOutcome::Created));
        let probe = factory.last_probe().unwrap();
        probe.fire_load();
        assert_eq!(view.process_events(), vec![MapEvent::Ready]);
        assert_eq!(factory.created(), 2);
    }

    #[test]
    fn no_token_mounts_diagnostic_without_a_surface() {
        let factory = HeadlessFactory::new();
        let mut view = MapView::new(factory.clone(), &ViewerConfig::default(), "map");
        assert_eq!(
            view.mount(),
            Ok(InitOutcome::Diagnostic(ConfigError::MissingAccessToken))
        );
        assert_eq!(view.diagnostic(), Some(&ConfigError::MissingAccessToken));
        assert_eq!(view.focus(Some(LngLat::new(0.0, 0.0))), None);
        assert_eq!(
            view.update_data(&[location(1, 0.0, 0.0)]),
            DataUpdate::Buffered { features: 1 }
        );
        view.unmount();
        assert_eq!(factory.created(), 0);
    }
}
