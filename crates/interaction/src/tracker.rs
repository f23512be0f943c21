//! Hover and click handling for the point layer.
//!
//! ```text
//! Idle --enter--> Hovering --leave--> Idle
//!        Hovering --enter--> Hovering   (previous preview disposed first)
//! ```
//!
//! Clicks never change the hover state; they only produce a selection
//! candidate.

use foundation::ids::LocationId;
use foundation::location::Location;
use layers::features::location_from_feature;
use layers::preview::hover_popup_spec;
use surface::error::SurfaceError;
use surface::event::{Cursor, ListenerId, PointerEvent, PointerEventKind};
use surface::layer::LayerId;
use surface::popup::PopupId;
use surface::surface::RenderSurface;

const BOUND_KINDS: [PointerEventKind; 3] = [
    PointerEventKind::MouseEnter,
    PointerEventKind::MouseLeave,
    PointerEventKind::Click,
];

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum HoverState {
    #[default]
    Idle,
    Hovering {
        location: LocationId,
        preview: PopupId,
    },
}

#[derive(Debug)]
pub struct InteractionTracker {
    layer: LayerId,
    listeners: Vec<ListenerId>,
    state: HoverState,
}

impl InteractionTracker {
    pub fn new(layer: LayerId) -> Self {
        Self {
            layer,
            listeners: Vec::new(),
            state: HoverState::Idle,
        }
    }

    pub fn layer(&self) -> &LayerId {
        &self.layer
    }

    pub fn is_bound(&self) -> bool {
        !self.listeners.is_empty()
    }

    pub fn hover_state(&self) -> HoverState {
        self.state
    }

    pub fn hovered(&self) -> Option<LocationId> {
        match self.state {
            HoverState::Idle => None,
            HoverState::Hovering { location, .. } => Some(location),
        }
    }

    /// Binds enter, leave and click listeners on the tracked layer. Binding
    /// twice is a no-op; a partial failure unbinds what was bound.
    pub fn bind<S>(&mut self, surface: &mut S) -> Result<(), SurfaceError>
    where
        S: RenderSurface + ?Sized,
    {
        if self.is_bound() {
            return Ok(());
        }
        for kind in BOUND_KINDS {
            match surface.bind(&self.layer, kind) {
                Ok(id) => self.listeners.push(id),
                Err(err) => {
                    for id in self.listeners.drain(..) {
                        let _ = surface.unbind(id);
                    }
                    return Err(err);
                }
            }
        }
        tracing::debug!(layer = %self.layer, "pointer listeners bound");
        Ok(())
    }

    /// Applies one pointer event. Returns the clicked location, if any.
    ///
    /// Events from listeners this tracker does not own are ignored, as are
    /// features whose attributes cannot be read.
    pub fn handle<S>(&mut self, surface: &mut S, event: &PointerEvent) -> Option<Location>
    where
        S: RenderSurface + ?Sized,
    {
        if !self.listeners.contains(&event.listener) {
            tracing::debug!(listener = event.listener.0, "event from unknown listener");
            return None;
        }
        match event.kind {
            PointerEventKind::MouseEnter => {
                self.enter(surface, event);
                None
            }
            PointerEventKind::MouseLeave => {
                self.dispose_preview(surface);
                None
            }
            PointerEventKind::Click => {
                let feature = event.features.first()?;
                match location_from_feature(feature) {
                    Ok(location) => Some(location),
                    Err(err) => {
                        tracing::debug!(%err, "ignoring click on malformed feature");
                        None
                    }
                }
            }
        }
    }

    fn enter<S>(&mut self, surface: &mut S, event: &PointerEvent)
    where
        S: RenderSurface + ?Sized,
    {
        let Some(feature) = event.features.first() else {
            return;
        };
        let location = match location_from_feature(feature) {
            Ok(location) => location,
            Err(err) => {
                tracing::debug!(%err, "ignoring hover on malformed feature");
                return;
            }
        };

        self.dispose_preview(surface);
        let spec = hover_popup_spec(feature.geometry.anchor(), &location);
        match surface.add_popup(&spec) {
            Ok(preview) => {
                surface.set_cursor(Cursor::Pointer);
                self.state = HoverState::Hovering {
                    location: location.id,
                    preview,
                };
            }
            Err(err) => tracing::warn!(%err, "hover preview not shown"),
        }
    }

    /// Removes the live preview, if any, and restores the cursor.
    pub fn dispose_preview<S>(&mut self, surface: &mut S)
    where
        S: RenderSurface + ?Sized,
    {
        let HoverState::Hovering { preview, .. } = std::mem::take(&mut self.state) else {
            return;
        };
        if let Err(err) = surface.remove_popup(preview) {
            tracing::debug!(%err, "hover preview already gone");
        }
        surface.set_cursor(Cursor::Default);
    }

    /// Disposes the preview and unbinds every listener.
    pub fn teardown<S>(&mut self, surface: &mut S)
    where
        S: RenderSurface + ?Sized,
    {
        self.dispose_preview(surface);
        for id in self.listeners.drain(..) {
            if let Err(err) = surface.unbind(id) {
                tracing::debug!(%err, "listener already unbound");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HoverState, InteractionTracker};
    use foundation::geo::LngLat;
    use foundation::geojson::{Feature, Geometry};
    use foundation::ids::LocationId;
    use layers::manager::LayerManager;
    use pretty_assertions::assert_eq;
    use runtime::event_bus::EventQueue;
    use serde_json::{Map, json};
    use surface::event::{Cursor, SurfaceEvent};
    use surface::headless::{HeadlessFactory, HeadlessSurface, SurfaceProbe};
    use surface::surface::{SurfaceFactory, SurfaceOptions};

    struct Rig {
        surface: HeadlessSurface,
        probe: SurfaceProbe,
        queue: EventQueue<SurfaceEvent>,
        tracker: InteractionTracker,
    }

    impl Rig {
        fn new() -> Self {
            let mut factory = HeadlessFactory::new();
            let queue = EventQueue::new();
            let options = SurfaceOptions {
                container: "map".into(),
                style_url: "style".into(),
                access_token: "tok".into(),
                center: LngLat::new(-157.8583, 21.3069),
                zoom: 12.0,
            };
            let mut surface = factory.create(&options, queue.sender()).unwrap();
            let probe = factory.last_probe().unwrap();
            probe.fire_load();
            queue.drain();

            let mut layers = LayerManager::new();
            layers.register_layers(&mut surface).unwrap();
            let mut tracker = InteractionTracker::new(layers.point_layer());
            tracker.bind(&mut surface).unwrap();
            Self {
                surface,
                probe,
                queue,
                tracker,
            }
        }

        /// Routes every queued pointer event through the tracker.
        fn pump(&mut self) -> Vec<foundation::location::Location> {
            let mut picked = Vec::new();
            for event in self.queue.drain() {
                if let SurfaceEvent::Pointer(ev) = event {
                    picked.extend(self.tracker.handle(&mut self.surface, &ev));
                }
            }
            picked
        }
    }

    fn feature(id: u64, lng: f64, lat: f64) -> Feature {
        let mut props = Map::new();
        props.insert("id".into(), json!(id));
        props.insert("name".into(), json!(format!("Spot {id}")));
        props.insert("mention_count".into(), json!(4));
        props.insert("avg_sentiment".into(), json!(0.5));
        props.insert("place_type".into(), json!("park"));
        props.insert("city".into(), json!("Honolulu"));
        Feature::new(Geometry::point(LngLat::new(lng, lat)), props)
    }

    #[test]
    fn hover_enter_leave_cycle() {
        let mut rig = Rig::new();
        let layer = rig.tracker.layer().clone();

        rig.probe.hover(&layer, feature(1, -157.8, 21.3));
        rig.pump();
        assert!(matches!(rig.tracker.hover_state(), HoverState::Hovering { .. }));
        assert_eq!(rig.probe.cursor(), Cursor::Pointer);
        let popups = rig.probe.popups();
        assert_eq!(popups.len(), 1);
        assert_eq!(popups[0].anchor, LngLat::new(-157.8, 21.3));

        rig.probe.leave(&layer);
        rig.pump();
        assert_eq!(rig.tracker.hover_state(), HoverState::Idle);
        assert_eq!(rig.probe.cursor(), Cursor::Default);
        assert!(rig.probe.popups().is_empty());
    }

    #[test]
    fn at_most_one_preview_for_any_event_order() {
        let mut rig = Rig::new();
        let layer = rig.tracker.layer().clone();

        rig.probe.leave(&layer);
        rig.probe.hover(&layer, feature(1, -157.8, 21.3));
        rig.probe.hover(&layer, feature(2, -157.7, 21.4));
        rig.probe.hover(&layer, feature(3, -157.6, 21.5));
        rig.probe.leave(&layer);
        rig.probe.leave(&layer);
        rig.probe.hover(&layer, feature(4, -157.5, 21.6));
        rig.pump();

        assert_eq!(rig.probe.max_live_popups(), 1);
        assert_eq!(rig.probe.popups().len(), 1);
        assert_eq!(rig.tracker.hovered(), Some(LocationId::new(4)));
    }

    #[test]
    fn click_yields_full_candidate_without_touching_hover() {
        let mut rig = Rig::new();
        let layer = rig.tracker.layer().clone();

        rig.probe.click(&layer, feature(9, -157.85, 21.30));
        let picked = rig.pump();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].id, LocationId::new(9));
        assert_eq!(picked[0].city.as_deref(), Some("Honolulu"));
        assert_eq!(picked[0].coordinate, Some(LngLat::new(-157.85, 21.30)));
        assert_eq!(rig.tracker.hover_state(), HoverState::Idle);
    }

    #[test]
    fn malformed_features_are_ignored() {
        let mut rig = Rig::new();
        let layer = rig.tracker.layer().clone();
        let junk = Feature::new(Geometry::point(LngLat::new(0.0, 0.0)), Map::new());

        rig.probe.hover(&layer, junk.clone());
        rig.probe.click(&layer, junk);
        assert!(rig.pump().is_empty());
        assert_eq!(rig.tracker.hover_state(), HoverState::Idle);
        assert!(rig.probe.popups().is_empty());
    }

    #[test]
    fn teardown_disposes_preview_and_listeners() {
        let mut rig = Rig::new();
        let layer = rig.tracker.layer().clone();
        rig.probe.hover(&layer, feature(1, -157.8, 21.3));
        rig.pump();

        rig.tracker.teardown(&mut rig.surface);
        assert_eq!(rig.probe.counts().listeners, 0);
        assert_eq!(rig.probe.counts().popups, 0);
        assert_eq!(rig.probe.hover(&layer, feature(2, 0.0, 0.0)), 0);
        assert!(rig.pump().is_empty());
    }
}
