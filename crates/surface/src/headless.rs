//! In-memory rendering surface.
//!
//! `HeadlessSurface` keeps every source, layer, listener, control and popup in
//! plain collections and evaluates paint curves on demand, so map behaviour can
//! be exercised without a browser. A [`SurfaceProbe`] shares the surface's
//! state and plays the part of the native library: it fires the load event,
//! synthesizes pointer events, and lets callers inspect what would be drawn.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use foundation::geo::LngLat;
use foundation::geojson::{Feature, FeatureCollection};
use runtime::event_bus::EventSender;
use serde_json::{Map, Value};

use crate::camera::{CameraView, FlyTo};
use crate::color::Color;
use crate::control::{ControlId, ControlPosition, ControlSpec};
use crate::curve::EvalContext;
use crate::error::SurfaceError;
use crate::event::{Cursor, ListenerId, PointerEvent, PointerEventKind, SurfaceEvent};
use crate::layer::{LayerId, LayerPaint, LayerSpec, SourceId};
use crate::popup::{PopupId, PopupSpec};
use crate::surface::{RenderSurface, SurfaceFactory, SurfaceOptions};

/// Native resources still registered on a surface.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ResourceCounts {
    pub sources: usize,
    pub layers: usize,
    pub listeners: usize,
    pub controls: usize,
    pub popups: usize,
}

#[derive(Debug, Clone)]
struct Animation {
    from: CameraView,
    target: FlyTo,
    elapsed_ms: u64,
}

#[derive(Debug)]
struct HeadlessState {
    options: SurfaceOptions,
    events: Option<EventSender<SurfaceEvent>>,
    loaded: bool,
    released: bool,
    next_id: u64,
    sources: BTreeMap<SourceId, FeatureCollection>,
    source_writes: u64,
    layers: Vec<LayerSpec>,
    listeners: BTreeMap<ListenerId, (LayerId, PointerEventKind)>,
    controls: BTreeMap<ControlId, (ControlSpec, ControlPosition)>,
    popups: BTreeMap<PopupId, PopupSpec>,
    max_live_popups: usize,
    cursor: Cursor,
    camera: CameraView,
    fly_history: Vec<FlyTo>,
    animation: Option<Animation>,
    released_with: Option<ResourceCounts>,
}

impl HeadlessState {
    fn new(options: &SurfaceOptions, events: EventSender<SurfaceEvent>) -> Self {
        Self {
            camera: CameraView::new(options.center, options.zoom),
            options: options.clone(),
            events: Some(events),
            loaded: false,
            released: false,
            next_id: 1,
            sources: BTreeMap::new(),
            source_writes: 0,
            layers: Vec::new(),
            listeners: BTreeMap::new(),
            controls: BTreeMap::new(),
            popups: BTreeMap::new(),
            max_live_popups: 0,
            cursor: Cursor::Default,
            fly_history: Vec::new(),
            animation: None,
            released_with: None,
        }
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn counts(&self) -> ResourceCounts {
        ResourceCounts {
            sources: self.sources.len(),
            layers: self.layers.len(),
            listeners: self.listeners.len(),
            controls: self.controls.len(),
            popups: self.popups.len(),
        }
    }

    fn live(&self) -> Result<(), SurfaceError> {
        if self.released {
            return Err(SurfaceError::Released);
        }
        Ok(())
    }

    fn ready(&self) -> Result<(), SurfaceError> {
        self.live()?;
        if !self.loaded {
            return Err(SurfaceError::Unready);
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct HeadlessSurface {
    state: Rc<RefCell<HeadlessState>>,
}

impl RenderSurface for HeadlessSurface {
    fn add_source(&mut self, id: &SourceId, data: &FeatureCollection) -> Result<(), SurfaceError> {
        let mut s = self.state.borrow_mut();
        s.ready()?;
        if s.sources.contains_key(id) {
            return Err(SurfaceError::DuplicateSource(id.to_string()));
        }
        s.sources.insert(id.clone(), data.clone());
        s.source_writes += 1;
        Ok(())
    }

    fn set_source_data(
        &mut self,
        id: &SourceId,
        data: &FeatureCollection,
    ) -> Result<(), SurfaceError> {
        let mut s = self.state.borrow_mut();
        s.live()?;
        let slot = s
            .sources
            .get_mut(id)
            .ok_or_else(|| SurfaceError::UnknownSource(id.to_string()))?;
        *slot = data.clone();
        s.source_writes += 1;
        Ok(())
    }

    fn has_source(&self, id: &SourceId) -> bool {
        self.state.borrow().sources.contains_key(id)
    }

    fn remove_source(&mut self, id: &SourceId) -> Result<(), SurfaceError> {
        let mut s = self.state.borrow_mut();
        s.live()?;
        if let Some(user) = s.layers.iter().find(|l| &l.source == id) {
            return Err(SurfaceError::Native(format!(
                "source {id} is still used by layer {}",
                user.id
            )));
        }
        s.sources
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| SurfaceError::UnknownSource(id.to_string()))
    }

    fn add_layer(&mut self, spec: &LayerSpec) -> Result<(), SurfaceError> {
        let mut s = self.state.borrow_mut();
        s.ready()?;
        if !s.sources.contains_key(&spec.source) {
            return Err(SurfaceError::UnknownSource(spec.source.to_string()));
        }
        if s.layers.iter().any(|l| l.id == spec.id) {
            return Err(SurfaceError::DuplicateLayer(spec.id.to_string()));
        }
        s.layers.push(spec.clone());
        Ok(())
    }

    fn has_layer(&self, id: &LayerId) -> bool {
        self.state.borrow().layers.iter().any(|l| &l.id == id)
    }

    fn remove_layer(&mut self, id: &LayerId) -> Result<(), SurfaceError> {
        let mut s = self.state.borrow_mut();
        s.live()?;
        let before = s.layers.len();
        s.layers.retain(|l| &l.id != id);
        if s.layers.len() == before {
            return Err(SurfaceError::UnknownLayer(id.to_string()));
        }
        Ok(())
    }

    fn add_control(
        &mut self,
        control: ControlSpec,
        position: ControlPosition,
    ) -> Result<ControlId, SurfaceError> {
        let mut s = self.state.borrow_mut();
        s.live()?;
        let id = ControlId(s.alloc_id());
        s.controls.insert(id, (control, position));
        Ok(id)
    }

    fn remove_control(&mut self, id: ControlId) -> Result<(), SurfaceError> {
        let mut s = self.state.borrow_mut();
        s.live()?;
        s.controls
            .remove(&id)
            .map(|_| ())
            .ok_or(SurfaceError::UnknownControl(id.0))
    }

    fn bind(&mut self, layer: &LayerId, kind: PointerEventKind) -> Result<ListenerId, SurfaceError> {
        let mut s = self.state.borrow_mut();
        s.ready()?;
        if !s.layers.iter().any(|l| &l.id == layer) {
            return Err(SurfaceError::UnknownLayer(layer.to_string()));
        }
        let id = ListenerId(s.alloc_id());
        s.listeners.insert(id, (layer.clone(), kind));
        Ok(id)
    }

    fn unbind(&mut self, id: ListenerId) -> Result<(), SurfaceError> {
        let mut s = self.state.borrow_mut();
        s.live()?;
        s.listeners
            .remove(&id)
            .map(|_| ())
            .ok_or(SurfaceError::UnknownListener(id.0))
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        let mut s = self.state.borrow_mut();
        if !s.released {
            s.cursor = cursor;
        }
    }

    fn camera(&self) -> CameraView {
        self.state.borrow().camera
    }

    fn fly_to(&mut self, fly: FlyTo) -> Result<(), SurfaceError> {
        let mut s = self.state.borrow_mut();
        s.live()?;
        s.fly_history.push(fly);
        if fly.duration_ms == 0 {
            s.camera = CameraView::new(fly.center, fly.zoom);
            s.animation = None;
        } else {
            let from = s.camera;
            s.animation = Some(Animation {
                from,
                target: fly,
                elapsed_ms: 0,
            });
        }
        Ok(())
    }

    fn add_popup(&mut self, spec: &PopupSpec) -> Result<PopupId, SurfaceError> {
        let mut s = self.state.borrow_mut();
        s.live()?;
        let id = PopupId(s.alloc_id());
        s.popups.insert(id, spec.clone());
        s.max_live_popups = s.max_live_popups.max(s.popups.len());
        Ok(id)
    }

    fn remove_popup(&mut self, id: PopupId) -> Result<(), SurfaceError> {
        let mut s = self.state.borrow_mut();
        s.live()?;
        s.popups
            .remove(&id)
            .map(|_| ())
            .ok_or(SurfaceError::UnknownPopup(id.0))
    }

    fn release(&mut self) {
        let mut s = self.state.borrow_mut();
        if s.released {
            return;
        }
        s.released_with = Some(s.counts());
        s.released = true;
        s.events = None;
        s.animation = None;
        s.listeners.clear();
        s.popups.clear();
        s.layers.clear();
        s.sources.clear();
        s.controls.clear();
    }

    fn is_released(&self) -> bool {
        self.state.borrow().released
    }
}

/// What a layer would draw for one feature at a given zoom.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFeature {
    pub anchor: LngLat,
    pub properties: Map<String, Value>,
    pub radius: Option<f64>,
    pub color: Option<Color>,
    pub opacity: Option<f64>,
    /// Heatmap contribution.
    pub weight: Option<f64>,
    /// Label text.
    pub text: Option<String>,
}

/// Shared view of a headless surface's state, used to drive and inspect it.
#[derive(Debug, Clone)]
pub struct SurfaceProbe {
    state: Rc<RefCell<HeadlessState>>,
}

impl SurfaceProbe {
    pub fn options(&self) -> SurfaceOptions {
        self.state.borrow().options.clone()
    }

    /// Emits the load event. Every call emits; deduplication is the owner's
    /// job. Returns false once the surface is released.
    pub fn fire_load(&self) -> bool {
        let mut s = self.state.borrow_mut();
        let Some(events) = s.events.clone() else {
            return false;
        };
        s.loaded = true;
        drop(s);
        events.send(SurfaceEvent::Loaded)
    }

    pub fn emit_error(&self, message: &str) -> bool {
        let events = self.state.borrow().events.clone();
        events.is_some_and(|tx| tx.send(SurfaceEvent::Error(message.to_string())))
    }

    /// Delivers a pointer event to every listener bound to `layer` for `kind`.
    /// Returns how many listeners received it.
    pub fn pointer(&self, layer: &LayerId, kind: PointerEventKind, features: Vec<Feature>) -> usize {
        let s = self.state.borrow();
        let Some(events) = s.events.clone() else {
            return 0;
        };
        let lng_lat = features.first().map(|f| f.geometry.anchor());
        let targets: Vec<ListenerId> = s
            .listeners
            .iter()
            .filter(|(_, (l, k))| l == layer && *k == kind)
            .map(|(id, _)| *id)
            .collect();
        drop(s);

        let mut delivered = 0;
        for listener in targets {
            let event = PointerEvent {
                listener,
                kind,
                layer: layer.clone(),
                features: features.clone(),
                lng_lat,
            };
            if events.send(SurfaceEvent::Pointer(event)) {
                delivered += 1;
            }
        }
        delivered
    }

    pub fn hover(&self, layer: &LayerId, feature: Feature) -> usize {
        self.pointer(layer, PointerEventKind::MouseEnter, vec![feature])
    }

    pub fn leave(&self, layer: &LayerId) -> usize {
        self.pointer(layer, PointerEventKind::MouseLeave, Vec::new())
    }

    pub fn click(&self, layer: &LayerId, feature: Feature) -> usize {
        self.pointer(layer, PointerEventKind::Click, vec![feature])
    }

    pub fn is_loaded(&self) -> bool {
        self.state.borrow().loaded
    }

    pub fn is_released(&self) -> bool {
        self.state.borrow().released
    }

    pub fn counts(&self) -> ResourceCounts {
        self.state.borrow().counts()
    }

    /// Resources that were still registered when the surface was released.
    pub fn released_with(&self) -> Option<ResourceCounts> {
        self.state.borrow().released_with
    }

    pub fn source_data(&self, id: &SourceId) -> Option<FeatureCollection> {
        self.state.borrow().sources.get(id).cloned()
    }

    /// Number of whole-source writes (initial add included).
    pub fn source_writes(&self) -> u64 {
        self.state.borrow().source_writes
    }

    /// Layer ids in draw order.
    pub fn layer_ids(&self) -> Vec<LayerId> {
        self.state.borrow().layers.iter().map(|l| l.id.clone()).collect()
    }

    pub fn layer(&self, id: &LayerId) -> Option<LayerSpec> {
        self.state.borrow().layers.iter().find(|l| &l.id == id).cloned()
    }

    pub fn controls(&self) -> Vec<(ControlSpec, ControlPosition)> {
        self.state.borrow().controls.values().copied().collect()
    }

    pub fn popups(&self) -> Vec<PopupSpec> {
        self.state.borrow().popups.values().cloned().collect()
    }

    pub fn max_live_popups(&self) -> usize {
        self.state.borrow().max_live_popups
    }

    pub fn cursor(&self) -> Cursor {
        self.state.borrow().cursor
    }

    pub fn camera(&self) -> CameraView {
        self.state.borrow().camera
    }

    pub fn fly_history(&self) -> Vec<FlyTo> {
        self.state.borrow().fly_history.clone()
    }

    /// Target of the camera animation in flight, if any.
    pub fn animation_target(&self) -> Option<FlyTo> {
        self.state.borrow().animation.as_ref().map(|a| a.target)
    }

    /// Advances the camera animation by `ms`.
    pub fn step_animation(&self, ms: u64) {
        let mut s = self.state.borrow_mut();
        let Some(mut anim) = s.animation.take() else {
            return;
        };
        anim.elapsed_ms = anim.elapsed_ms.saturating_add(ms);
        if anim.elapsed_ms >= anim.target.duration_ms {
            s.camera = CameraView::new(anim.target.center, anim.target.zoom);
            return;
        }
        let t = anim.elapsed_ms as f64 / anim.target.duration_ms as f64;
        s.camera = CameraView::new(
            anim.from.center.lerp(anim.target.center, t),
            anim.from.zoom + (anim.target.zoom - anim.from.zoom) * t,
        );
        s.animation = Some(anim);
    }

    /// Evaluates `layer`'s paint for every feature of its source at `zoom`.
    /// Empty when the layer is unknown or outside its zoom band.
    pub fn rendered(&self, layer: &LayerId, zoom: f64) -> Vec<RenderedFeature> {
        let s = self.state.borrow();
        let Some(spec) = s.layers.iter().find(|l| &l.id == layer) else {
            return Vec::new();
        };
        if !spec.band.contains(zoom) {
            return Vec::new();
        }
        let Some(source) = s.sources.get(&spec.source) else {
            return Vec::new();
        };

        source
            .features
            .iter()
            .map(|feature| render_feature(&spec.paint, feature, zoom))
            .collect()
    }
}

fn render_feature(paint: &LayerPaint, feature: &Feature, zoom: f64) -> RenderedFeature {
    let ctx = EvalContext::at_zoom(zoom).with_properties(&feature.properties);
    let mut out = RenderedFeature {
        anchor: feature.geometry.anchor(),
        properties: feature.properties.clone(),
        radius: None,
        color: None,
        opacity: None,
        weight: None,
        text: None,
    };
    match paint {
        LayerPaint::Heatmap(p) => {
            out.weight = p.weight.evaluate(&ctx);
            out.radius = p.radius.evaluate(&ctx);
            out.opacity = p.opacity.evaluate(&ctx);
            // Color depends on accumulated density; report the single-feature value.
            out.color = out
                .weight
                .and_then(|w| p.color.evaluate(&ctx.with_density(w)));
        }
        LayerPaint::Circle(p) => {
            out.radius = p.radius.evaluate(&ctx);
            out.color = p.color.evaluate(&ctx);
            out.opacity = p.opacity.evaluate(&ctx);
        }
        LayerPaint::Symbol(p) => {
            out.color = Some(p.color);
            out.opacity = Some(1.0);
            out.text = feature.str_property(&p.text_field).map(str::to_string);
        }
    }
    out
}

/// Creates headless surfaces and keeps a probe for each one.
#[derive(Debug, Clone, Default)]
pub struct HeadlessFactory {
    created: Rc<RefCell<Vec<SurfaceProbe>>>,
    fail_next: Rc<RefCell<Option<SurfaceError>>>,
}

impl HeadlessFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `create` call fail with `err`.
    pub fn fail_next(&self, err: SurfaceError) {
        *self.fail_next.borrow_mut() = Some(err);
    }

    pub fn created(&self) -> usize {
        self.created.borrow().len()
    }

    pub fn probe(&self, index: usize) -> Option<SurfaceProbe> {
        self.created.borrow().get(index).cloned()
    }

    pub fn last_probe(&self) -> Option<SurfaceProbe> {
        self.created.borrow().last().cloned()
    }
}

impl SurfaceFactory for HeadlessFactory {
    type Surface = HeadlessSurface;

    fn create(
        &mut self,
        options: &SurfaceOptions,
        events: EventSender<SurfaceEvent>,
    ) -> Result<HeadlessSurface, SurfaceError> {
        if let Some(err) = self.fail_next.borrow_mut().take() {
            return Err(err);
        }
        let state = Rc::new(RefCell::new(HeadlessState::new(options, events)));
        self.created.borrow_mut().push(SurfaceProbe {
            state: Rc::clone(&state),
        });
        tracing::debug!(container = %options.container, "headless surface created");
        Ok(HeadlessSurface { state })
    }
}
