//! Mapbox GL JS behind [`RenderSurface`].
//!
//! Thin `extern "C"` bindings to the `mapboxgl` global plus a surface that
//! forwards every native callback into the component event queue.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use foundation::geo::LngLat;
use foundation::geojson::{Feature, FeatureCollection};
use runtime::event_bus::EventSender;
use serde_json::{Value, json};
use surface::camera::{CameraView, FlyTo};
use surface::control::{ControlId, ControlPosition, ControlSpec};
use surface::error::SurfaceError;
use surface::event::{Cursor, ListenerId, PointerEvent, PointerEventKind, SurfaceEvent};
use surface::layer::{LayerId, LayerSpec, SourceId};
use surface::popup::{PopupId, PopupSpec};
use surface::surface::{RenderSurface, SurfaceFactory, SurfaceOptions};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::popup_html::popup_html;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = mapboxgl, js_name = Map)]
    pub type MapboxMap;

    #[wasm_bindgen(constructor, js_namespace = mapboxgl, js_class = "Map", catch)]
    fn new(options: &JsValue) -> Result<MapboxMap, JsValue>;

    #[wasm_bindgen(method, catch, js_name = addSource)]
    fn add_source(this: &MapboxMap, id: &str, source: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = getSource)]
    fn get_source(this: &MapboxMap, id: &str) -> JsValue;

    #[wasm_bindgen(method, catch, js_name = removeSource)]
    fn remove_source(this: &MapboxMap, id: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = addLayer)]
    fn add_layer(this: &MapboxMap, layer: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = getLayer)]
    fn get_layer(this: &MapboxMap, id: &str) -> JsValue;

    #[wasm_bindgen(method, catch, js_name = removeLayer)]
    fn remove_layer(this: &MapboxMap, id: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = addControl)]
    fn add_control(this: &MapboxMap, control: &JsValue, position: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = removeControl)]
    fn remove_control(this: &MapboxMap, control: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = on)]
    fn on_map(this: &MapboxMap, event: &str, listener: &js_sys::Function);

    #[wasm_bindgen(method, js_name = off)]
    fn off_map(this: &MapboxMap, event: &str, listener: &js_sys::Function);

    #[wasm_bindgen(method, js_name = on)]
    fn on_layer(this: &MapboxMap, event: &str, layer: &str, listener: &js_sys::Function);

    #[wasm_bindgen(method, js_name = off)]
    fn off_layer(this: &MapboxMap, event: &str, layer: &str, listener: &js_sys::Function);

    #[wasm_bindgen(method, js_name = getCanvas)]
    fn get_canvas(this: &MapboxMap) -> web_sys::HtmlElement;

    #[wasm_bindgen(method, js_name = getCenter)]
    fn get_center(this: &MapboxMap) -> JsLngLat;

    #[wasm_bindgen(method, js_name = getZoom)]
    fn get_zoom(this: &MapboxMap) -> f64;

    #[wasm_bindgen(method, catch, js_name = flyTo)]
    fn fly_to(this: &MapboxMap, options: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method)]
    fn remove(this: &MapboxMap);

    type JsLngLat;

    #[wasm_bindgen(method, getter)]
    fn lng(this: &JsLngLat) -> f64;

    #[wasm_bindgen(method, getter)]
    fn lat(this: &JsLngLat) -> f64;

    type GeoJsonSource;

    #[wasm_bindgen(method, catch, js_name = setData)]
    fn set_data(this: &GeoJsonSource, data: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(js_namespace = mapboxgl, js_name = Popup)]
    type Popup;

    #[wasm_bindgen(constructor, js_namespace = mapboxgl, js_class = "Popup")]
    fn new(options: &JsValue) -> Popup;

    #[wasm_bindgen(method, js_name = setLngLat)]
    fn set_lng_lat(this: &Popup, lng_lat: &JsValue) -> Popup;

    #[wasm_bindgen(method, js_name = setHTML)]
    fn set_html(this: &Popup, html: &str) -> Popup;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to(this: &Popup, map: &MapboxMap) -> Popup;

    #[wasm_bindgen(method, js_name = remove)]
    fn remove_popup(this: &Popup);

    #[wasm_bindgen(js_namespace = mapboxgl, js_name = NavigationControl)]
    type NavigationControl;

    #[wasm_bindgen(constructor, js_namespace = mapboxgl, js_class = "NavigationControl")]
    fn new() -> NavigationControl;

    #[wasm_bindgen(js_namespace = mapboxgl, js_name = GeolocateControl)]
    type GeolocateControl;

    #[wasm_bindgen(constructor, js_namespace = mapboxgl, js_class = "GeolocateControl")]
    fn new(options: &JsValue) -> GeolocateControl;
}

fn native(err: JsValue) -> SurfaceError {
    SurfaceError::Native(
        err.as_string()
            .or_else(|| {
                js_sys::Reflect::get(&err, &"message".into())
                    .ok()
                    .and_then(|m| m.as_string())
            })
            .unwrap_or_else(|| format!("{err:?}")),
    )
}

fn to_js(value: &Value) -> Result<JsValue, SurfaceError> {
    js_sys::JSON::parse(&value.to_string()).map_err(native)
}

fn collection_to_js(data: &FeatureCollection) -> Result<JsValue, SurfaceError> {
    let value =
        serde_json::to_value(data).map_err(|err| SurfaceError::Native(err.to_string()))?;
    to_js(&value)
}

fn set_access_token(token: &str) -> Result<(), SurfaceError> {
    let namespace = js_sys::Reflect::get(&js_sys::global(), &"mapboxgl".into()).map_err(native)?;
    if namespace.is_undefined() {
        return Err(SurfaceError::Native("mapboxgl is not loaded".into()));
    }
    js_sys::Reflect::set(&namespace, &"accessToken".into(), &token.into()).map_err(native)?;
    Ok(())
}

/// Reads `e.features` of a layer event as GeoJSON features. Features that do
/// not decode are skipped.
fn event_features(event: &JsValue) -> Vec<Feature> {
    let Ok(raw) = js_sys::Reflect::get(event, &"features".into()) else {
        return Vec::new();
    };
    let Some(array) = raw.dyn_ref::<js_sys::Array>() else {
        return Vec::new();
    };
    array
        .iter()
        .filter_map(|f| js_sys::JSON::stringify(&f).ok())
        .filter_map(|s| s.as_string())
        .filter_map(|s| match serde_json::from_str::<Feature>(&s) {
            Ok(feature) => Some(feature),
            Err(err) => {
                tracing::debug!(%err, "undecodable feature in pointer event");
                None
            }
        })
        .collect()
}

fn event_lng_lat(event: &JsValue) -> Option<LngLat> {
    let raw = js_sys::Reflect::get(event, &"lngLat".into()).ok()?;
    let lng = js_sys::Reflect::get(&raw, &"lng".into()).ok()?.as_f64()?;
    let lat = js_sys::Reflect::get(&raw, &"lat".into()).ok()?.as_f64()?;
    Some(LngLat::new(lng, lat))
}

fn error_message(event: &JsValue) -> String {
    js_sys::Reflect::get(event, &"error".into())
        .ok()
        .and_then(|e| js_sys::Reflect::get(&e, &"message".into()).ok())
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| "map error".to_string())
}

struct Listener {
    kind: PointerEventKind,
    layer: LayerId,
    callback: Closure<dyn FnMut(JsValue)>,
}

pub struct MapboxSurface {
    map: MapboxMap,
    loaded: Rc<Cell<bool>>,
    released: bool,
    next_id: u64,
    events: Option<EventSender<SurfaceEvent>>,
    on_load: Option<Closure<dyn FnMut(JsValue)>>,
    on_error: Option<Closure<dyn FnMut(JsValue)>>,
    listeners: BTreeMap<ListenerId, Listener>,
    controls: BTreeMap<ControlId, JsValue>,
    popups: BTreeMap<PopupId, Popup>,
}

impl MapboxSurface {
    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn live(&self) -> Result<(), SurfaceError> {
        if self.released {
            return Err(SurfaceError::Released);
        }
        Ok(())
    }

    fn ready(&self) -> Result<(), SurfaceError> {
        self.live()?;
        if !self.loaded.get() {
            return Err(SurfaceError::Unready);
        }
        Ok(())
    }
}

impl RenderSurface for MapboxSurface {
    fn add_source(&mut self, id: &SourceId, data: &FeatureCollection) -> Result<(), SurfaceError> {
        self.ready()?;
        if self.has_source(id) {
            return Err(SurfaceError::DuplicateSource(id.to_string()));
        }
        let source = js_sys::Object::new();
        js_sys::Reflect::set(&source, &"type".into(), &"geojson".into()).map_err(native)?;
        js_sys::Reflect::set(&source, &"data".into(), &collection_to_js(data)?).map_err(native)?;
        self.map.add_source(id.as_str(), &source).map_err(native)
    }

    fn set_source_data(
        &mut self,
        id: &SourceId,
        data: &FeatureCollection,
    ) -> Result<(), SurfaceError> {
        self.live()?;
        let source = self.map.get_source(id.as_str());
        if source.is_undefined() || source.is_null() {
            return Err(SurfaceError::UnknownSource(id.to_string()));
        }
        source
            .unchecked_into::<GeoJsonSource>()
            .set_data(&collection_to_js(data)?)
            .map_err(native)
    }

    fn has_source(&self, id: &SourceId) -> bool {
        if self.released {
            return false;
        }
        let source = self.map.get_source(id.as_str());
        !(source.is_undefined() || source.is_null())
    }

    fn remove_source(&mut self, id: &SourceId) -> Result<(), SurfaceError> {
        self.live()?;
        if !self.has_source(id) {
            return Err(SurfaceError::UnknownSource(id.to_string()));
        }
        self.map.remove_source(id.as_str()).map_err(native)
    }

    fn add_layer(&mut self, spec: &LayerSpec) -> Result<(), SurfaceError> {
        self.ready()?;
        if self.has_layer(&spec.id) {
            return Err(SurfaceError::DuplicateLayer(spec.id.to_string()));
        }
        if !self.has_source(&spec.source) {
            return Err(SurfaceError::UnknownSource(spec.source.to_string()));
        }
        self.map
            .add_layer(&to_js(&spec.to_style_json())?)
            .map_err(native)
    }

    fn has_layer(&self, id: &LayerId) -> bool {
        if self.released {
            return false;
        }
        let layer = self.map.get_layer(id.as_str());
        !(layer.is_undefined() || layer.is_null())
    }

    fn remove_layer(&mut self, id: &LayerId) -> Result<(), SurfaceError> {
        self.live()?;
        if !self.has_layer(id) {
            return Err(SurfaceError::UnknownLayer(id.to_string()));
        }
        self.map.remove_layer(id.as_str()).map_err(native)
    }

    fn add_control(
        &mut self,
        control: ControlSpec,
        position: ControlPosition,
    ) -> Result<ControlId, SurfaceError> {
        self.live()?;
        let native_control: JsValue = match control {
            ControlSpec::Navigation => NavigationControl::new().into(),
            ControlSpec::Geolocate(options) => {
                let options = to_js(&json!({
                    "positionOptions": { "enableHighAccuracy": options.high_accuracy },
                    "trackUserLocation": options.track_user_location,
                    "showUserHeading": options.show_user_heading,
                }))?;
                GeolocateControl::new(&options).into()
            }
        };
        self.map
            .add_control(&native_control, position.as_str())
            .map_err(native)?;
        let id = ControlId(self.alloc_id());
        self.controls.insert(id, native_control);
        Ok(id)
    }

    fn remove_control(&mut self, id: ControlId) -> Result<(), SurfaceError> {
        self.live()?;
        let control = self
            .controls
            .remove(&id)
            .ok_or(SurfaceError::UnknownControl(id.0))?;
        self.map.remove_control(&control).map_err(native)
    }

    fn bind(&mut self, layer: &LayerId, kind: PointerEventKind) -> Result<ListenerId, SurfaceError> {
        self.ready()?;
        if !self.has_layer(layer) {
            return Err(SurfaceError::UnknownLayer(layer.to_string()));
        }
        let events = self.events.clone().ok_or(SurfaceError::Released)?;
        let id = ListenerId(self.alloc_id());
        let target = layer.clone();
        let callback = Closure::wrap(Box::new(move |e: JsValue| {
            let features = event_features(&e);
            let lng_lat = event_lng_lat(&e).or_else(|| features.first().map(|f| f.geometry.anchor()));
            events.send(SurfaceEvent::Pointer(PointerEvent {
                listener: id,
                kind,
                layer: target.clone(),
                features,
                lng_lat,
            }));
        }) as Box<dyn FnMut(JsValue)>);
        self.map.on_layer(
            kind.as_str(),
            layer.as_str(),
            callback.as_ref().unchecked_ref(),
        );
        self.listeners.insert(
            id,
            Listener {
                kind,
                layer: layer.clone(),
                callback,
            },
        );
        Ok(id)
    }

    fn unbind(&mut self, id: ListenerId) -> Result<(), SurfaceError> {
        self.live()?;
        let listener = self
            .listeners
            .remove(&id)
            .ok_or(SurfaceError::UnknownListener(id.0))?;
        self.map.off_layer(
            listener.kind.as_str(),
            listener.layer.as_str(),
            listener.callback.as_ref().unchecked_ref(),
        );
        Ok(())
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        if self.released {
            return;
        }
        let canvas = self.map.get_canvas();
        if let Err(err) = canvas.style().set_property("cursor", cursor.as_css()) {
            tracing::debug!(err = ?err, "cursor not set");
        }
    }

    fn camera(&self) -> CameraView {
        let center = self.map.get_center();
        CameraView::new(LngLat::new(center.lng(), center.lat()), self.map.get_zoom())
    }

    fn fly_to(&mut self, fly: FlyTo) -> Result<(), SurfaceError> {
        self.live()?;
        let options = to_js(&json!({
            "center": [fly.center.lng, fly.center.lat],
            "zoom": fly.zoom,
            "duration": fly.duration_ms,
        }))?;
        self.map.fly_to(&options).map_err(native)
    }

    fn add_popup(&mut self, spec: &PopupSpec) -> Result<PopupId, SurfaceError> {
        self.live()?;
        let options = to_js(&json!({
            "closeButton": spec.close_button,
            "closeOnClick": spec.close_on_click,
            "className": spec.class_name,
        }))?;
        let anchor = to_js(&json!([spec.anchor.lng, spec.anchor.lat]))?;
        let popup = Popup::new(&options);
        popup.set_lng_lat(&anchor);
        popup.set_html(&popup_html(&spec.content));
        popup.add_to(&self.map);
        let id = PopupId(self.alloc_id());
        self.popups.insert(id, popup);
        Ok(id)
    }

    fn remove_popup(&mut self, id: PopupId) -> Result<(), SurfaceError> {
        self.live()?;
        let popup = self
            .popups
            .remove(&id)
            .ok_or(SurfaceError::UnknownPopup(id.0))?;
        popup.remove_popup();
        Ok(())
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        for (_, popup) in std::mem::take(&mut self.popups) {
            popup.remove_popup();
        }
        for (_, listener) in std::mem::take(&mut self.listeners) {
            self.map.off_layer(
                listener.kind.as_str(),
                listener.layer.as_str(),
                listener.callback.as_ref().unchecked_ref(),
            );
        }
        if let Some(cb) = self.on_load.take() {
            self.map.off_map("load", cb.as_ref().unchecked_ref());
        }
        if let Some(cb) = self.on_error.take() {
            self.map.off_map("error", cb.as_ref().unchecked_ref());
        }
        self.controls.clear();
        self.map.remove();
        self.events = None;
        self.released = true;
        tracing::debug!("mapbox map removed");
    }

    fn is_released(&self) -> bool {
        self.released
    }
}

#[derive(Debug, Default)]
pub struct MapboxFactory;

impl SurfaceFactory for MapboxFactory {
    type Surface = MapboxSurface;

    fn create(
        &mut self,
        options: &SurfaceOptions,
        events: EventSender<SurfaceEvent>,
    ) -> Result<MapboxSurface, SurfaceError> {
        set_access_token(&options.access_token)?;
        let map_options = to_js(&json!({
            "container": options.container,
            "style": options.style_url,
            "center": [options.center.lng, options.center.lat],
            "zoom": options.zoom,
        }))?;
        let map = MapboxMap::new(&map_options).map_err(native)?;

        let loaded = Rc::new(Cell::new(false));
        let on_load = {
            let loaded = Rc::clone(&loaded);
            let events = events.clone();
            Closure::wrap(Box::new(move |_e: JsValue| {
                loaded.set(true);
                events.send(SurfaceEvent::Loaded);
            }) as Box<dyn FnMut(JsValue)>)
        };
        let on_error = {
            let events = events.clone();
            Closure::wrap(Box::new(move |e: JsValue| {
                events.send(SurfaceEvent::Error(error_message(&e)));
            }) as Box<dyn FnMut(JsValue)>)
        };
        map.on_map("load", on_load.as_ref().unchecked_ref());
        map.on_map("error", on_error.as_ref().unchecked_ref());

        Ok(MapboxSurface {
            map,
            loaded,
            released: false,
            next_id: 1,
            events: Some(events),
            on_load: Some(on_load),
            on_error: Some(on_error),
            listeners: BTreeMap::new(),
            controls: BTreeMap::new(),
            popups: BTreeMap::new(),
        })
    }
}
