//! Browser entry points.
//!
//! The page calls `mount_viewer` once, then `viewer_frame` from its
//! `requestAnimationFrame` loop so surface events and debounce timers are
//! serviced. UI controls call the remaining `viewer_*` functions and re-render
//! from `viewer_state_json`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use console_error_panic_hook::set_once;
use data::fetch::FetchDataLayer;
use data::geolocation::{GeolocationError, Geolocator, Position, PositionOptions};
use data::layer::LocalBoxFuture;
use foundation::geo::LngLat;
use foundation::time::{Millis, TimeRange};
use runtime::clock::Clock;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};

use crate::app::{App, AppCommand};
use crate::config::ViewerConfig;
use crate::driver::Driver;
use crate::mapbox::MapboxFactory;

/// Milliseconds since the page created it, from `Date.now()`.
#[derive(Debug, Clone)]
pub struct BrowserClock {
    origin: f64,
}

impl BrowserClock {
    pub fn new() -> Self {
        Self {
            origin: js_sys::Date::now(),
        }
    }
}

impl Default for BrowserClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for BrowserClock {
    fn now(&self) -> Millis {
        Millis((js_sys::Date::now() - self.origin).max(0.0) as u64)
    }
}

/// `navigator.geolocation.getCurrentPosition` as a future.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserGeolocator;

impl Geolocator for BrowserGeolocator {
    fn current_position(
        &self,
        options: PositionOptions,
    ) -> LocalBoxFuture<'_, Result<Position, GeolocationError>> {
        Box::pin(async move {
            let window = web_sys::window().ok_or(GeolocationError::Unsupported)?;
            let geolocation = window
                .navigator()
                .geolocation()
                .map_err(|_| GeolocationError::Unsupported)?;

            let native_options = web_sys::PositionOptions::new();
            native_options.set_enable_high_accuracy(options.high_accuracy);
            native_options.set_timeout(options.timeout_ms);
            native_options.set_maximum_age(options.maximum_age_ms);

            let promise = js_sys::Promise::new(&mut |resolve, reject| {
                if let Err(err) = geolocation.get_current_position_with_error_callback_and_options(
                    &resolve,
                    Some(&reject),
                    &native_options,
                ) {
                    let _ = reject.call1(&JsValue::NULL, &err);
                }
            });

            match JsFuture::from(promise).await {
                Ok(value) => {
                    let position: web_sys::GeolocationPosition = value.unchecked_into();
                    let coords = position.coords();
                    Ok(Position {
                        coordinate: LngLat::new(coords.longitude(), coords.latitude()),
                        accuracy: coords.accuracy(),
                    })
                }
                Err(err) => Err(err
                    .dyn_into::<web_sys::GeolocationPositionError>()
                    .map(|e| GeolocationError::from_code(e.code()))
                    .unwrap_or(GeolocationError::Unknown)),
            }
        })
    }
}

struct WebViewer {
    app: App<MapboxFactory>,
    data: Rc<FetchDataLayer>,
    geolocator: Rc<BrowserGeolocator>,
    clock: BrowserClock,
    generation: u64,
}

thread_local! {
    static STATE: RefCell<Option<WebViewer>> = const { RefCell::new(None) };
    static GENERATION: Cell<u64> = const { Cell::new(0) };
}

fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

fn with_viewer<R>(f: impl FnOnce(&mut WebViewer) -> R) -> Result<R, JsValue> {
    STATE.with(|state| {
        let mut state = state.borrow_mut();
        let viewer = state
            .as_mut()
            .ok_or_else(|| JsValue::from_str("viewer is not mounted"))?;
        Ok(f(viewer))
    })
}

/// Runs each command on the microtask queue. No borrow of the viewer is held
/// across an await; results land only in the viewer that issued them.
fn dispatch(commands: Vec<AppCommand>) {
    for command in commands {
        spawn_local(async move {
            let handles = STATE.with(|state| {
                state.borrow().as_ref().map(|v| {
                    (Rc::clone(&v.data), Rc::clone(&v.geolocator), v.generation)
                })
            });
            let Some((data, geolocator, generation)) = handles else {
                return;
            };
            let event = Driver::new(&*data, &*geolocator).execute(command).await;
            let next = with_viewer(|viewer| {
                if viewer.generation != generation {
                    return None;
                }
                let mut next = viewer.app.handle(event);
                next.extend(viewer.app.pump());
                Some(next)
            });
            match next {
                Ok(Some(next)) => dispatch(next),
                _ => log("result arrived after its viewer was unmounted"),
            }
        });
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Creates the viewer in `container`. Without a token the map stays in its
/// diagnostic state and the rest of the page still works.
#[wasm_bindgen]
pub fn mount_viewer(
    container: String,
    access_token: Option<String>,
    api_base: Option<String>,
) -> Result<(), JsValue> {
    let mounted = STATE.with(|state| state.borrow().is_some());
    if mounted {
        return Ok(());
    }

    let mut config = ViewerConfig {
        access_token,
        ..ViewerConfig::default()
    };
    if let Some(api_base) = api_base {
        config.api_base = api_base;
    }

    let mut app = App::new(MapboxFactory, &config, container);
    let commands = app.mount();
    if let Some(err) = app.map().diagnostic() {
        log(&format!("map disabled: {err}"));
    }
    STATE.with(|state| {
        *state.borrow_mut() = Some(WebViewer {
            app,
            data: Rc::new(FetchDataLayer::new(config.api_base.clone())),
            geolocator: Rc::new(BrowserGeolocator),
            clock: BrowserClock::new(),
            generation: GENERATION.with(|g| {
                g.set(g.get() + 1);
                g.get()
            }),
        });
    });
    dispatch(commands);
    Ok(())
}

/// Services surface events and due timers. Call once per animation frame.
#[wasm_bindgen]
pub fn viewer_frame() -> Result<(), JsValue> {
    let commands = with_viewer(|viewer| {
        let now = viewer.clock.now();
        let mut commands = viewer.app.pump();
        commands.extend(viewer.app.tick(now));
        commands
    })?;
    dispatch(commands);
    Ok(())
}

#[wasm_bindgen]
pub fn viewer_set_time_range(range: &str) -> Result<(), JsValue> {
    let range = TimeRange::parse(range)
        .ok_or_else(|| JsValue::from_str(&format!("unknown time range {range:?}")))?;
    dispatch(with_viewer(|viewer| viewer.app.set_time_range(range))?);
    Ok(())
}

#[wasm_bindgen]
pub fn viewer_set_query(query: String) -> Result<(), JsValue> {
    with_viewer(|viewer| {
        let now = viewer.clock.now();
        viewer.app.set_query(now, query);
    })
}

#[wasm_bindgen]
pub fn viewer_focus_search() -> Result<(), JsValue> {
    with_viewer(|viewer| viewer.app.focus_search())
}

#[wasm_bindgen]
pub fn viewer_dismiss_search() -> Result<(), JsValue> {
    with_viewer(|viewer| viewer.app.dismiss_search())
}

#[wasm_bindgen]
pub fn viewer_pick_result(index: usize) -> Result<(), JsValue> {
    dispatch(with_viewer(|viewer| viewer.app.pick_search_result(index))?);
    Ok(())
}

#[wasm_bindgen]
pub fn viewer_close_selection() -> Result<(), JsValue> {
    with_viewer(|viewer| viewer.app.close_selection())
}

#[wasm_bindgen]
pub fn viewer_refetch() -> Result<(), JsValue> {
    dispatch(with_viewer(|viewer| viewer.app.refetch())?);
    Ok(())
}

#[wasm_bindgen]
pub fn viewer_dismiss_banner() -> Result<(), JsValue> {
    with_viewer(|viewer| viewer.app.dismiss_banner())
}

/// Tears the map down. Requests still in flight are discarded when they land.
#[wasm_bindgen]
pub fn viewer_unmount() {
    let viewer = STATE.with(|state| state.borrow_mut().take());
    if let Some(mut viewer) = viewer {
        viewer.app.unmount();
    }
}

#[wasm_bindgen]
pub fn viewer_state_json() -> Result<String, JsValue> {
    let snapshot = with_viewer(|viewer| viewer.app.snapshot())?;
    serde_json::to_string(&snapshot).map_err(|err| JsValue::from_str(&err.to_string()))
}
