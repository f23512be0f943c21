//! The rendering-surface capability set.
//!
//! Components never hold native callbacks. A surface reports readiness,
//! pointer interactions and errors by sending [`SurfaceEvent`]s through the
//! [`EventSender`] it was created with; the owner drains the queue and routes
//! events into component state.

use foundation::geo::LngLat;
use foundation::geojson::FeatureCollection;
use runtime::event_bus::EventSender;

use crate::camera::{CameraView, FlyTo};
use crate::control::{ControlId, ControlPosition, ControlSpec};
use crate::error::SurfaceError;
use crate::event::{Cursor, ListenerId, PointerEventKind, SurfaceEvent};
use crate::layer::{LayerId, LayerSpec, SourceId};
use crate::popup::{PopupId, PopupSpec};

/// Parameters for creating a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceOptions {
    /// Host element id (DOM container on the web).
    pub container: String,
    pub style_url: String,
    pub access_token: String,
    pub center: LngLat,
    pub zoom: f64,
}

pub trait RenderSurface {
    fn add_source(&mut self, id: &SourceId, data: &FeatureCollection) -> Result<(), SurfaceError>;
    /// Replaces the whole data set of an existing source in one step.
    fn set_source_data(
        &mut self,
        id: &SourceId,
        data: &FeatureCollection,
    ) -> Result<(), SurfaceError>;
    fn has_source(&self, id: &SourceId) -> bool;
    fn remove_source(&mut self, id: &SourceId) -> Result<(), SurfaceError>;

    fn add_layer(&mut self, spec: &LayerSpec) -> Result<(), SurfaceError>;
    fn has_layer(&self, id: &LayerId) -> bool;
    fn remove_layer(&mut self, id: &LayerId) -> Result<(), SurfaceError>;

    fn add_control(
        &mut self,
        control: ControlSpec,
        position: ControlPosition,
    ) -> Result<ControlId, SurfaceError>;
    fn remove_control(&mut self, id: ControlId) -> Result<(), SurfaceError>;

    /// Starts reporting `kind` events on `layer` as [`SurfaceEvent::Pointer`].
    fn bind(&mut self, layer: &LayerId, kind: PointerEventKind) -> Result<ListenerId, SurfaceError>;
    fn unbind(&mut self, id: ListenerId) -> Result<(), SurfaceError>;

    fn set_cursor(&mut self, cursor: Cursor);
    fn camera(&self) -> CameraView;
    /// Starts an animated camera move, superseding any move in flight.
    fn fly_to(&mut self, fly: FlyTo) -> Result<(), SurfaceError>;

    fn add_popup(&mut self, spec: &PopupSpec) -> Result<PopupId, SurfaceError>;
    fn remove_popup(&mut self, id: PopupId) -> Result<(), SurfaceError>;

    /// Frees the native surface. Every later call fails with
    /// [`SurfaceError::Released`]; releasing twice is a no-op.
    fn release(&mut self);
    fn is_released(&self) -> bool;
}

pub trait SurfaceFactory {
    type Surface: RenderSurface;

    fn create(
        &mut self,
        options: &SurfaceOptions,
        events: EventSender<SurfaceEvent>,
    ) -> Result<Self::Surface, SurfaceError>;
}
