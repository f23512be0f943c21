use foundation::geo::LngLat;
use foundation::geojson::Feature;

use crate::layer::LayerId;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

/// Pointer interactions a surface reports per layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    MouseEnter,
    MouseLeave,
    Click,
}

impl PointerEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PointerEventKind::MouseEnter => "mouseenter",
            PointerEventKind::MouseLeave => "mouseleave",
            PointerEventKind::Click => "click",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub listener: ListenerId,
    pub kind: PointerEventKind,
    pub layer: LayerId,
    /// Rendered features under the pointer, topmost first.
    pub features: Vec<Feature>,
    pub lng_lat: Option<LngLat>,
}

/// Everything a surface reports back to its owner, delivered through a
/// `runtime::EventQueue` rather than by calling into component state.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// Style and resources finished loading. Sources and layers may be added
    /// only after this has been observed.
    Loaded,
    Pointer(PointerEvent),
    Error(String),
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

impl Cursor {
    /// CSS `cursor` value; the default cursor clears the override.
    pub fn as_css(self) -> &'static str {
        match self {
            Cursor::Default => "",
            Cursor::Pointer => "pointer",
        }
    }
}
