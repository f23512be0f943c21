#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ControlId(pub u64);

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ControlPosition {
    TopLeft,
    #[default]
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ControlPosition {
    pub fn as_str(self) -> &'static str {
        match self {
            ControlPosition::TopLeft => "top-left",
            ControlPosition::TopRight => "top-right",
            ControlPosition::BottomLeft => "bottom-left",
            ControlPosition::BottomRight => "bottom-right",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GeolocateOptions {
    pub high_accuracy: bool,
    pub track_user_location: bool,
    pub show_user_heading: bool,
}

impl Default for GeolocateOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            track_user_location: true,
            show_user_heading: true,
        }
    }
}

/// Built-in surface controls.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ControlSpec {
    Navigation,
    Geolocate(GeolocateOptions),
}
