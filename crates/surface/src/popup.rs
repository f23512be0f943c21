use foundation::geo::LngLat;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PopupId(pub u64);

/// Structured popup body. Callers only supply text; turning it into markup
/// is left to the native surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopupContent {
    pub title: String,
    pub lines: Vec<String>,
}

impl PopupContent {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    pub fn line(mut self, text: impl Into<String>) -> Self {
        self.lines.push(text.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopupSpec {
    pub anchor: LngLat,
    pub content: PopupContent,
    pub close_button: bool,
    pub close_on_click: bool,
    pub class_name: String,
}
