use foundation::geo::LngLat;
use foundation::location::Location;
use surface::popup::{PopupContent, PopupSpec};

use crate::symbology::SentimentLabel;

pub const HOVER_POPUP_CLASS: &str = "location-popup-hover";

/// Text shown while the pointer rests on a location point.
pub fn hover_preview_content(location: &Location) -> PopupContent {
    let sentiment = SentimentLabel::from_score(location.sentiment());
    PopupContent::new(location.name.clone())
        .line(mention_text(location.mention_count))
        .line(format!("Sentiment: {sentiment}"))
}

pub fn hover_popup_spec(anchor: LngLat, location: &Location) -> PopupSpec {
    PopupSpec {
        anchor,
        content: hover_preview_content(location),
        close_button: false,
        close_on_click: false,
        class_name: HOVER_POPUP_CLASS.to_string(),
    }
}

pub fn mention_text(count: u64) -> String {
    format!("{count} mentions")
}
