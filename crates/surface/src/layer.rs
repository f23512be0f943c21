use serde_json::{Map, Value, json};

use crate::color::Color;
use crate::curve::Curve;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(pub String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Zoom range in which a layer is drawn: `min <= zoom < max`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ZoomBand {
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
}

impl ZoomBand {
    pub const ALL: ZoomBand = ZoomBand {
        min_zoom: None,
        max_zoom: None,
    };

    pub const fn below(max_zoom: f64) -> Self {
        Self {
            min_zoom: None,
            max_zoom: Some(max_zoom),
        }
    }

    pub const fn from(min_zoom: f64) -> Self {
        Self {
            min_zoom: Some(min_zoom),
            max_zoom: None,
        }
    }

    pub fn contains(&self, zoom: f64) -> bool {
        self.min_zoom.is_none_or(|min| zoom >= min) && self.max_zoom.is_none_or(|max| zoom < max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapPaint {
    pub weight: Curve<f64>,
    pub intensity: Curve<f64>,
    pub color: Curve<Color>,
    pub radius: Curve<f64>,
    pub opacity: Curve<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CirclePaint {
    pub radius: Curve<f64>,
    pub color: Curve<Color>,
    pub stroke_color: Color,
    pub stroke_width: f64,
    pub opacity: Curve<f64>,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum TextAnchor {
    Center,
    #[default]
    Top,
    Bottom,
}

impl TextAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAnchor::Center => "center",
            TextAnchor::Top => "top",
            TextAnchor::Bottom => "bottom",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolPaint {
    /// Feature property holding the label text.
    pub text_field: String,
    pub fonts: Vec<String>,
    pub text_size_px: f64,
    /// Offset in ems.
    pub text_offset: [f64; 2],
    pub text_anchor: TextAnchor,
    pub color: Color,
    pub halo_color: Color,
    pub halo_width_px: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerPaint {
    Heatmap(HeatmapPaint),
    Circle(CirclePaint),
    Symbol(SymbolPaint),
}

impl LayerPaint {
    pub fn kind(&self) -> &'static str {
        match self {
            LayerPaint::Heatmap(_) => "heatmap",
            LayerPaint::Circle(_) => "circle",
            LayerPaint::Symbol(_) => "symbol",
        }
    }
}

/// Declarative layer definition bound to a named source.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub id: LayerId,
    pub source: SourceId,
    pub band: ZoomBand,
    pub paint: LayerPaint,
}

impl LayerSpec {
    /// Mapbox GL style-spec layer object.
    pub fn to_style_json(&self) -> Value {
        let mut layer = Map::new();
        layer.insert("id".into(), json!(self.id.as_str()));
        layer.insert("type".into(), json!(self.paint.kind()));
        layer.insert("source".into(), json!(self.source.as_str()));
        if let Some(min) = self.band.min_zoom {
            layer.insert("minzoom".into(), json!(min));
        }
        if let Some(max) = self.band.max_zoom {
            layer.insert("maxzoom".into(), json!(max));
        }

        match &self.paint {
            LayerPaint::Heatmap(p) => {
                layer.insert(
                    "paint".into(),
                    json!({
                        "heatmap-weight": p.weight.to_expression(),
                        "heatmap-intensity": p.intensity.to_expression(),
                        "heatmap-color": p.color.to_expression(),
                        "heatmap-radius": p.radius.to_expression(),
                        "heatmap-opacity": p.opacity.to_expression(),
                    }),
                );
            }
            LayerPaint::Circle(p) => {
                layer.insert(
                    "paint".into(),
                    json!({
                        "circle-radius": p.radius.to_expression(),
                        "circle-color": p.color.to_expression(),
                        "circle-stroke-color": p.stroke_color.to_css(),
                        "circle-stroke-width": p.stroke_width,
                        "circle-opacity": p.opacity.to_expression(),
                    }),
                );
            }
            LayerPaint::Symbol(p) => {
                layer.insert(
                    "layout".into(),
                    json!({
                        "text-field": ["get", p.text_field],
                        "text-font": p.fonts,
                        "text-size": p.text_size_px,
                        "text-offset": p.text_offset,
                        "text-anchor": p.text_anchor.as_str(),
                    }),
                );
                layer.insert(
                    "paint".into(),
                    json!({
                        "text-color": p.color.to_css(),
                        "text-halo-color": p.halo_color.to_css(),
                        "text-halo-width": p.halo_width_px,
                    }),
                );
            }
        }

        Value::Object(layer)
    }
}

#[cfg(test)]
mod tests {
    use super::{CirclePaint, LayerId, LayerPaint, LayerSpec, SourceId, ZoomBand};
    use crate::color::Color;
    use crate::curve::{Curve, CurveInput};
    use serde_json::json;

    #[test]
    fn zoom_band_is_min_inclusive_max_exclusive() {
        let heat = ZoomBand::below(12.0);
        assert!(heat.contains(0.0));
        assert!(heat.contains(11.99));
        assert!(!heat.contains(12.0));

        let point = ZoomBand::from(10.0);
        assert!(!point.contains(9.99));
        assert!(point.contains(10.0));
        assert!(ZoomBand::ALL.contains(22.0));
    }

    #[test]
    fn circle_layer_style_json() {
        let spec = LayerSpec {
            id: LayerId::new("pts"),
            source: SourceId::new("src"),
            band: ZoomBand::from(10.0),
            paint: LayerPaint::Circle(CirclePaint {
                radius: Curve::constant(4.0),
                color: Curve::linear(
                    CurveInput::property("avg_sentiment"),
                    vec![(-1.0, Color::BLACK), (1.0, Color::WHITE)],
                ),
                stroke_color: Color::WHITE,
                stroke_width: 2.0,
                opacity: Curve::constant(1.0),
            }),
        };
        let v = spec.to_style_json();
        assert_eq!(v["type"], "circle");
        assert_eq!(v["source"], "src");
        assert_eq!(v["minzoom"], json!(10.0));
        assert!(v.get("maxzoom").is_none());
        assert_eq!(v["paint"]["circle-stroke-color"], "#ffffff");
        assert_eq!(v["paint"]["circle-color"][2], json!(["get", "avg_sentiment"]));
    }
}
