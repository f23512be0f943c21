//! The zoom-band handoff between the three location layers.
//!
//! Density dominates at regional zoom, individual points fade in from zoom 10,
//! and labels appear from zoom 12 where the density layer ends. All thresholds
//! and paint curves live in this one table.

use surface::color::Color;
use surface::curve::{Curve, CurveInput};
use surface::layer::{
    CirclePaint, HeatmapPaint, LayerId, LayerPaint, LayerSpec, SourceId, SymbolPaint, TextAnchor,
    ZoomBand,
};

use crate::symbology::{SENTIMENT_NEGATIVE, SENTIMENT_NEUTRAL, SENTIMENT_POSITIVE};

pub const SOURCE_ID: &str = "locations";
pub const DENSITY_LAYER_ID: &str = "locations-heat";
pub const POINT_LAYER_ID: &str = "locations-point";
pub const LABEL_LAYER_ID: &str = "locations-label";

pub const DENSITY_MAX_ZOOM: f64 = 12.0;
pub const POINT_MIN_ZOOM: f64 = 10.0;
pub const LABEL_MIN_ZOOM: f64 = 12.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LayerRole {
    Density,
    Point,
    Label,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LayerBand {
    pub role: LayerRole,
    pub id: &'static str,
    pub band: ZoomBand,
}

/// Draw order, bottom to top.
pub const HANDOFF: [LayerBand; 3] = [
    LayerBand {
        role: LayerRole::Density,
        id: DENSITY_LAYER_ID,
        band: ZoomBand::below(DENSITY_MAX_ZOOM),
    },
    LayerBand {
        role: LayerRole::Point,
        id: POINT_LAYER_ID,
        band: ZoomBand::from(POINT_MIN_ZOOM),
    },
    LayerBand {
        role: LayerRole::Label,
        id: LABEL_LAYER_ID,
        band: ZoomBand::from(LABEL_MIN_ZOOM),
    },
];

pub fn band(role: LayerRole) -> LayerBand {
    match role {
        LayerRole::Density => HANDOFF[0],
        LayerRole::Point => HANDOFF[1],
        LayerRole::Label => HANDOFF[2],
    }
}

pub fn visible_roles(zoom: f64) -> Vec<LayerRole> {
    HANDOFF
        .iter()
        .filter(|b| b.band.contains(zoom))
        .map(|b| b.role)
        .collect()
}

pub fn density_paint() -> HeatmapPaint {
    HeatmapPaint {
        weight: Curve::linear(
            CurveInput::property("mention_count"),
            vec![(0.0, 0.0), (100.0, 1.0)],
        ),
        intensity: Curve::linear(CurveInput::Zoom, vec![(0.0, 1.0), (DENSITY_MAX_ZOOM, 3.0)]),
        color: Curve::linear(
            CurveInput::HeatmapDensity,
            vec![
                (0.0, Color::rgba8(33, 102, 172, 0.0)),
                (0.2, Color::rgba8(103, 169, 207, 1.0)),
                (0.4, Color::rgba8(209, 229, 240, 1.0)),
                (0.6, Color::rgba8(253, 219, 199, 1.0)),
                (0.8, Color::rgba8(239, 138, 98, 1.0)),
                (1.0, Color::rgba8(178, 24, 43, 1.0)),
            ],
        ),
        radius: Curve::linear(CurveInput::Zoom, vec![(0.0, 2.0), (DENSITY_MAX_ZOOM, 20.0)]),
        opacity: Curve::linear(CurveInput::Zoom, vec![(7.0, 1.0), (DENSITY_MAX_ZOOM, 0.0)]),
    }
}

pub fn point_paint() -> CirclePaint {
    CirclePaint {
        radius: Curve::linear(
            CurveInput::property("mention_count"),
            vec![(5.0, 6.0), (50.0, 15.0), (100.0, 25.0)],
        ),
        color: Curve::linear(
            CurveInput::property("avg_sentiment"),
            vec![
                (-1.0, SENTIMENT_NEGATIVE),
                (0.0, SENTIMENT_NEUTRAL),
                (1.0, SENTIMENT_POSITIVE),
            ],
        ),
        stroke_color: Color::WHITE,
        stroke_width: 2.0,
        opacity: Curve::linear(
            CurveInput::Zoom,
            vec![(POINT_MIN_ZOOM, 0.0), (POINT_MIN_ZOOM + 1.0, 0.9)],
        ),
    }
}

pub fn label_paint() -> SymbolPaint {
    SymbolPaint {
        text_field: "name".to_string(),
        fonts: vec!["DIN Pro Medium".to_string(), "Arial Unicode MS Bold".to_string()],
        text_size_px: 12.0,
        text_offset: [0.0, 1.5],
        text_anchor: TextAnchor::Top,
        color: Color::WHITE,
        halo_color: Color::BLACK,
        halo_width_px: 1.0,
    }
}

pub fn layer_spec(role: LayerRole, source: &SourceId) -> LayerSpec {
    let entry = band(role);
    let paint = match role {
        LayerRole::Density => LayerPaint::Heatmap(density_paint()),
        LayerRole::Point => LayerPaint::Circle(point_paint()),
        LayerRole::Label => LayerPaint::Symbol(label_paint()),
    };
    LayerSpec {
        id: LayerId::new(entry.id),
        source: source.clone(),
        band: entry.band,
        paint,
    }
}

/// All three layers in draw order.
pub fn layer_specs(source: &SourceId) -> Vec<LayerSpec> {
    HANDOFF
        .iter()
        .map(|b| layer_spec(b.role, source))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{LayerRole, layer_spec, layer_specs, visible_roles};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use surface::curve::EvalContext;
    use surface::layer::{LayerPaint, SourceId};

    #[test]
    fn handoff_by_zoom() {
        assert_eq!(visible_roles(7.0), vec![LayerRole::Density]);
        assert_eq!(
            visible_roles(10.5),
            vec![LayerRole::Density, LayerRole::Point]
        );
        assert_eq!(visible_roles(12.0), vec![LayerRole::Point, LayerRole::Label]);
        assert_eq!(visible_roles(16.0), vec![LayerRole::Point, LayerRole::Label]);
    }

    #[test]
    fn opacity_ramps_meet_at_handoff() {
        let src = SourceId::new("locations");
        let LayerPaint::Heatmap(heat) = layer_spec(LayerRole::Density, &src).paint else {
            panic!("density layer is a heatmap");
        };
        let LayerPaint::Circle(point) = layer_spec(LayerRole::Point, &src).paint else {
            panic!("point layer is a circle layer");
        };

        let at = |z: f64| EvalContext::at_zoom(z);
        assert_eq!(heat.opacity.evaluate(&at(7.0)), Some(1.0));
        assert_eq!(heat.opacity.evaluate(&at(12.0)), Some(0.0));
        assert_eq!(point.opacity.evaluate(&at(10.0)), Some(0.0));
        assert_eq!(point.opacity.evaluate(&at(11.0)), Some(0.9));
        assert_eq!(point.opacity.evaluate(&at(15.0)), Some(0.9));
    }

    #[test]
    fn style_json_matches_mapbox_layers() {
        let specs = layer_specs(&SourceId::new("locations"));
        let json: Vec<_> = specs.iter().map(|s| s.to_style_json()).collect();

        assert_eq!(json[0]["id"], "locations-heat");
        assert_eq!(json[0]["maxzoom"], json!(12.0));
        assert_eq!(
            json[0]["paint"]["heatmap-weight"],
            json!(["interpolate", ["linear"], ["get", "mention_count"], 0.0, 0.0, 100.0, 1.0])
        );
        assert_eq!(json[1]["id"], "locations-point");
        assert_eq!(json[1]["minzoom"], json!(10.0));
        assert_eq!(json[1]["paint"]["circle-stroke-width"], json!(2.0));
        assert_eq!(json[2]["type"], "symbol");
        assert_eq!(json[2]["layout"]["text-field"], json!(["get", "name"]));
        assert_eq!(json[2]["layout"]["text-anchor"], "top");
    }
}
