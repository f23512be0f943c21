//! Declarative paint curves.
//!
//! A curve maps one numeric input (camera zoom, heatmap density, or a feature
//! property) to a paint value by piecewise-linear interpolation between stops,
//! clamped at both ends. Curves serialize to Mapbox GL style expressions and
//! can also be evaluated directly, which is what the headless surface does.

use serde_json::{Map, Value, json};

use crate::color::Color;

/// What a curve reads its input from.
#[derive(Debug, Clone, PartialEq)]
pub enum CurveInput {
    Zoom,
    HeatmapDensity,
    Property(String),
}

impl CurveInput {
    pub fn property(key: impl Into<String>) -> Self {
        CurveInput::Property(key.into())
    }

    fn to_expression(&self) -> Value {
        match self {
            CurveInput::Zoom => json!(["zoom"]),
            CurveInput::HeatmapDensity => json!(["heatmap-density"]),
            CurveInput::Property(key) => json!(["get", key]),
        }
    }
}

/// Values a curve can produce.
pub trait CurveValue: Clone {
    fn interpolate(from: &Self, to: &Self, t: f64) -> Self;
    fn to_json(&self) -> Value;
}

impl CurveValue for f64 {
    fn interpolate(from: &Self, to: &Self, t: f64) -> Self {
        from + (to - from) * t
    }

    fn to_json(&self) -> Value {
        json!(self)
    }
}

impl CurveValue for Color {
    fn interpolate(from: &Self, to: &Self, t: f64) -> Self {
        from.lerp(*to, t)
    }

    fn to_json(&self) -> Value {
        Value::String(self.to_css())
    }
}

/// Inputs available when evaluating a curve for one feature.
#[derive(Debug, Copy, Clone, Default)]
pub struct EvalContext<'a> {
    pub zoom: f64,
    pub density: Option<f64>,
    pub properties: Option<&'a Map<String, Value>>,
}

impl<'a> EvalContext<'a> {
    pub fn at_zoom(zoom: f64) -> Self {
        Self {
            zoom,
            ..Self::default()
        }
    }

    pub fn with_properties(mut self, properties: &'a Map<String, Value>) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn with_density(mut self, density: f64) -> Self {
        self.density = Some(density);
        self
    }

    fn input(&self, input: &CurveInput) -> Option<f64> {
        match input {
            CurveInput::Zoom => Some(self.zoom),
            CurveInput::HeatmapDensity => self.density,
            CurveInput::Property(key) => self.properties?.get(key)?.as_f64(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Curve<T> {
    Constant(T),
    Linear {
        input: CurveInput,
        /// Ascending by input value.
        stops: Vec<(f64, T)>,
    },
}

impl<T: CurveValue> Curve<T> {
    pub fn constant(value: T) -> Self {
        Curve::Constant(value)
    }

    pub fn linear(input: CurveInput, stops: Vec<(f64, T)>) -> Self {
        Curve::Linear { input, stops }
    }

    pub fn stops(&self) -> &[(f64, T)] {
        match self {
            Curve::Constant(_) => &[],
            Curve::Linear { stops, .. } => stops,
        }
    }

    pub fn input(&self) -> Option<&CurveInput> {
        match self {
            Curve::Constant(_) => None,
            Curve::Linear { input, .. } => Some(input),
        }
    }

    /// Evaluates the curve. Returns `None` when the input is unavailable (for
    /// example a feature lacking the property) or the curve has no stops.
    pub fn evaluate(&self, ctx: &EvalContext<'_>) -> Option<T> {
        match self {
            Curve::Constant(v) => Some(v.clone()),
            Curve::Linear { input, stops } => {
                let x = ctx.input(input)?;
                if !x.is_finite() {
                    return None;
                }
                evaluate_stops(stops, x)
            }
        }
    }

    /// Style-expression form, e.g. `["interpolate", ["linear"], ["zoom"], 0, 1, 12, 3]`.
    pub fn to_expression(&self) -> Value {
        match self {
            Curve::Constant(v) => v.to_json(),
            Curve::Linear { input, stops } => {
                let mut out = vec![json!("interpolate"), json!(["linear"]), input.to_expression()];
                for (x, v) in stops {
                    out.push(json!(x));
                    out.push(v.to_json());
                }
                Value::Array(out)
            }
        }
    }
}

fn evaluate_stops<T: CurveValue>(stops: &[(f64, T)], x: f64) -> Option<T> {
    let (first_x, first_v) = stops.first()?;
    if x <= *first_x {
        return Some(first_v.clone());
    }
    for pair in stops.windows(2) {
        let (x0, v0) = &pair[0];
        let (x1, v1) = &pair[1];
        if x <= *x1 {
            let span = x1 - x0;
            let t = if span <= 0.0 { 1.0 } else { (x - x0) / span };
            return Some(T::interpolate(v0, v1, t));
        }
    }
    stops.last().map(|(_, v)| v.clone())
}

#[cfg(test)]
mod tests {
    use super::{Curve, CurveInput, EvalContext};
    use crate::color::Color;
    use pretty_assertions::assert_eq;
    use serde_json::{Map, json};

    fn weight() -> Curve<f64> {
        Curve::linear(CurveInput::property("mention_count"), vec![(0.0, 0.0), (100.0, 1.0)])
    }

    fn props(count: f64) -> Map<String, serde_json::Value> {
        let mut m = Map::new();
        m.insert("mention_count".into(), json!(count));
        m
    }

    #[test]
    fn interpolates_and_clamps() {
        let w = weight();
        let eval = |c: f64| {
            let p = props(c);
            w.evaluate(&EvalContext::at_zoom(0.0).with_properties(&p)).unwrap()
        };
        assert_eq!(eval(-5.0), 0.0);
        assert_eq!(eval(50.0), 0.5);
        assert_eq!(eval(100.0), 1.0);
        assert_eq!(eval(450.0), 1.0);
    }

    #[test]
    fn missing_property_yields_none() {
        let p = Map::new();
        assert_eq!(weight().evaluate(&EvalContext::at_zoom(3.0).with_properties(&p)), None);
        assert_eq!(weight().evaluate(&EvalContext::at_zoom(3.0)), None);
    }

    #[test]
    fn zoom_curve_reads_camera_zoom() {
        let opacity = Curve::linear(CurveInput::Zoom, vec![(7.0, 1.0), (12.0, 0.0)]);
        assert_eq!(opacity.evaluate(&EvalContext::at_zoom(9.5)), Some(0.5));
        assert_eq!(opacity.evaluate(&EvalContext::at_zoom(13.0)), Some(0.0));
    }

    #[test]
    fn color_curve_interpolates_channels() {
        let c = Curve::linear(
            CurveInput::HeatmapDensity,
            vec![(0.0, Color::BLACK), (1.0, Color::WHITE)],
        );
        let mid = c.evaluate(&EvalContext::at_zoom(0.0).with_density(0.5)).unwrap();
        assert_eq!(mid.to_rgb8(), [128, 128, 128]);
    }

    #[test]
    fn serializes_to_style_expression() {
        assert_eq!(
            weight().to_expression(),
            json!(["interpolate", ["linear"], ["get", "mention_count"], 0.0, 0.0, 100.0, 1.0])
        );
        assert_eq!(Curve::constant(2.0).to_expression(), json!(2.0));
    }
}
