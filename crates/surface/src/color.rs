/// Linear RGBA color with components in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba8(255, 255, 255, 1.0);
    pub const BLACK: Color = Color::rgba8(0, 0, 0, 1.0);

    pub const fn rgba8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a,
        }
    }

    /// Parses `#rgb`, `#rrggbb`, `rgb(r,g,b)` and `rgba(r,g,b,a)`.
    pub fn parse_css(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        let (body, has_alpha) = if let Some(rest) = s.strip_prefix("rgba(") {
            (rest.strip_suffix(')')?, true)
        } else if let Some(rest) = s.strip_prefix("rgb(") {
            (rest.strip_suffix(')')?, false)
        } else {
            return None;
        };

        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        let expected = if has_alpha { 4 } else { 3 };
        if parts.len() != expected {
            return None;
        }
        let r: u8 = parts[0].parse().ok()?;
        let g: u8 = parts[1].parse().ok()?;
        let b: u8 = parts[2].parse().ok()?;
        let a: f32 = if has_alpha { parts[3].parse().ok()? } else { 1.0 };
        Some(Self::rgba8(r, g, b, a.clamp(0.0, 1.0)))
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        [channel(self.r), channel(self.g), channel(self.b)]
    }

    pub fn to_css(self) -> String {
        let [r, g, b] = self.to_rgb8();
        if (self.a - 1.0).abs() < f32::EPSILON {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("rgba({r},{g},{b},{})", self.a)
        }
    }

    pub fn lerp(self, to: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0) as f32;
        Color {
            r: self.r + (to.r - self.r) * t,
            g: self.g + (to.g - self.g) * t,
            b: self.b + (to.b - self.b) * t,
            a: self.a + (to.a - self.a) * t,
        }
    }
}

fn channel(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn parse_hex(hex: &str) -> Option<Color> {
    let expand = |c: u8| c * 16 + c;
    let digit = |c: char| c.to_digit(16).map(|d| d as u8);
    let chars: Vec<char> = hex.chars().collect();
    match chars.len() {
        3 => Some(Color::rgba8(
            expand(digit(chars[0])?),
            expand(digit(chars[1])?),
            expand(digit(chars[2])?),
            1.0,
        )),
        6 => {
            let byte = |i: usize| Some(digit(chars[i])? * 16 + digit(chars[i + 1])?);
            Some(Color::rgba8(byte(0)?, byte(2)?, byte(4)?, 1.0))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn parses_css_forms() {
        assert_eq!(Color::parse_css("#fff"), Some(Color::WHITE));
        assert_eq!(Color::parse_css("#e53e3e").unwrap().to_rgb8(), [0xe5, 0x3e, 0x3e]);
        assert_eq!(Color::parse_css("rgb(103,169,207)").unwrap().to_rgb8(), [103, 169, 207]);
        let c = Color::parse_css("rgba(33,102,172,0)").unwrap();
        assert_eq!(c.a, 0.0);
        assert_eq!(Color::parse_css("hsl(1,2,3)"), None);
        assert_eq!(Color::parse_css("#12345"), None);
    }

    #[test]
    fn css_output_round_trips_opaque_hex() {
        assert_eq!(Color::parse_css("#38a169").unwrap().to_css(), "#38a169");
        assert_eq!(Color::rgba8(1, 2, 3, 0.5).to_css(), "rgba(1,2,3,0.5)");
    }

    #[test]
    fn lerp_midpoint() {
        let c = Color::BLACK.lerp(Color::WHITE, 0.5);
        assert_eq!(c.to_rgb8(), [128, 128, 128]);
    }
}
