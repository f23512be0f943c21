use surface::color::Color;

pub const SENTIMENT_NEGATIVE: Color = Color::rgba8(0xe5, 0x3e, 0x3e, 1.0);
pub const SENTIMENT_NEUTRAL: Color = Color::rgba8(0xec, 0xc9, 0x4b, 1.0);
pub const SENTIMENT_POSITIVE: Color = Color::rgba8(0x38, 0xa1, 0x69, 1.0);

/// Scores strictly beyond this magnitude are no longer neutral.
pub const SENTIMENT_THRESHOLD: f64 = 0.3;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLabel {
    pub fn from_score(score: f64) -> Self {
        if score > SENTIMENT_THRESHOLD {
            SentimentLabel::Positive
        } else if score < -SENTIMENT_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Positive => "Positive",
        }
    }

    pub fn color(self) -> Color {
        match self {
            SentimentLabel::Negative => SENTIMENT_NEGATIVE,
            SentimentLabel::Neutral => SENTIMENT_NEUTRAL,
            SentimentLabel::Positive => SENTIMENT_POSITIVE,
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::SentimentLabel;

    #[test]
    fn thresholds_are_exclusive() {
        assert_eq!(SentimentLabel::from_score(0.3), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(0.31), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_score(-0.3), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(-0.8), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_score(f64::NAN), SentimentLabel::Neutral);
    }

    #[test]
    fn css_colors() {
        assert_eq!(SentimentLabel::Negative.color().to_css(), "#e53e3e");
        assert_eq!(SentimentLabel::Neutral.color().to_css(), "#ecc94b");
        assert_eq!(SentimentLabel::Positive.color().to_css(), "#38a169");
    }
}
