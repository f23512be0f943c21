use serde::{Deserialize, Serialize};

/// Monotonic timestamp in milliseconds.
///
/// The engine never reads wall-clock time itself; callers pass `Millis` in so
/// timer behavior stays deterministic under test.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Millis(pub u64);

impl Millis {
    pub const ZERO: Millis = Millis(0);

    pub fn after(self, ms: u64) -> Self {
        Millis(self.0.saturating_add(ms))
    }

    pub fn saturating_since(self, earlier: Millis) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Mention time-range filter understood by the backend.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    #[default]
    All,
    Week,
    Day,
}

impl TimeRange {
    pub const ALL: [TimeRange; 3] = [TimeRange::All, TimeRange::Week, TimeRange::Day];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::All => "all",
            TimeRange::Week => "week",
            TimeRange::Day => "day",
        }
    }

    /// Button label shown by the time filter.
    pub fn label(self) -> &'static str {
        match self {
            TimeRange::All => "All Time",
            TimeRange::Week => "This Week",
            TimeRange::Day => "Today",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Some(TimeRange::All),
            "week" => Some(TimeRange::Week),
            "day" => Some(TimeRange::Day),
            _ => None,
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
