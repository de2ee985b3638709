//! Chart colours and heatmap banding.

use std::fmt;

/// Fixed series palette, cycled by first-seen index.
const PALETTE: &[&str] = &[
    "#4F46E5", "#0EA5E9", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#EC4899", "#14B8A6",
];

/// Colour for the series at `index`.
pub fn series_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Heatmap colour band of a combined score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatBand {
    Low,
    Mid,
    High,
}

impl HeatBand {
    /// Low below 6, Mid below 8, High otherwise.
    pub fn for_score(score: f64) -> Self {
        if score < 6.0 {
            HeatBand::Low
        } else if score < 8.0 {
            HeatBand::Mid
        } else {
            HeatBand::High
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            HeatBand::Low => "🔴",
            HeatBand::Mid => "🟡",
            HeatBand::High => "🟢",
        }
    }
}

impl fmt::Display for HeatBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeatBand::Low => write!(f, "Low"),
            HeatBand::Mid => write!(f, "Mid"),
            HeatBand::High => write!(f, "High"),
        }
    }
}
