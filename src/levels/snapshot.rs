//! Level values produced by one evaluation tick.

use serde::Serialize;

/// High/low (and, for the day group, mid) of one aggregation window.
///
/// `None` means no value could be computed for that bound. A group counts
/// as set only when both bounds are present; consumers must skip drawing
/// and range math otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelGroup {
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub mid: Option<f64>,
}

impl LevelGroup {
    pub fn unset() -> Self {
        Self {
            high: None,
            low: None,
            mid: None,
        }
    }

    /// True when both bounds were computed.
    pub fn is_set(&self) -> bool {
        self.high.is_some() && self.low.is_some()
    }

    /// High minus low, when both bounds are set.
    pub fn range(&self) -> Option<f64> {
        match (self.high, self.low) {
            (Some(high), Some(low)) => Some(high - low),
            _ => None,
        }
    }
}

/// The level values of one evaluation: previous-day group, previous-week
/// group (mid never populated), and the session-open anchor price.
///
/// Rebuilt whole on every tick; nothing is carried over or mutated in
/// place between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelSnapshot {
    pub day: LevelGroup,
    pub week: LevelGroup,
    pub session_open: Option<f64>,
}
