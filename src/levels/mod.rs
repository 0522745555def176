//! Previous-day/week level computation over bar series.

pub mod aggregate;
pub mod anchor;
pub mod calendar;
pub mod engine;
pub mod series;
pub mod snapshot;
pub mod timeframe;

// Re-exports for convenience
pub use aggregate::{MIN_DAY_BARS, MIN_WEEK_BARS, day_levels, week_levels};
pub use anchor::{SessionZone, TzSessionZone, open_at_or_before, session_open};
pub use calendar::{CalendarWindow, resolve_day_window, resolve_week_window};
pub use engine::{Evaluation, LevelEngine, position_before};
pub use series::{Bar, BarSeries};
pub use snapshot::{LevelGroup, LevelSnapshot};
pub use timeframe::{ParseTimeframeError, Timeframe};
