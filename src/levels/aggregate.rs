//! Extrema folds over calendar windows of hourly bars.

use chrono::Duration;

use crate::levels::calendar::CalendarWindow;
use crate::levels::series::BarSeries;
use crate::levels::snapshot::LevelGroup;

/// Minimum hourly history before the day fold runs (two full days).
pub const MIN_DAY_BARS: usize = 48;

/// Minimum hourly history before the week fold runs (one full week).
pub const MIN_WEEK_BARS: usize = 168;

/// Folds the previous-day window into high/mid/low.
///
/// Returns the unset group when the series holds fewer than
/// [`MIN_DAY_BARS`] bars, or when none of the window's 24 hour slots has
/// a bar. Mid is derived from the folded extrema.
pub fn day_levels(hourly: &BarSeries, window: &CalendarWindow) -> LevelGroup {
    if hourly.len() < MIN_DAY_BARS {
        return LevelGroup::unset();
    }

    let (high, low) = fold_window(hourly, window);
    let mid = match (high, low) {
        (Some(high), Some(low)) => Some(low + (high - low) / 2.0),
        _ => None,
    };

    LevelGroup { high, low, mid }
}

/// Folds the previous-week window (5 days, 120 hour slots) into
/// high/low. The week group carries no mid.
///
/// Returns the unset group when the series holds fewer than
/// [`MIN_WEEK_BARS`] bars.
pub fn week_levels(hourly: &BarSeries, window: &CalendarWindow) -> LevelGroup {
    if hourly.len() < MIN_WEEK_BARS {
        return LevelGroup::unset();
    }

    let (high, low) = fold_window(hourly, window);
    LevelGroup {
        high,
        low,
        mid: None,
    }
}

/// Visits every (hour, date) slot of the window and folds located bars
/// into running extrema. Hours with no bar (market closed, feed gap) are
/// skipped, not errors.
fn fold_window(series: &BarSeries, window: &CalendarWindow) -> (Option<f64>, Option<f64>) {
    let mut high: Option<f64> = None;
    let mut low: Option<f64> = None;

    for day in 0..window.day_count {
        let date = window.start_date + Duration::days(i64::from(day));
        for hour in 0..24 {
            let located = series
                .bar_at_hour(window.start_hour + hour, date)
                .and_then(|index| series.get(index));
            if let Some(bar) = located {
                high = Some(high.map_or(bar.get_high(), |h| h.max(bar.get_high())));
                low = Some(low.map_or(bar.get_low(), |l| l.min(bar.get_low())));
            }
        }
    }

    (high, low)
}
