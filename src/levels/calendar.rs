//! Calendar windows for the previous trading day and week.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc, Weekday};

/// A span of whole days beginning at `start_hour` on `start_date` (UTC).
///
/// A non-zero `start_hour` means the span runs into the day after
/// `start_date + day_count - 1`; the hour-wrap in
/// [`BarSeries::bar_at_hour`](crate::levels::BarSeries::bar_at_hour)
/// covers that when iterating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarWindow {
    pub start_date: NaiveDate,
    pub day_count: u32,
    pub start_hour: u32,
}

impl CalendarWindow {
    /// Nominal UTC instant the window begins at.
    ///
    /// "Nominal" because the series may hold no bar at this instant;
    /// lookups against real data go through the series instead.
    pub fn start_instant(&self) -> DateTime<Utc> {
        let date = self.start_date + Duration::days(i64::from(self.start_hour / 24));
        date.and_hms_opt(self.start_hour % 24, 0, 0)
            .expect("hour is below 24 after wrap")
            .and_utc()
    }
}

/// Resolves the window of the previous trading day relative to `now`.
///
/// Starts one calendar day back. Before `start_hour` the current day has
/// not rolled over yet, so one more day is subtracted. On Sunday one
/// extra day and on Monday two extra days skip the weekend, landing on
/// the last weekday. The adjustments stack: early Monday hours reach
/// back to Thursday.
pub fn resolve_day_window(now: DateTime<Utc>, start_hour: u32) -> CalendarWindow {
    let mut gap_days = 1i64;
    if now.hour() < start_hour {
        gap_days += 1;
    }
    match now.weekday() {
        Weekday::Sun => gap_days += 1,
        Weekday::Mon => gap_days += 2,
        _ => {}
    }

    CalendarWindow {
        start_date: now.date_naive() - Duration::days(gap_days),
        day_count: 1,
        start_hour,
    }
}

/// Resolves the window of the previous Monday-to-Friday trading week.
///
/// Weekday index runs 0 for Sunday through 6 for Saturday. Monday through
/// Saturday land on the Monday of the prior week; Sunday subtracts a flat
/// seven days.
pub fn resolve_week_window(now: DateTime<Utc>) -> CalendarWindow {
    let weekday = i64::from(now.weekday().num_days_from_sunday());
    let days_back = if weekday == 0 { 7 } else { 7 + weekday - 1 };

    CalendarWindow {
        start_date: now.date_naive() - Duration::days(days_back),
        day_count: 5,
        start_hour: 0,
    }
}
