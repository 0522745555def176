//! Bar (OHLCV) data structure and the append-only series the engine reads.

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use tracing::warn;

use crate::levels::timeframe::Timeframe;

/// A single price bar with its open time.
///
/// Open times are UTC instants. The hour/date lookups below work on the
/// UTC calendar, which is also the calendar the window resolvers use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    open_time: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl Bar {
    pub fn new(
        open_time: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        debug_assert!(high >= low, "bar high must be >= low");
        debug_assert!(open >= low && open <= high, "bar open must be within [low, high]");
        debug_assert!(close >= low && close <= high, "bar close must be within [low, high]");

        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn get_open_time(&self) -> DateTime<Utc> {
        self.open_time
    }

    pub fn get_open(&self) -> f64 {
        self.open
    }

    pub fn get_high(&self) -> f64 {
        self.high
    }

    pub fn get_low(&self) -> f64 {
        self.low
    }

    pub fn get_close(&self) -> f64 {
        self.close
    }

    pub fn get_volume(&self) -> f64 {
        self.volume
    }
}

/// An ordered, append-only series of bars at one fixed timeframe.
///
/// Bars are stored oldest to newest with strictly increasing open times.
/// The feed side mutates through [`BarSeries::apply`]; the level engine
/// only reads.
#[derive(Debug, Clone)]
pub struct BarSeries {
    timeframe: Timeframe,
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(timeframe: Timeframe) -> Self {
        Self {
            timeframe,
            bars: Vec::new(),
        }
    }

    /// Builds a series by applying bars in order (history backfill, tests).
    pub fn with_bars(timeframe: Timeframe, bars: impl IntoIterator<Item = Bar>) -> Self {
        let mut series = Self::new(timeframe);
        for bar in bars {
            series.apply(bar);
        }
        series
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Applies one feed update.
    ///
    /// A bar at the same open time as the newest stored bar replaces it
    /// (the forming bar updating in place); a newer open time appends.
    /// Older open times are dropped so the strictly-increasing invariant
    /// holds even against a misbehaving feed.
    pub fn apply(&mut self, bar: Bar) {
        match self.bars.last_mut() {
            None => self.bars.push(bar),
            Some(last) if bar.open_time == last.open_time => *last = bar,
            Some(last) if bar.open_time > last.open_time => self.bars.push(bar),
            Some(last) => {
                warn!(
                    timeframe = %self.timeframe,
                    latest = %last.open_time,
                    dropped = %bar.open_time,
                    "dropping out-of-order bar"
                );
            }
        }
    }

    /// Finds the bar whose open time falls on `hour` of `date` (UTC).
    ///
    /// An `hour` past 23 wraps into the following date(s) before the
    /// search, so callers iterating 24 hours from a non-zero start hour
    /// can pass `start_hour + i` directly. Scans newest to oldest and
    /// returns the first match; `None` means no data for that hour.
    pub fn bar_at_hour(&self, hour: u32, date: NaiveDate) -> Option<usize> {
        let date = date + Duration::days(i64::from(hour / 24));
        let hour = hour % 24;

        for i in (0..self.bars.len()).rev() {
            let open_time = self.bars[i].open_time;
            if open_time.hour() == hour && open_time.date_naive() == date {
                return Some(i);
            }
        }
        None
    }

    /// Finds the newest bar whose open time is at or before `instant`.
    ///
    /// `None` only when `instant` precedes every bar (cold start).
    pub fn last_at_or_before(&self, instant: DateTime<Utc>) -> Option<usize> {
        for i in (0..self.bars.len()).rev() {
            if self.bars[i].open_time <= instant {
                return Some(i);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn hourly_bar(open_time: DateTime<Utc>, high: f64, low: f64) -> Bar {
        Bar::new(open_time, low, high, low, high, 100.0)
    }

    fn sample_series() -> BarSeries {
        // Three hours of Jan 6 2025 (a Monday) plus the first hour of Jan 7.
        BarSeries::with_bars(
            Timeframe::H1,
            vec![
                hourly_bar(at(2025, 1, 6, 0), 1.05, 1.01),
                hourly_bar(at(2025, 1, 6, 1), 1.06, 1.02),
                hourly_bar(at(2025, 1, 6, 2), 1.07, 1.03),
                hourly_bar(at(2025, 1, 7, 1), 1.08, 1.04),
            ],
        )
    }

    #[test]
    fn test_apply_appends_in_order() {
        let series = sample_series();
        assert_eq!(series.len(), 4);
        assert_eq!(series.get(0).unwrap().get_open_time(), at(2025, 1, 6, 0));
        assert_eq!(series.last().unwrap().get_open_time(), at(2025, 1, 7, 1));
    }

    #[test]
    fn test_apply_replaces_forming_bar() {
        let mut series = sample_series();
        series.apply(hourly_bar(at(2025, 1, 7, 1), 1.20, 1.00));

        assert_eq!(series.len(), 4);
        assert_eq!(series.last().unwrap().get_high(), 1.20);
    }

    #[test]
    fn test_apply_drops_out_of_order_bar() {
        let mut series = sample_series();
        series.apply(hourly_bar(at(2025, 1, 6, 5), 1.09, 1.05));

        assert_eq!(series.len(), 4);
        assert_eq!(series.last().unwrap().get_open_time(), at(2025, 1, 7, 1));
    }

    #[test]
    fn test_bar_at_hour_match_and_miss() {
        let series = sample_series();
        let date = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();

        assert_eq!(series.bar_at_hour(2, date), Some(2));
        // Hour 3 has no bar (gap), hour 1 exists on both dates.
        assert_eq!(series.bar_at_hour(3, date), None);
        assert_eq!(series.bar_at_hour(1, date), Some(1));
    }

    #[test]
    fn test_bar_at_hour_wraps_past_midnight() {
        let series = sample_series();
        let date = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let next = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();

        // Hour 25 of Jan 6 is hour 1 of Jan 7.
        assert_eq!(series.bar_at_hour(25, date), series.bar_at_hour(1, next));
        assert_eq!(series.bar_at_hour(25, date), Some(3));
    }

    #[test]
    fn test_last_at_or_before() {
        let series = sample_series();

        // Exact open time.
        assert_eq!(series.last_at_or_before(at(2025, 1, 6, 1)), Some(1));
        // Inside the gap between the last two bars.
        assert_eq!(series.last_at_or_before(at(2025, 1, 6, 12)), Some(2));
        // After every bar.
        assert_eq!(series.last_at_or_before(at(2025, 2, 1, 0)), Some(3));
    }

    #[test]
    fn test_last_at_or_before_cold_start() {
        let series = sample_series();
        assert_eq!(series.last_at_or_before(at(2024, 12, 31, 23)), None);
    }
}
