//! One-tick orchestration: resolve windows, fold extrema, anchor the
//! session open.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::levels::aggregate::{day_levels, week_levels};
use crate::levels::anchor::{SessionZone, open_at_or_before};
use crate::levels::calendar::{CalendarWindow, resolve_day_window, resolve_week_window};
use crate::levels::series::BarSeries;
use crate::levels::snapshot::LevelSnapshot;

/// Everything one evaluation produced: the snapshot plus the resolved
/// windows and anchor instant, so display collaborators can build
/// geometry without re-deriving them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub now: DateTime<Utc>,
    pub snapshot: LevelSnapshot,
    pub day_window: CalendarWindow,
    pub week_window: CalendarWindow,
    pub anchor_instant: Option<DateTime<Utc>>,
}

/// Computes a fresh [`LevelSnapshot`] per tick from the two input series.
///
/// The engine holds configuration only. Each call to
/// [`LevelEngine::evaluate`] is a pure function of `now` and the series
/// contents, so re-running it without new bars reproduces the previous
/// result exactly.
pub struct LevelEngine<Z: SessionZone> {
    day_start_hour: u32,
    session_zone: Z,
    log_values: bool,
}

impl<Z: SessionZone> LevelEngine<Z> {
    pub fn new(day_start_hour: u32, session_zone: Z) -> Self {
        debug_assert!(day_start_hour <= 23, "day start hour must be 0-23");

        Self {
            day_start_hour,
            session_zone,
            log_values: false,
        }
    }

    /// Enables debug logging of every computed snapshot.
    pub fn with_value_logging(mut self, enabled: bool) -> Self {
        self.log_values = enabled;
        self
    }

    pub fn day_start_hour(&self) -> u32 {
        self.day_start_hour
    }

    /// Runs one evaluation tick.
    ///
    /// `primary` is the native display-timeframe series (anchors the
    /// session open); `hourly` feeds the day/week extrema folds.
    pub fn evaluate(
        &self,
        now: DateTime<Utc>,
        primary: &BarSeries,
        hourly: &BarSeries,
    ) -> Evaluation {
        let day_window = resolve_day_window(now, self.day_start_hour);
        let week_window = resolve_week_window(now);

        let day = day_levels(hourly, &day_window);
        let week = week_levels(hourly, &week_window);

        let anchor_instant = self.session_zone.midnight_utc(now.date_naive());
        let session_open = anchor_instant.and_then(|instant| open_at_or_before(primary, instant));

        let snapshot = LevelSnapshot {
            day,
            week,
            session_open,
        };

        if self.log_values {
            debug!(
                day_high = ?snapshot.day.high,
                day_mid = ?snapshot.day.mid,
                day_low = ?snapshot.day.low,
                week_high = ?snapshot.week.high,
                week_low = ?snapshot.week.low,
                session_open = ?snapshot.session_open,
                zone = self.session_zone.name(),
                "levels evaluated"
            );
        }

        Evaluation {
            now,
            snapshot,
            day_window,
            week_window,
            anchor_instant,
        }
    }
}

/// Open time of the bar `bars_back` positions before the newest bar at
/// or before `end`.
///
/// Keeps on-chart labels clear of a line's terminal edge. When the
/// series is too short to walk back that far, falls back to an
/// arithmetic offset of `bars_back` timeframe periods before `end`.
pub fn position_before(series: &BarSeries, end: DateTime<Utc>, bars_back: usize) -> DateTime<Utc> {
    if let Some(index) = series.last_at_or_before(end) {
        if index >= bars_back {
            if let Some(bar) = series.get(index - bars_back) {
                return bar.get_open_time();
            }
        }
    }

    let minutes = series.timeframe().to_minutes() as i64 * bars_back as i64;
    end - Duration::minutes(minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::series::Bar;
    use crate::levels::timeframe::Timeframe;
    use crate::levels::TzSessionZone;
    use chrono::{NaiveDate, TimeZone};
    use chrono_tz::America::New_York;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn flat_bars(start: DateTime<Utc>, count: usize, high: f64, low: f64) -> Vec<Bar> {
        (0..count)
            .map(|i| {
                let open_time = start + Duration::hours(i as i64);
                Bar::new(open_time, low, high, low, high, 10.0)
            })
            .collect()
    }

    fn reprice(bars: &mut [Bar], index: usize, high: f64, low: f64) {
        bars[index] = Bar::new(bars[index].get_open_time(), low, high, low, high, 10.0);
    }

    /// Hourly bars from Wed Jan 1 2025 up to Jan 8 12:00, with known
    /// extremes planted in the previous day (Jan 7) and previous week
    /// (Dec 30 - Jan 3, partially covered from Jan 1).
    fn hourly_fixture() -> BarSeries {
        let mut bars = flat_bars(at(2025, 1, 1, 0), 180, 1.1020, 1.1010);
        let jan7 = 6 * 24;
        reprice(&mut bars, jan7 + 10, 1.1080, 1.1040);
        reprice(&mut bars, jan7 + 16, 1.1020, 1.0990);
        reprice(&mut bars, 24 + 5, 1.1200, 1.1010); // Jan 2 05:00
        reprice(&mut bars, 2 * 24 + 20, 1.1020, 1.0900); // Jan 3 20:00
        BarSeries::with_bars(Timeframe::H1, bars)
    }

    /// Quarter-hour primary bars surrounding the NY midnight of Jan 8
    /// (05:00Z in winter), opens numbered from 200.
    fn primary_fixture() -> BarSeries {
        let bars = (0..40).map(|i| {
            let open_time = at(2025, 1, 8, 4) + Duration::minutes(15 * i as i64);
            let open = 200.0 + i as f64;
            Bar::new(open_time, open, open + 1.0, open - 1.0, open, 5.0)
        });
        BarSeries::with_bars(Timeframe::M15, bars)
    }

    #[test]
    fn test_evaluate_full_snapshot() {
        let engine = LevelEngine::new(0, TzSessionZone::new(New_York));
        let evaluation = engine.evaluate(at(2025, 1, 8, 12), &primary_fixture(), &hourly_fixture());

        assert_eq!(evaluation.day_window.start_date, date(2025, 1, 7));
        assert_eq!(evaluation.week_window.start_date, date(2024, 12, 30));

        let snapshot = evaluation.snapshot;
        assert_eq!(snapshot.day.high, Some(1.1080));
        assert_eq!(snapshot.day.low, Some(1.0990));
        assert!((snapshot.day.mid.unwrap() - 1.1035).abs() < 1e-9);
        assert_eq!(snapshot.week.high, Some(1.1200));
        assert_eq!(snapshot.week.low, Some(1.0900));
        assert!(snapshot.week.mid.is_none());

        // NY midnight on Jan 8 is 05:00Z, the fifth primary bar.
        assert_eq!(evaluation.anchor_instant, Some(at(2025, 1, 8, 5)));
        assert_eq!(snapshot.session_open, Some(204.0));
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let engine = LevelEngine::new(0, TzSessionZone::new(New_York)).with_value_logging(true);
        let primary = primary_fixture();
        let hourly = hourly_fixture();

        let first = engine.evaluate(at(2025, 1, 8, 12), &primary, &hourly);
        let second = engine.evaluate(at(2025, 1, 8, 12), &primary, &hourly);

        assert_eq!(first, second);
    }

    #[test]
    fn test_evaluate_degrades_groups_independently() {
        // 100 hourly bars: enough for the day fold, short of the week's
        // 168-bar minimum.
        let start = at(2025, 1, 4, 0);
        let series = BarSeries::with_bars(Timeframe::H1, flat_bars(start, 100, 1.1020, 1.1010));
        let engine = LevelEngine::new(0, TzSessionZone::new(New_York));

        let evaluation = engine.evaluate(at(2025, 1, 8, 6), &series, &series);
        assert!(evaluation.snapshot.day.is_set());
        assert!(!evaluation.snapshot.week.is_set());
    }

    #[test]
    fn test_position_before_walks_back_by_index() {
        let primary = primary_fixture();
        let end = at(2025, 1, 8, 4) + Duration::minutes(15 * 20);

        // Bar 20 opens exactly at `end`; five bars back is bar 15.
        let expected = at(2025, 1, 8, 4) + Duration::minutes(15 * 15);
        assert_eq!(position_before(&primary, end, 5), expected);
    }

    #[test]
    fn test_position_before_falls_back_to_minutes() {
        // Only three bars before the end instant: an hourly series falls
        // back to 60 minutes per bar.
        let series = BarSeries::with_bars(Timeframe::H1, flat_bars(at(2025, 1, 8, 0), 3, 1.1, 1.0));
        let end = at(2025, 1, 8, 2);

        assert_eq!(position_before(&series, end, 5), end - Duration::minutes(300));
    }
}
