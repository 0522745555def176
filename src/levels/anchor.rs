//! Session-open anchor: the bar in effect at a fixed zone's midnight.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::levels::series::BarSeries;

/// Conversion from a calendar date to the UTC instant of that date's
/// local midnight in one fixed zone.
///
/// The zone is injected rather than looked up by name inside the engine,
/// so it comes from configuration and tests can substitute deterministic
/// fixed-offset fakes.
pub trait SessionZone {
    /// UTC instant of local midnight on `date`, or `None` when that wall
    /// time does not exist in the zone (DST gap).
    fn midnight_utc(&self, date: NaiveDate) -> Option<DateTime<Utc>>;

    /// Zone name for logs.
    fn name(&self) -> &str;
}

/// [`SessionZone`] backed by a tz-database zone.
#[derive(Debug, Clone)]
pub struct TzSessionZone {
    zone: Tz,
}

impl TzSessionZone {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }
}

impl SessionZone for TzSessionZone {
    fn midnight_utc(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        let midnight = date.and_time(NaiveTime::MIN);
        match self.zone.from_local_datetime(&midnight) {
            LocalResult::Single(instant) => Some(instant.with_timezone(&Utc)),
            // The repeated hour when DST ends maps to the later,
            // standard-time instant.
            LocalResult::Ambiguous(_, latest) => Some(latest.with_timezone(&Utc)),
            LocalResult::None => None,
        }
    }

    fn name(&self) -> &str {
        self.zone.name()
    }
}

/// Open price of the newest bar at or before `instant`.
pub fn open_at_or_before(primary: &BarSeries, instant: DateTime<Utc>) -> Option<f64> {
    let index = primary.last_at_or_before(instant)?;
    primary.get(index).map(|bar| bar.get_open())
}

/// Open price of the primary-series bar in effect at the zone's midnight
/// on `date`.
///
/// `None` when midnight precedes all data (cold start) or does not exist
/// in the zone. Never substitutes a default price.
pub fn session_open<Z: SessionZone>(
    primary: &BarSeries,
    date: NaiveDate,
    zone: &Z,
) -> Option<f64> {
    let instant = zone.midnight_utc(date)?;
    open_at_or_before(primary, instant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::series::Bar;
    use crate::levels::timeframe::Timeframe;
    use chrono::Duration;
    use chrono_tz::America::New_York;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Fixed-offset fake: local midnight is `offset_hours` behind UTC.
    struct FixedOffsetZone {
        offset_hours: i64,
    }

    impl SessionZone for FixedOffsetZone {
        fn midnight_utc(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
            Some(date.and_time(NaiveTime::MIN).and_utc() + Duration::hours(self.offset_hours))
        }

        fn name(&self) -> &str {
            "fixed-offset"
        }
    }

    /// Fake for a zone whose midnight falls into a DST gap.
    struct GapZone;

    impl SessionZone for GapZone {
        fn midnight_utc(&self, _date: NaiveDate) -> Option<DateTime<Utc>> {
            None
        }

        fn name(&self) -> &str {
            "gap"
        }
    }

    fn quarter_hour_series(start: DateTime<Utc>, count: usize) -> BarSeries {
        let bars = (0..count).map(|i| {
            let open_time = start + Duration::minutes(15 * i as i64);
            let open = 100.0 + i as f64;
            Bar::new(open_time, open, open + 1.0, open - 1.0, open, 5.0)
        });
        BarSeries::with_bars(Timeframe::M15, bars)
    }

    #[test]
    fn test_new_york_midnight_in_winter() {
        // EST, UTC-5.
        let zone = TzSessionZone::new(New_York);
        assert_eq!(
            zone.midnight_utc(date(2025, 1, 15)),
            Some(Utc.with_ymd_and_hms(2025, 1, 15, 5, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_new_york_midnight_in_summer() {
        // EDT, UTC-4.
        let zone = TzSessionZone::new(New_York);
        assert_eq!(
            zone.midnight_utc(date(2025, 7, 15)),
            Some(Utc.with_ymd_and_hms(2025, 7, 15, 4, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_new_york_midnight_on_transition_days() {
        // The US transitions move clocks at 02:00 local, so midnight
        // itself stays unambiguous on both days.
        let zone = TzSessionZone::new(New_York);
        assert_eq!(
            zone.midnight_utc(date(2025, 3, 9)),
            Some(Utc.with_ymd_and_hms(2025, 3, 9, 5, 0, 0).unwrap())
        );
        assert_eq!(
            zone.midnight_utc(date(2025, 11, 2)),
            Some(Utc.with_ymd_and_hms(2025, 11, 2, 4, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_ambiguous_midnight_maps_to_later_instant() {
        // Azores summer time ends 2025-10-26 at 01:00 local, so midnight
        // occurs twice: 00:00Z (WEST, UTC+0) and 01:00Z (WET, UTC-1).
        let zone = TzSessionZone::new(chrono_tz::Atlantic::Azores);
        assert_eq!(
            zone.midnight_utc(date(2025, 10, 26)),
            Some(Utc.with_ymd_and_hms(2025, 10, 26, 1, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_skipped_midnight_is_none() {
        // Brazilian DST started 2018-11-04 by jumping 00:00 to 01:00
        // local, so midnight never existed that day.
        let zone = TzSessionZone::new(chrono_tz::America::Sao_Paulo);
        assert_eq!(zone.midnight_utc(date(2018, 11, 4)), None);
    }

    #[test]
    fn test_session_open_picks_bar_in_effect_at_midnight() {
        // Bars every 15 minutes from 04:30Z; NY midnight in winter is
        // 05:00Z, covered by the third bar (index 2).
        let series = quarter_hour_series(Utc.with_ymd_and_hms(2025, 1, 15, 4, 30, 0).unwrap(), 8);
        let zone = TzSessionZone::new(New_York);

        assert_eq!(session_open(&series, date(2025, 1, 15), &zone), Some(102.0));
    }

    #[test]
    fn test_session_open_with_fixed_offset_fake() {
        let series = quarter_hour_series(Utc.with_ymd_and_hms(2025, 1, 15, 1, 0, 0).unwrap(), 12);
        let zone = FixedOffsetZone { offset_hours: 2 };

        // Fake midnight at 02:00Z lands exactly on the fifth bar.
        assert_eq!(session_open(&series, date(2025, 1, 15), &zone), Some(104.0));
    }

    #[test]
    fn test_session_open_cold_start_is_unset() {
        // All bars open after the anchor instant.
        let series = quarter_hour_series(Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap(), 4);
        let zone = TzSessionZone::new(New_York);

        assert_eq!(session_open(&series, date(2025, 1, 15), &zone), None);
    }

    #[test]
    fn test_session_open_when_midnight_does_not_exist() {
        let series = quarter_hour_series(Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap(), 4);

        assert_eq!(session_open(&series, date(2025, 1, 15), &GapZone), None);
    }
}
