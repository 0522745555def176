//! Builds the desired overlay objects for one evaluation tick.
//!
//! The output is a pure value: a map from stable key to fully described
//! object. Feeding consecutive layouts to
//! [`OverlayState`](crate::overlay::OverlayState) turns them into
//! minimal draw commands.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::config::Config;
use crate::levels::{BarSeries, CalendarWindow, Evaluation, position_before};
use crate::overlay::dashboard::{price_lines, range_lines};
use crate::overlay::objects::{
    LinePattern, LineStyleSpec, ObjectGroup, ObjectKey, ObjectPart, OverlayObject, ScreenCorner,
    TextStyle,
};

/// Bars between a line's terminal edge and its label anchor.
const LABEL_OFFSET_BARS: usize = 5;

const RANGE_TEXT_COLOR: &str = "LightBlue";
const PRICE_TEXT_COLOR: &str = "SlateGray";

/// Window markers are thin dotted lines regardless of group styling.
const MARKER_THICKNESS: u32 = 1;

/// Shared geometry of one level group's lines.
struct LevelGeometry {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    label_at: DateTime<Utc>,
}

pub fn build_layout(
    evaluation: &Evaluation,
    primary: &BarSeries,
    hourly: &BarSeries,
    config: &Config,
) -> BTreeMap<ObjectKey, OverlayObject> {
    let mut objects = BTreeMap::new();

    if config.day.show_lines {
        day_group(&mut objects, evaluation, primary, hourly, config);
    }
    if config.week.show_lines {
        week_group(&mut objects, evaluation, primary, hourly, config);
    }
    if config.anchor.show_line {
        anchor_group(&mut objects, evaluation, primary, config);
    }
    if config.display.dashboard {
        dashboard_group(&mut objects, evaluation, config);
    }

    objects
}

fn day_group(
    objects: &mut BTreeMap<ObjectKey, OverlayObject>,
    evaluation: &Evaluation,
    primary: &BarSeries,
    hourly: &BarSeries,
    config: &Config,
) {
    let day = &config.day;
    let geometry = level_geometry(
        evaluation,
        primary,
        hourly,
        &evaluation.day_window,
        day.extend_bars,
    );

    if evaluation.snapshot.day.is_set() {
        if let Some(high) = evaluation.snapshot.day.high {
            insert_line_and_label(
                objects,
                ObjectGroup::Day,
                (ObjectPart::HighLine, ObjectPart::HighLabel),
                &geometry,
                high,
                "PDH",
                solid_style(&day.high_color, day.thickness),
                day.font_size,
            );
        }
        if let Some(low) = evaluation.snapshot.day.low {
            insert_line_and_label(
                objects,
                ObjectGroup::Day,
                (ObjectPart::LowLine, ObjectPart::LowLabel),
                &geometry,
                low,
                "PDL",
                solid_style(&day.low_color, day.thickness),
                day.font_size,
            );
        }
        if day.show_mid {
            if let Some(mid) = evaluation.snapshot.day.mid {
                let style = LineStyleSpec {
                    color: day.mid_color.clone(),
                    thickness: day.thickness,
                    pattern: LinePattern::DotsRare,
                };
                insert_line_and_label(
                    objects,
                    ObjectGroup::Day,
                    (ObjectPart::MidLine, ObjectPart::MidLabel),
                    &geometry,
                    mid,
                    "PDM",
                    style,
                    day.font_size,
                );
            }
        }
    }

    if config.display.show_window_markers {
        insert_markers(
            objects,
            ObjectGroup::Day,
            geometry.start,
            geometry.start + Duration::hours(23),
            &day.marker_color,
        );
    }
}

fn week_group(
    objects: &mut BTreeMap<ObjectKey, OverlayObject>,
    evaluation: &Evaluation,
    primary: &BarSeries,
    hourly: &BarSeries,
    config: &Config,
) {
    let week = &config.week;
    let geometry = level_geometry(
        evaluation,
        primary,
        hourly,
        &evaluation.week_window,
        week.extend_bars,
    );

    if evaluation.snapshot.week.is_set() {
        if let Some(high) = evaluation.snapshot.week.high {
            insert_line_and_label(
                objects,
                ObjectGroup::Week,
                (ObjectPart::HighLine, ObjectPart::HighLabel),
                &geometry,
                high,
                "PWH",
                solid_style(&week.high_color, week.thickness),
                week.font_size,
            );
        }
        if let Some(low) = evaluation.snapshot.week.low {
            insert_line_and_label(
                objects,
                ObjectGroup::Week,
                (ObjectPart::LowLine, ObjectPart::LowLabel),
                &geometry,
                low,
                "PWL",
                solid_style(&week.low_color, week.thickness),
                week.font_size,
            );
        }
    }

    if config.display.show_window_markers {
        insert_markers(
            objects,
            ObjectGroup::Week,
            geometry.start,
            geometry.start + Duration::days(5),
            &week.marker_color,
        );
    }
}

fn anchor_group(
    objects: &mut BTreeMap<ObjectKey, OverlayObject>,
    evaluation: &Evaluation,
    primary: &BarSeries,
    config: &Config,
) {
    let anchor = &config.anchor;
    let (instant, price) = match (evaluation.anchor_instant, evaluation.snapshot.session_open) {
        (Some(instant), Some(price)) => (instant, price),
        _ => return,
    };

    let end = extended_end(evaluation.now, primary, anchor.extend_bars);
    let label_at = position_before(primary, end, LABEL_OFFSET_BARS);

    objects.insert(
        ObjectKey::new(ObjectGroup::SessionOpen, ObjectPart::OpenLine),
        OverlayObject::Segment {
            start: instant,
            end,
            price,
            style: LineStyleSpec {
                color: anchor.color.clone(),
                thickness: anchor.thickness,
                pattern: anchor.pattern,
            },
        },
    );
    objects.insert(
        ObjectKey::new(ObjectGroup::SessionOpen, ObjectPart::OpenLabel),
        OverlayObject::Text {
            at: label_at,
            price,
            content: anchor.label.clone(),
            style: TextStyle {
                color: anchor.color.clone(),
                font_size: anchor.font_size,
            },
        },
    );
}

fn dashboard_group(
    objects: &mut BTreeMap<ObjectKey, OverlayObject>,
    evaluation: &Evaluation,
    config: &Config,
) {
    let ranges = range_lines(&evaluation.snapshot, &config.symbol_format);
    if !ranges.is_empty() {
        objects.insert(
            ObjectKey::new(ObjectGroup::Dashboard, ObjectPart::RangeText),
            OverlayObject::ScreenText {
                corner: ScreenCorner::BottomRight,
                content: ranges.join("\n"),
                color: RANGE_TEXT_COLOR.to_string(),
            },
        );
    }

    let prices = price_lines(&evaluation.snapshot, &config.symbol_format);
    if !prices.is_empty() {
        objects.insert(
            ObjectKey::new(ObjectGroup::Dashboard, ObjectPart::PriceText),
            OverlayObject::ScreenText {
                corner: ScreenCorner::BottomRight,
                content: prices.join("\n"),
                color: PRICE_TEXT_COLOR.to_string(),
            },
        );
    }
}

/// Line geometry for one group: start at the first in-window hourly bar
/// (nominal window start when no bar exists there), end `extend_bars`
/// primary bars past now, label backed off from the end.
fn level_geometry(
    evaluation: &Evaluation,
    primary: &BarSeries,
    hourly: &BarSeries,
    window: &CalendarWindow,
    extend_bars: u32,
) -> LevelGeometry {
    let start = window_open_instant(hourly, window);
    let end = extended_end(evaluation.now, primary, extend_bars);
    let label_at = position_before(primary, end, LABEL_OFFSET_BARS);

    LevelGeometry {
        start,
        end,
        label_at,
    }
}

/// Open time of the hourly bar at the window's first slot, falling back
/// to the nominal start instant when the series has no bar there.
fn window_open_instant(hourly: &BarSeries, window: &CalendarWindow) -> DateTime<Utc> {
    hourly
        .bar_at_hour(window.start_hour, window.start_date)
        .and_then(|index| hourly.get(index))
        .map(|bar| bar.get_open_time())
        .unwrap_or_else(|| window.start_instant())
}

fn extended_end(now: DateTime<Utc>, primary: &BarSeries, extend_bars: u32) -> DateTime<Utc> {
    let minutes = primary.timeframe().to_minutes() as i64 * i64::from(extend_bars);
    now + Duration::minutes(minutes)
}

fn solid_style(color: &str, thickness: u32) -> LineStyleSpec {
    LineStyleSpec {
        color: color.to_string(),
        thickness,
        pattern: LinePattern::Solid,
    }
}

fn insert_line_and_label(
    objects: &mut BTreeMap<ObjectKey, OverlayObject>,
    group: ObjectGroup,
    parts: (ObjectPart, ObjectPart),
    geometry: &LevelGeometry,
    price: f64,
    text: &str,
    style: LineStyleSpec,
    font_size: u32,
) {
    let (line_part, label_part) = parts;
    let label_style = TextStyle {
        color: style.color.clone(),
        font_size,
    };

    objects.insert(
        ObjectKey::new(group, line_part),
        OverlayObject::Segment {
            start: geometry.start,
            end: geometry.end,
            price,
            style,
        },
    );
    objects.insert(
        ObjectKey::new(group, label_part),
        OverlayObject::Text {
            at: geometry.label_at,
            price,
            content: text.to_string(),
            style: label_style,
        },
    );
}

fn insert_markers(
    objects: &mut BTreeMap<ObjectKey, OverlayObject>,
    group: ObjectGroup,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    color: &str,
) {
    let style = LineStyleSpec {
        color: color.to_string(),
        thickness: MARKER_THICKNESS,
        pattern: LinePattern::Dots,
    };

    objects.insert(
        ObjectKey::new(group, ObjectPart::WindowStart),
        OverlayObject::VerticalLine {
            at: start,
            style: style.clone(),
        },
    );
    objects.insert(
        ObjectKey::new(group, ObjectPart::WindowEnd),
        OverlayObject::VerticalLine { at: end, style },
    );
}
