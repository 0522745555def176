//! Diagnostic text blocks: ranges in pips and formatted level prices.

use crate::config::SymbolFormat;
use crate::levels::LevelSnapshot;

/// One range line per set group, in pips ("Day Range: 71.5 pips").
///
/// Unset groups contribute nothing; there is never a placeholder line.
pub fn range_lines(snapshot: &LevelSnapshot, format: &SymbolFormat) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(range) = snapshot.day.range() {
        lines.push(format!("Day Range: {:.1} pips", range / format.pip_size));
    }
    if let Some(range) = snapshot.week.range() {
        lines.push(format!("Week Range: {:.1} pips", range / format.pip_size));
    }

    lines
}

/// One price line per set level, at the configured decimal precision.
pub fn price_lines(snapshot: &LevelSnapshot, format: &SymbolFormat) -> Vec<String> {
    let prec = format.digits as usize;
    let mut lines = Vec::new();

    if let (Some(high), Some(low)) = (snapshot.day.high, snapshot.day.low) {
        lines.push(format!("Prev Day H: {:.prec$}", high, prec = prec));
        if let Some(mid) = snapshot.day.mid {
            lines.push(format!("Prev Day M: {:.prec$}", mid, prec = prec));
        }
        lines.push(format!("Prev Day L: {:.prec$}", low, prec = prec));
    }

    if let (Some(high), Some(low)) = (snapshot.week.high, snapshot.week.low) {
        lines.push(format!("Prev Week H: {:.prec$}", high, prec = prec));
        lines.push(format!("Prev Week L: {:.prec$}", low, prec = prec));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::LevelGroup;

    fn fx_format() -> SymbolFormat {
        SymbolFormat {
            digits: 5,
            pip_size: 0.0001,
        }
    }

    fn full_snapshot() -> LevelSnapshot {
        LevelSnapshot {
            day: LevelGroup {
                high: Some(1.1080),
                low: Some(1.0990),
                mid: Some(1.1035),
            },
            week: LevelGroup {
                high: Some(1.1200),
                low: Some(1.0900),
                mid: None,
            },
            session_open: Some(1.1010),
        }
    }

    #[test]
    fn test_range_lines_in_pips() {
        let lines = range_lines(&full_snapshot(), &fx_format());
        assert_eq!(lines, vec!["Day Range: 90.0 pips", "Week Range: 300.0 pips"]);
    }

    #[test]
    fn test_price_lines_formatting() {
        let lines = price_lines(&full_snapshot(), &fx_format());
        assert_eq!(
            lines,
            vec![
                "Prev Day H: 1.10800",
                "Prev Day M: 1.10350",
                "Prev Day L: 1.09900",
                "Prev Week H: 1.12000",
                "Prev Week L: 1.09000",
            ]
        );
    }

    #[test]
    fn test_unset_groups_are_omitted() {
        let snapshot = LevelSnapshot {
            day: LevelGroup::unset(),
            week: LevelGroup {
                high: Some(1.1200),
                low: Some(1.0900),
                mid: None,
            },
            session_open: None,
        };

        assert_eq!(range_lines(&snapshot, &fx_format()), vec!["Week Range: 300.0 pips"]);
        assert_eq!(
            price_lines(&snapshot, &fx_format()),
            vec!["Prev Week H: 1.12000", "Prev Week L: 1.09000"]
        );
    }

    #[test]
    fn test_everything_unset_yields_no_lines() {
        let snapshot = LevelSnapshot {
            day: LevelGroup::unset(),
            week: LevelGroup::unset(),
            session_open: None,
        };

        assert!(range_lines(&snapshot, &fx_format()).is_empty());
        assert!(price_lines(&snapshot, &fx_format()).is_empty());
    }

    #[test]
    fn test_coarse_symbol_formatting() {
        let format = SymbolFormat {
            digits: 2,
            pip_size: 1.0,
        };
        let snapshot = LevelSnapshot {
            day: LevelGroup {
                high: Some(97_450.0),
                low: Some(96_100.0),
                mid: Some(96_775.0),
            },
            week: LevelGroup::unset(),
            session_open: None,
        };

        assert_eq!(range_lines(&snapshot, &format), vec!["Day Range: 1350.0 pips"]);
        assert_eq!(price_lines(&snapshot, &format)[0], "Prev Day H: 97450.00");
    }
}
