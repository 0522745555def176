//! Configuration loading and validation.

use std::fs;
use std::path::Path;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::levels::Timeframe;
use crate::overlay::objects::LinePattern;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("day start hour {0} is out of range 0-23")]
    StartHourOutOfRange(u32),

    #[error("unknown session zone '{0}'")]
    UnknownZone(String),
}

/// Top-level configuration. Every group and field has a default, so a
/// partial (or missing) file works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub levels: LevelsConfig,
    pub day: DayStyle,
    pub week: WeekStyle,
    pub anchor: AnchorStyle,
    pub display: DisplayConfig,
    pub symbol_format: SymbolFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            levels: LevelsConfig::default(),
            day: DayStyle::default(),
            week: WeekStyle::default(),
            anchor: AnchorStyle::default(),
            display: DisplayConfig::default(),
            symbol_format: SymbolFormat::default(),
        }
    }
}

impl Config {
    /// Loads and validates configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the value ranges serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels.day_start_hour > 23 {
            return Err(ConfigError::StartHourOutOfRange(self.levels.day_start_hour));
        }
        self.session_zone()?;
        Ok(())
    }

    /// Parses the configured session zone name.
    pub fn session_zone(&self) -> Result<Tz, ConfigError> {
        self.levels
            .session_zone
            .parse()
            .map_err(|_| ConfigError::UnknownZone(self.levels.session_zone.clone()))
    }
}

/// Live feed settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub symbol: String,
    /// Native display timeframe of the primary series.
    pub timeframe: Timeframe,
    /// Hourly bars fetched at startup; must cover at least one full week
    /// for the week fold to run.
    pub history_bars: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".to_string(),
            timeframe: Timeframe::M15,
            history_bars: 500,
        }
    }
}

/// Level computation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelsConfig {
    /// UTC hour the trading day is considered to start at (0-23).
    pub day_start_hour: u32,
    /// Zone whose midnight anchors the session open.
    pub session_zone: String,
    /// Log every computed snapshot at debug level.
    pub log_values: bool,
}

impl Default for LevelsConfig {
    fn default() -> Self {
        Self {
            day_start_hour: 0,
            session_zone: "America/New_York".to_string(),
            log_values: false,
        }
    }
}

/// Previous-day line styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayStyle {
    pub show_lines: bool,
    pub show_mid: bool,
    pub high_color: String,
    pub mid_color: String,
    pub low_color: String,
    pub thickness: u32,
    /// How many primary bars past "now" the lines project.
    pub extend_bars: u32,
    pub font_size: u32,
    pub marker_color: String,
}

impl Default for DayStyle {
    fn default() -> Self {
        Self {
            show_lines: true,
            show_mid: true,
            high_color: "Green".to_string(),
            mid_color: "Gray".to_string(),
            low_color: "Green".to_string(),
            thickness: 2,
            extend_bars: 10,
            font_size: 9,
            marker_color: "Blue".to_string(),
        }
    }
}

/// Previous-week line styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeekStyle {
    pub show_lines: bool,
    pub high_color: String,
    pub low_color: String,
    pub thickness: u32,
    pub extend_bars: u32,
    pub font_size: u32,
    pub marker_color: String,
}

impl Default for WeekStyle {
    fn default() -> Self {
        Self {
            show_lines: true,
            high_color: "Orange".to_string(),
            low_color: "Orange".to_string(),
            thickness: 2,
            extend_bars: 10,
            font_size: 9,
            marker_color: "DarkOrange".to_string(),
        }
    }
}

/// Session-open anchor line styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorStyle {
    pub show_line: bool,
    pub color: String,
    pub thickness: u32,
    pub pattern: LinePattern,
    pub extend_bars: u32,
    pub font_size: u32,
    /// Short on-chart label next to the line.
    pub label: String,
}

impl Default for AnchorStyle {
    fn default() -> Self {
        Self {
            show_line: true,
            color: "DodgerBlue".to_string(),
            thickness: 2,
            pattern: LinePattern::DotsRare,
            extend_bars: 10,
            font_size: 9,
            label: "0 NY".to_string(),
        }
    }
}

/// Extra overlay toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Vertical markers at window boundaries.
    pub show_window_markers: bool,
    /// Screen-corner text with ranges and prices.
    pub dashboard: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_window_markers: true,
            dashboard: true,
        }
    }
}

/// Price formatting of the traded symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolFormat {
    /// Decimal places when printing prices.
    pub digits: u32,
    /// Price increment of one pip, for range texts.
    pub pip_size: f64,
}

impl Default for SymbolFormat {
    fn default() -> Self {
        Self {
            digits: 5,
            pip_size: 0.0001,
        }
    }
}
