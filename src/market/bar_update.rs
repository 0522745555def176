//! Normalized feed payloads shared by all providers.

use crate::levels::{Bar, Timeframe};

/// A live bar from a provider, normalized across exchanges.
#[derive(Debug, Clone, PartialEq)]
pub struct BarUpdate {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub bar: Bar,
    /// False while the bar is still forming.
    pub is_closed: bool,
}

/// A kline stream subscription request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarSubscription {
    pub symbol: String,
    pub timeframe: Timeframe,
}

impl BarSubscription {
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
        }
    }
}
