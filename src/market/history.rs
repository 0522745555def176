//! Historical kline backfill over the Binance REST API.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::levels::{Bar, BarSeries, Timeframe};
use crate::market::error::FeedError;
use crate::market::providers::binance::BINANCE_REST_ENDPOINT;

/// Binance caps klines requests at 1000 rows.
const MAX_KLINES_PER_REQUEST: u32 = 1000;

/// One row from GET /api/v3/klines: a positional array of open time,
/// OHLCV strings and assorted trailing fields.
#[derive(Debug, Deserialize)]
struct KlineRow(
    i64,    // Open time
    String, // Open
    String, // High
    String, // Low
    String, // Close
    String, // Volume
    i64,    // Close time
    String, // Quote asset volume
    i64,    // Number of trades
    String, // Taker buy base asset volume
    String, // Taker buy quote asset volume
    String, // Ignore
);

impl KlineRow {
    fn to_bar(&self) -> Option<Bar> {
        let open_time = DateTime::<Utc>::from_timestamp_millis(self.0)?;
        let open = self.1.parse::<f64>().ok()?;
        let high = self.2.parse::<f64>().ok()?;
        let low = self.3.parse::<f64>().ok()?;
        let close = self.4.parse::<f64>().ok()?;
        let volume = self.5.parse::<f64>().ok()?;

        Some(Bar::new(open_time, open, high, low, close, volume))
    }
}

/// Fetches up to `limit` most recent klines and seeds a series with them.
pub async fn fetch_history(
    symbol: &str,
    timeframe: Timeframe,
    limit: u32,
) -> Result<BarSeries, FeedError> {
    let url = format!(
        "{}/api/v3/klines?symbol={}&interval={}&limit={}",
        BINANCE_REST_ENDPOINT,
        symbol.to_uppercase(),
        timeframe.as_str(),
        limit.min(MAX_KLINES_PER_REQUEST)
    );

    debug!(%url, "requesting kline history");

    let rows: Vec<KlineRow> = reqwest::get(&url).await?.json().await?;

    let mut series = BarSeries::new(timeframe);
    for row in &rows {
        match row.to_bar() {
            Some(bar) => series.apply(bar),
            None => warn!(symbol, "skipping malformed kline row"),
        }
    }

    debug!(
        symbol,
        interval = timeframe.as_str(),
        bars = series.len(),
        "history loaded"
    );

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_kline_row_to_bar() {
        let json = r#"[1638747660000,"50000.00","50200.00","49900.00","50100.00","100.5",1638747719999,"5025000.0",100,"50.0","2500000.0","0"]"#;

        let row: KlineRow = serde_json::from_str(json).unwrap();
        let bar = row.to_bar().unwrap();

        assert_eq!(
            bar.get_open_time(),
            Utc.timestamp_millis_opt(1638747660000).unwrap()
        );
        assert_eq!(bar.get_open(), 50000.00);
        assert_eq!(bar.get_high(), 50200.00);
        assert_eq!(bar.get_low(), 49900.00);
        assert_eq!(bar.get_close(), 50100.00);
        assert_eq!(bar.get_volume(), 100.5);
    }

    #[test]
    fn test_kline_row_rejects_bad_price() {
        let json = r#"[1638747660000,"garbage","50200.00","49900.00","50100.00","100.5",1638747719999,"5025000.0",100,"50.0","2500000.0","0"]"#;

        let row: KlineRow = serde_json::from_str(json).unwrap();
        assert!(row.to_bar().is_none());
    }

    #[test]
    fn test_kline_response_deserializes_as_rows() {
        let json = r#"[
            [1638747660000,"50000.00","50200.00","49900.00","50100.00","100.5",1638747719999,"5025000.0",100,"50.0","2500000.0","0"],
            [1638747720000,"50100.00","50300.00","50000.00","50200.00","90.0",1638747779999,"4518000.0",90,"45.0","2259000.0","0"]
        ]"#;

        let rows: Vec<KlineRow> = serde_json::from_str(json).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].to_bar().unwrap().get_close(), 50200.00);
    }
}
