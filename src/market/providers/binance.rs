//! Binance provider implementation.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::levels::{Bar, Timeframe};
use crate::market::bar_update::{BarSubscription, BarUpdate};
use crate::market::feed_parser::FeedParser;
use crate::market::websocket_client::WebSocketClient;

pub const BINANCE_WSS_BASE_ENDPOINT: &str = "wss://stream.binance.com:443/ws";
pub const BINANCE_WSS_FALLBACK_ENDPOINT: &str = "wss://stream.binance.com:9443/ws";
pub const BINANCE_REST_ENDPOINT: &str = "https://api.binance.com";

/// Binance-specific message parser.
/// Converts Binance kline JSON into normalized BarUpdate values.
#[derive(Debug, Clone)]
pub struct BinanceParser;

/// Envelope of a Binance kline stream event.
#[derive(Debug, Deserialize)]
struct KlineEvent {
    s: String,
    k: KlinePayload,
}

/// The nested "k" object carrying the bar itself. Prices arrive as
/// strings on this stream.
#[derive(Debug, Deserialize)]
struct KlinePayload {
    t: i64,
    i: String,
    o: String,
    h: String,
    l: String,
    c: String,
    v: String,
    x: bool,
}

impl BinanceParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_kline(&self, msg: &str) -> Option<BarUpdate> {
        let event: KlineEvent = match serde_json::from_str(msg) {
            Ok(event) => event,
            Err(error) => {
                warn!(provider = "Binance", %error, "malformed kline event");
                return None;
            }
        };

        let timeframe = match event.k.i.parse::<Timeframe>() {
            Ok(timeframe) => timeframe,
            Err(_) => {
                debug!(
                    provider = "Binance",
                    interval = %event.k.i,
                    "skipping unsupported interval"
                );
                return None;
            }
        };

        let open_time = DateTime::<Utc>::from_timestamp_millis(event.k.t)?;
        let open = event.k.o.parse::<f64>().ok()?;
        let high = event.k.h.parse::<f64>().ok()?;
        let low = event.k.l.parse::<f64>().ok()?;
        let close = event.k.c.parse::<f64>().ok()?;
        let volume = event.k.v.parse::<f64>().ok()?;

        Some(BarUpdate {
            symbol: event.s,
            timeframe,
            bar: Bar::new(open_time, open, high, low, close, volume),
            is_closed: event.k.x,
        })
    }
}

impl Default for BinanceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedParser for BinanceParser {
    fn endpoint(&self) -> &str {
        BINANCE_WSS_BASE_ENDPOINT
    }

    fn fallback_endpoint(&self) -> Option<&str> {
        Some(BINANCE_WSS_FALLBACK_ENDPOINT)
    }

    fn name(&self) -> &'static str {
        "Binance"
    }

    fn format_subscribe(&self, subscription: &BarSubscription) -> String {
        format!(
            r#"{{"method":"SUBSCRIBE","params":["{}"],"id":1}}"#,
            stream_name(subscription)
        )
    }

    fn format_unsubscribe(&self, subscription: &BarSubscription) -> String {
        format!(
            r#"{{"method":"UNSUBSCRIBE","params":["{}"],"id":1}}"#,
            stream_name(subscription)
        )
    }

    fn parse_message(&self, msg: &str) -> Option<BarUpdate> {
        // Kline events carry "e":"kline"; everything else is control traffic.
        if msg.contains(r#""e":"kline""#) {
            return self.parse_kline(msg);
        }

        None
    }
}

fn stream_name(subscription: &BarSubscription) -> String {
    format!(
        "{}@kline_{}",
        subscription.symbol.to_lowercase(),
        subscription.timeframe.as_str()
    )
}

pub type BinanceClient = WebSocketClient<BinanceParser>;

pub fn new_binance_client() -> BinanceClient {
    WebSocketClient::new(BinanceParser::new())
}
