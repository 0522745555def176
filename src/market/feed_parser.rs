//! FeedParser trait for provider-specific message handling.

use crate::market::bar_update::{BarSubscription, BarUpdate};

// This trait is the key abstraction that makes WebSocketClient provider-agnostic.
// Each provider implements the following methods, WebSocketClient handles everything else.
// Adding a new provider = implement this trait, no changes to WebSocketClient.

/// Trait for provider-specific message parsing and formatting.
/// Implement this for each data source (Binance, Bybit, etc.)
pub trait FeedParser: Send + Sync + 'static {
    /// Returns the primary WebSocket endpoint URL.
    fn endpoint(&self) -> &str;

    /// Returns a fallback endpoint URL (if primary fails).
    fn fallback_endpoint(&self) -> Option<&str> {
        None
    }

    // Each provider has its own JSON formats for subscribe/unsubscribe
    fn format_subscribe(&self, subscription: &BarSubscription) -> String;
    fn format_unsubscribe(&self, subscription: &BarSubscription) -> String;

    /// Parses provider-specific JSON into a normalized BarUpdate.
    /// Returns Some for bar payloads, None for control messages.
    fn parse_message(&self, msg: &str) -> Option<BarUpdate>;

    fn name(&self) -> &'static str;

    /// Most providers cap connection lifetime near 24h. Default: 23 hours.
    fn max_connection_duration_secs(&self) -> u64 {
        23 * 60 * 60
    }
}
