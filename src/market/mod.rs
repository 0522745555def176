//! Market data module for provider connections.

pub mod bar_update;
pub mod error;
pub mod feed_parser;
pub mod history;
pub mod providers;
pub mod websocket_client;

// Re-exports for convenience
pub use bar_update::{BarSubscription, BarUpdate};
pub use error::FeedError;
pub use feed_parser::FeedParser;
pub use history::fetch_history;
pub use websocket_client::WebSocketClient;

// Re-export provider convenience functions
pub use providers::binance::new_binance_client;
