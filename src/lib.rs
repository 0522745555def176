//! Previous-day and previous-week level tracking over live market data.
//!
//! The crate splits into three layers:
//! - [`levels`]: calendar window resolution and high/low/mid extraction
//!   over bar series.
//! - [`overlay`]: turns an evaluation into chart objects and diffs
//!   consecutive layouts into minimal draw commands.
//! - [`market`]: WebSocket kline streaming and REST history backfill.

pub mod config;
pub mod levels;
pub mod market;
pub mod overlay;

// Re-exports for convenience
pub use config::Config;
pub use levels::{BarSeries, Evaluation, LevelEngine, LevelSnapshot, Timeframe, TzSessionZone};
pub use market::{BarSubscription, BarUpdate, fetch_history, new_binance_client};
pub use overlay::{OverlayState, build_layout};
