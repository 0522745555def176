//! Feed error types.

use thiserror::Error;

/// Errors surfaced by the live feed and the history backfill.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("WebSocket transport failed: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("history request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("client is not connected")]
    NotConnected,

    #[error("outbound message queue is closed")]
    ChannelClosed,
}
