//! Generic WebSocket client for provider connections.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use tokio::sync::Mutex;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use crate::market::bar_update::{BarSubscription, BarUpdate};
use crate::market::error::FeedError;
use crate::market::feed_parser::FeedParser;

// WebSocketClient<P: FeedParser> is generic over the parser type, so all
// connection, channel and subscription handling is shared while each
// provider only implements FeedParser.

/// Generic WebSocket client that works with any provider.
/// Provider-specific logic comes from the FeedParser implementation.
pub struct WebSocketClient<P: FeedParser> {
    parser: Arc<P>,
    subscriptions: Vec<BarSubscription>,
    connected_at: Option<Instant>,
    is_connected: bool,
    ws_sender: Option<mpsc::Sender<String>>,
    update_sender: Option<mpsc::Sender<BarUpdate>>,
}

impl<P: FeedParser> WebSocketClient<P> {
    pub fn new(parser: P) -> Self {
        Self {
            parser: Arc::new(parser),
            subscriptions: Vec::new(),
            connected_at: None,
            is_connected: false,
            ws_sender: None,
            update_sender: None,
        }
    }

    /// Sets the channel that parsed bar updates are delivered on.
    pub fn set_update_sender(&mut self, sender: mpsc::Sender<BarUpdate>) {
        self.update_sender = Some(sender);
    }

    pub fn name(&self) -> &'static str {
        self.parser.name()
    }

    pub fn is_connected(&self) -> bool {
        self.is_connected
    }

    pub fn subscriptions(&self) -> &[BarSubscription] {
        &self.subscriptions
    }

    /// Checks if the connection needs refresh (approaching the 24h limit).
    pub fn needs_reconnect(&self) -> bool {
        if let Some(connected_at) = self.connected_at {
            let max_duration = Duration::from_secs(self.parser.max_connection_duration_secs());
            connected_at.elapsed() > max_duration
        } else {
            false
        }
    }

    /// Connects to the WebSocket endpoint.
    /// Spawns background tasks for message handling.
    /// Returns a receiver channel for bar updates.
    pub async fn connect(&mut self) -> Result<mpsc::Receiver<BarUpdate>, FeedError> {
        let endpoint = self.parser.endpoint();

        info!(provider = self.parser.name(), endpoint, "connecting");

        let (ws_stream, _response) = connect_async(endpoint).await?;
        let (write, read) = ws_stream.split();

        // Channel for sending messages TO the WebSocket
        let (ws_tx, mut ws_rx) = mpsc::channel::<String>(100);
        self.ws_sender = Some(ws_tx);

        // Channel for updates FROM the WebSocket
        let (update_tx, update_rx) = match self.update_sender.clone() {
            Some(tx) => (tx, None),
            None => {
                let (tx, rx) = mpsc::channel::<BarUpdate>(1000);
                self.update_sender = Some(tx.clone());
                (tx, Some(rx))
            }
        };

        self.is_connected = true;
        self.connected_at = Some(Instant::now());

        let parser = Arc::clone(&self.parser);

        // Task: handle outgoing messages (write to WebSocket)
        let write = Arc::new(Mutex::new(write));
        let write_clone = Arc::clone(&write);

        tokio::spawn(async move {
            let mut write = write_clone.lock().await;
            while let Some(msg) = ws_rx.recv().await {
                if let Err(error) = write.send(Message::Text(msg.into())).await {
                    error!(%error, "failed to send WebSocket message");
                    break;
                }
            }
        });

        // Task: handle incoming messages (read from WebSocket)
        tokio::spawn(async move {
            let mut read = read;
            while let Some(msg_result) = read.next().await {
                match msg_result {
                    Ok(Message::Text(text)) => {
                        // Parse and forward bar updates; control messages
                        // (subscription confirmations, etc.) are ignored
                        if let Some(update) = parser.parse_message(&text) {
                            if let Err(error) = update_tx.send(update).await {
                                error!(
                                    provider = parser.name(),
                                    %error,
                                    "failed to forward bar update"
                                );
                                break;
                            }
                        }
                    }
                    Ok(Message::Ping(_data)) => {
                        // Pong handled automatically by tungstenite
                        debug!(provider = parser.name(), "ping received");
                    }
                    Ok(Message::Pong(_)) => {
                        // Connection alive
                    }
                    Ok(Message::Close(frame)) => {
                        warn!(provider = parser.name(), ?frame, "connection closed");
                        break;
                    }
                    Ok(Message::Binary(_)) => {
                        // Binary messages not used for bar data
                    }
                    Err(error) => {
                        error!(provider = parser.name(), %error, "WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }
            debug!(provider = parser.name(), "read task ended");
        });

        info!(provider = self.parser.name(), "connected");

        Ok(update_rx.unwrap_or_else(|| {
            let (_tx, rx) = mpsc::channel(1);
            rx
        }))
    }

    pub async fn subscribe(&mut self, subscription: BarSubscription) -> Result<(), FeedError> {
        if !self.is_connected {
            return Err(FeedError::NotConnected);
        }

        // each provider has its own subscribe format
        let msg = self.parser.format_subscribe(&subscription);

        if let Some(sender) = &self.ws_sender {
            sender.send(msg).await.map_err(|_| FeedError::ChannelClosed)?;
            info!(provider = self.parser.name(), ?subscription, "subscribed");
            self.subscriptions.push(subscription);
        }

        Ok(())
    }

    pub async fn unsubscribe(&mut self, subscription: &BarSubscription) -> Result<(), FeedError> {
        if !self.is_connected {
            return Err(FeedError::NotConnected);
        }

        // each provider has its own unsubscribe format
        let msg = self.parser.format_unsubscribe(subscription);

        if let Some(sender) = &self.ws_sender {
            sender.send(msg).await.map_err(|_| FeedError::ChannelClosed)?;
            self.subscriptions.retain(|s| s != subscription);
            info!(provider = self.parser.name(), ?subscription, "unsubscribed");
        }

        Ok(())
    }

    pub async fn disconnect(&mut self) {
        self.ws_sender = None;
        self.is_connected = false;
        self.connected_at = None;
        info!(provider = self.parser.name(), "disconnected");
    }

    /// Reconnects and restores all subscriptions.
    pub async fn reconnect(&mut self) -> Result<(), FeedError> {
        info!(provider = self.parser.name(), "reconnecting");

        let subs = self.subscriptions.clone();

        self.disconnect().await;
        self.subscriptions.clear();
        self.connect().await?;

        // Restore subscriptions
        for subscription in subs {
            self.subscribe(subscription).await?;
        }

        info!(
            provider = self.parser.name(),
            restored = self.subscriptions.len(),
            "reconnected"
        );

        Ok(())
    }
}
