use crate::types::{LiveError, Result};
use crate::websocket::WsStream;
use futures::SinkExt;
use futures::stream::SplitSink;
use std::sync::Arc;
use tokio::sync::{RwLock, watch};
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
    /// The transport is unsupported; terminal
    Failed,
}

/// Owns the write half of the current socket and the connection state.
///
/// State changes are broadcast on a watch channel.
pub struct ConnectionManager {
    ws_write: Arc<RwLock<Option<SplitSink<WsStream, Message>>>>,
    state: Arc<RwLock<ConnectionState>>,
    state_tx: watch::Sender<ConnectionState>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Closed);
        Self {
            ws_write: Arc::new(RwLock::new(None)),
            state: Arc::new(RwLock::new(ConnectionState::Closed)),
            state_tx,
        }
    }

    /// Sets the WebSocket write sink (called after successful connection)
    pub async fn set_writer(&self, writer: SplitSink<WsStream, Message>) {
        let mut ws = self.ws_write.write().await;
        *ws = Some(writer);
    }

    /// Gets the current connection state
    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    /// Sets the connection state and notifies watchers
    pub async fn set_state(&self, new_state: ConnectionState) {
        let mut state = self.state.write().await;
        *state = new_state;
        self.state_tx.send_replace(new_state);
    }

    /// Moves Closed to Connecting in one step. Returns `false` when a
    /// connection is already in progress, open, or failed.
    pub async fn begin_connecting(&self) -> bool {
        let mut state = self.state.write().await;
        if *state != ConnectionState::Closed {
            return false;
        }
        *state = ConnectionState::Connecting;
        self.state_tx.send_replace(ConnectionState::Connecting);
        true
    }

    /// Checks if currently connected
    pub async fn is_connected(&self) -> bool {
        *self.state.read().await == ConnectionState::Open
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Sends a text frame through the WebSocket connection
    pub async fn send_text(&self, text: &str) -> Result<()> {
        let mut ws_guard = self.ws_write.write().await;
        let ws = ws_guard.as_mut().ok_or(LiveError::NotConnected)?;
        ws.send(Message::Text(text.into())).await?;
        Ok(())
    }

    /// Closes the WebSocket connection gracefully
    pub async fn close(&self) -> Result<()> {
        let mut ws_guard = self.ws_write.write().await;
        let result = match ws_guard.as_mut() {
            Some(ws) => ws.close().await,
            None => Ok(()),
        };
        *ws_guard = None;
        drop(ws_guard);

        self.set_state(ConnectionState::Closed).await;
        Ok(result?)
    }

    /// Discards the writer of a connection that is already gone
    pub async fn clear_writer(&self) {
        let mut ws = self.ws_write.write().await;
        *ws = None;
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
