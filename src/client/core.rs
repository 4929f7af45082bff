use super::{
    ClientState, ConnectionManager, ConnectionState, LiveClientBuilder, LiveClientOptions,
    Notifier, SessionIdentity,
};
use crate::messaging::{MessageRouter, PropertyDispatcher, PropertyHandler, RouteOutcome};
use crate::types::{LiveError, Result, UNSUPPORTED_TRANSPORT_NOTICE, heartbeat_reply};
use crate::websocket::{WebSocketFactory, WsStream};
use futures::stream::{SplitStream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use url::Url;

/// How a connection ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseKind {
    /// The close handshake happened
    Clean(u16),
    /// The socket went away without one
    Died(u16),
}

/// The live property client.
///
/// `LiveClient` keeps exactly one WebSocket open to `ws(s)://<host>/ws/<identity>`,
/// answers heartbeat probes, forwards every other message to its
/// [`PropertyDispatcher`], and reconnects after a fixed delay whenever the
/// connection drops.
///
/// # Example
///
/// ```no_run
/// use liveprops::{InboundMessage, LiveClient, LiveClientOptions};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = LiveClient::new("http://localhost:5096/", LiveClientOptions::default())?;
///
/// client.register("status", |message: &InboundMessage| {
///     println!("status: {:?}", message.value());
/// });
///
/// client.start().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LiveClient {
    pub(crate) page_url: Url,
    pub(crate) identity: SessionIdentity,
    pub(crate) retry_delay: Duration,
    pub(crate) notifier: Notifier,

    // Handler registry, shared with whoever registers handlers
    pub(crate) dispatcher: Arc<PropertyDispatcher>,

    // Connection manager
    pub(crate) connection: Arc<ConnectionManager>,

    // Consolidated mutable state
    pub(crate) state: Arc<RwLock<ClientState>>,
}

impl LiveClient {
    /// Creates a new LiveClient for the page at `page_url`.
    ///
    /// This does not connect; call [`start()`](Self::start) once handlers are
    /// in place. Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`LiveError::UrlParse`] if the page URL cannot be parsed.
    pub fn new(page_url: impl AsRef<str>, options: LiveClientOptions) -> Result<Self> {
        LiveClientBuilder::new(page_url, options).map(|builder| builder.build())
    }

    /// Opens the live connection.
    ///
    /// Idempotent: while a connection is being opened or is open, this does
    /// nothing. When the runtime cannot carry the transport the client moves
    /// to [`ConnectionState::Failed`], surfaces a notice, and never retries.
    ///
    /// If the handshake fails the error is returned and a reconnect is still
    /// scheduled, exactly as for a dropped connection.
    pub async fn start(&self) -> Result<()> {
        if !self.connection.begin_connecting().await {
            let state = self.connection.state().await;
            if state == ConnectionState::Failed {
                return Err(LiveError::Unsupported(
                    UNSUPPORTED_TRANSPORT_NOTICE.to_string(),
                ));
            }
            tracing::debug!("Connection already {:?}, ignoring start", state);
            return Ok(());
        }

        {
            let mut state = self.state.write().await;
            state.was_manual_disconnect = false;
            state.connection_attempts += 1;
        }

        let url = match self.endpoint_url() {
            Ok(url) => url,
            Err(e) => {
                tracing::error!("Cannot open live connection: {}", e);
                self.connection.set_state(ConnectionState::Failed).await;
                (self.notifier)(UNSUPPORTED_TRANSPORT_NOTICE);
                return Err(e);
            }
        };

        tracing::info!("Connecting to {}", url);
        let ws_stream = match WebSocketFactory::create(&url).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!("Web Socket error: {}", e);
                self.handle_close(CloseKind::Died(CloseCode::Abnormal.into()))
                    .await;
                return Err(e);
            }
        };

        let (write_half, read_half) = ws_stream.split();
        self.connection.set_writer(write_half).await;

        let mut state = self.state.write().await;
        if state.was_manual_disconnect {
            drop(state);
            tracing::info!("Disconnected while connecting, closing new connection");
            return self.connection.close().await;
        }

        self.connection.set_state(ConnectionState::Open).await;
        tracing::info!("Websocket is open");

        let client = self.clone();
        let router = MessageRouter::new(Arc::clone(&self.dispatcher));
        state.task_manager.spawn(async move {
            let close = client.read_frames(&router, read_half).await;
            client.handle_close(close).await;
        });

        Ok(())
    }

    /// Entry point of scheduled reconnects
    pub(crate) async fn reconnect(&self) {
        if self.state.read().await.was_manual_disconnect {
            tracing::info!("Manual disconnect detected, will not attempt to reconnect");
            return;
        }

        tracing::info!("Attempting to reconnect...");
        if let Err(e) = self.start().await {
            tracing::error!("Reconnection attempt failed: {}", e);
        }
    }

    /// Reads frames until the socket ends, in arrival order
    async fn read_frames(
        &self,
        router: &MessageRouter,
        mut read_half: SplitStream<WsStream>,
    ) -> CloseKind {
        let mut close_code = None;

        while let Some(msg_result) = read_half.next().await {
            match msg_result {
                Ok(Message::Text(text)) => self.handle_text(router, text.as_str()).await,
                Ok(Message::Close(frame)) => {
                    let code = frame.map_or(CloseCode::Status, |frame| frame.code);
                    close_code = Some(u16::from(code));
                }
                Ok(Message::Ping(data)) => {
                    tracing::debug!("Received ping ({} bytes)", data.len());
                }
                Ok(Message::Pong(data)) => {
                    tracing::debug!("Received pong ({} bytes)", data.len());
                }
                Ok(Message::Binary(data)) => {
                    tracing::warn!("Received unexpected binary message ({} bytes)", data.len());
                }
                Ok(Message::Frame(_)) => {
                    tracing::debug!("Received raw frame (internal)");
                }
                Err(e) => {
                    if close_code.is_none() {
                        tracing::error!("Web Socket error: {}", e);
                    }
                    break;
                }
            }
        }

        match close_code {
            Some(code) => CloseKind::Clean(code),
            None => CloseKind::Died(CloseCode::Abnormal.into()),
        }
    }

    async fn handle_text(&self, router: &MessageRouter, text: &str) {
        tracing::debug!("Received text message: {}", text);

        match router.route(text) {
            Ok(RouteOutcome::HeartbeatProbe) => {
                if let Err(e) = self.connection.send_text(&heartbeat_reply()).await {
                    tracing::warn!("Failed to answer heartbeat: {}", e);
                }
            }
            Ok(RouteOutcome::Dispatched | RouteOutcome::Dropped) => {}
            Err(e) => {
                tracing::error!("Failed to parse message: {} - Raw: {}", e, text);
            }
        }
    }

    /// Discards the dead connection; the reconnection watcher takes it from here
    async fn handle_close(&self, close: CloseKind) {
        match close {
            CloseKind::Clean(code) => {
                tracing::warn!("Web Socket connection closed cleanly, code={}", code);
            }
            CloseKind::Died(code) => {
                tracing::warn!("Web Socket connection died, code={}", code);
            }
        }

        self.connection.clear_writer().await;
        self.connection.set_state(ConnectionState::Closed).await;
    }

    /// Closes the connection and stops automatic reconnection.
    ///
    /// A reconnect already waiting on its delay still wakes up but does not
    /// connect. Call [`start()`](Self::start) to resume.
    pub async fn disconnect(&self) -> Result<()> {
        {
            let mut state = self.state.write().await;
            state.was_manual_disconnect = true;
            state.task_manager.abort_all();
        }

        match self.connection.state().await {
            ConnectionState::Closed | ConnectionState::Failed => Ok(()),
            ConnectionState::Connecting | ConnectionState::Open => {
                tracing::info!("Disconnecting from WebSocket server");
                self.connection.close().await?;
                tracing::info!("Disconnected from WebSocket server");
                Ok(())
            }
        }
    }

    /// Registers a property handler on the client's dispatcher
    pub fn register<H>(&self, property: impl Into<String>, handler: H)
    where
        H: PropertyHandler + 'static,
    {
        self.dispatcher.register(property, handler);
    }

    pub fn dispatcher(&self) -> &Arc<PropertyDispatcher> {
        &self.dispatcher
    }

    pub async fn state(&self) -> ConnectionState {
        self.connection.state().await
    }

    pub async fn is_connected(&self) -> bool {
        self.connection.is_connected().await
    }

    /// Watch every state transition
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.connection.subscribe()
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    pub fn page_url(&self) -> &Url {
        &self.page_url
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// The socket address every connection attempt targets
    pub fn endpoint_url(&self) -> Result<Url> {
        WebSocketFactory::endpoint_url(&self.page_url, &self.identity)
    }

    /// Transport attempts made so far, including failed handshakes
    pub async fn connection_attempts(&self) -> u64 {
        self.state.read().await.connection_attempts
    }
}
