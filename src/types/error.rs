use thiserror::Error;

/// Errors that can occur when using the live property client.
#[derive(Error, Debug)]
pub enum LiveError {
    /// WebSocket protocol error (handshake failed, invalid frame, etc.)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// General connection error with descriptive message
    #[error("Connection error: {0}")]
    Connection(String),

    /// The runtime cannot open the transport for this page (terminal)
    #[error("Transport unsupported: {0}")]
    Unsupported(String),

    /// Inbound frame decoded to JSON but not to a property message
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing error (malformed page URL)
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Attempted to send while no connection is open
    #[error("Not connected")]
    NotConnected,
}

/// Convenience type alias for `Result<T, LiveError>`.
pub type Result<T> = std::result::Result<T, LiveError>;
