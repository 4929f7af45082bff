/// Path prefix of the live socket; the session identity is appended as the last segment.
pub const WS_PATH_PREFIX: &str = "/ws";

/// Reserved property carrying server heartbeat probes
pub const HEARTBEAT_PROPERTY: &str = "heartbeat";

/// Value sent back under [`HEARTBEAT_PROPERTY`] for every probe
pub const HEARTBEAT_REPLY: &str = "pong";

/// Registry key of the fallback handler
pub const WILDCARD_PROPERTY: &str = "*";

/// Default delay before a reconnect attempt (milliseconds)
pub const DEFAULT_RETRY_DELAY: u64 = 1000;

/// Capacity of channels created by `PropertyDispatcher::on`
pub const HANDLER_CHANNEL_CAPACITY: usize = 100;

/// Notice surfaced when the runtime cannot open the transport
pub const UNSUPPORTED_TRANSPORT_NOTICE: &str = "Web Socket is not supported by this runtime";

/// Page URL schemes and the socket scheme each maps to
pub mod schemes {
    pub const HTTP: &str = "http";
    pub const HTTPS: &str = "https";
    pub const WS: &str = "ws";
    pub const WSS: &str = "wss";
}
