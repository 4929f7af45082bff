// WebSocket module - Endpoint addressing and connection setup
pub mod factory;

pub use factory::{WebSocketFactory, WsStream};
