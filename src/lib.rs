//! # liveprops
//!
//! A live property client: one self-healing WebSocket to `ws(s)://<host>/ws/<identity>`,
//! automatic replies to server heartbeat probes, and per-property dispatch of
//! every other message to registered handlers.
//!
//! ## Example
//!
//! ```no_run
//! use liveprops::{InboundMessage, LiveClient, LiveClientOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = LiveClient::new("http://localhost:5096/", LiveClientOptions::default())?;
//!
//!     client.register("status", |message: &InboundMessage| {
//!         println!("status: {:?}", message.value());
//!     });
//!     client.register("*", |message: &InboundMessage| {
//!         println!("unhandled update: {:?}", message);
//!     });
//!
//!     client.start().await?;
//!     tokio::signal::ctrl_c().await?;
//!     client.disconnect().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod infrastructure;
pub mod messaging;
pub mod types;
pub mod websocket;

pub use client::{
    ConnectionState, LiveClient, LiveClientBuilder, LiveClientOptions, SessionIdentity,
};
pub use messaging::{ChannelHandler, MessageRouter, PropertyDispatcher, PropertyHandler};
pub use types::{InboundMessage, LiveError, Result};
