// Module declarations
mod builder;
mod connection;
mod core;
mod identity;
mod state;

// Public API exports
pub use builder::{LiveClientBuilder, LiveClientOptions, Notifier};
pub use connection::{ConnectionManager, ConnectionState};
pub use self::core::LiveClient;
pub use identity::SessionIdentity;
pub use state::ClientState;
