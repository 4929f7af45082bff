// Messaging module - Handler registry and frame routing
pub mod dispatcher;
pub mod handler;
pub mod router;

pub use dispatcher::PropertyDispatcher;
pub use handler::{ChannelHandler, PropertyHandler};
pub use router::{MessageRouter, RouteOutcome};
