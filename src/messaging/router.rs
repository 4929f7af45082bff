use super::PropertyDispatcher;
use crate::types::{InboundMessage, Result};
use std::sync::Arc;

/// What the router did with an inbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Heartbeat probe; the caller owes the server a reply
    HeartbeatProbe,
    /// A property handler ran
    Dispatched,
    /// No handler matched
    Dropped,
}

/// Turns raw text frames into dispatches, intercepting heartbeat probes
pub struct MessageRouter {
    dispatcher: Arc<PropertyDispatcher>,
}

impl MessageRouter {
    pub fn new(dispatcher: Arc<PropertyDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Routes a text frame. Heartbeat probes never reach a handler.
    pub fn route(&self, text: &str) -> Result<RouteOutcome> {
        let message = InboundMessage::parse(text)?;
        Ok(self.route_message(&message))
    }

    pub fn route_message(&self, message: &InboundMessage) -> RouteOutcome {
        if message.is_heartbeat_probe() {
            tracing::debug!("Received heartbeat probe");
            return RouteOutcome::HeartbeatProbe;
        }

        if self.dispatcher.dispatch(message) {
            RouteOutcome::Dispatched
        } else {
            RouteOutcome::Dropped
        }
    }
}
