use crate::types::InboundMessage;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Receives every message routed to the property it is registered under.
///
/// Handlers run synchronously on the connection's read task, one message at
/// a time; a slow handler delays the messages behind it.
pub trait PropertyHandler: Send + Sync {
    fn handle(&self, message: &InboundMessage);
}

impl<F> PropertyHandler for F
where
    F: Fn(&InboundMessage) + Send + Sync,
{
    fn handle(&self, message: &InboundMessage) {
        self(message)
    }
}

/// Forwards messages into a bounded channel for consumers that prefer to
/// process updates on their own task.
pub struct ChannelHandler {
    sender: mpsc::Sender<InboundMessage>,
}

impl ChannelHandler {
    pub fn new(sender: mpsc::Sender<InboundMessage>) -> Self {
        Self { sender }
    }
}

impl PropertyHandler for ChannelHandler {
    fn handle(&self, message: &InboundMessage) {
        match self.sender.try_send(message.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                tracing::warn!(
                    "Handler channel full, dropping update for property {:?}",
                    dropped.property()
                );
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("Handler channel receiver dropped");
            }
        }
    }
}
