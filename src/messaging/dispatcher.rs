use super::handler::{ChannelHandler, PropertyHandler};
use crate::types::{HANDLER_CHANNEL_CAPACITY, InboundMessage, WILDCARD_PROPERTY};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;

/// Registry of property handlers shared by the client and every component
/// that renders live values.
///
/// Registration may happen before or after messages start arriving; the
/// table is consulted fresh for every message.
///
/// # Example
///
/// ```
/// use liveprops::{InboundMessage, PropertyDispatcher};
///
/// let dispatcher = PropertyDispatcher::new();
/// dispatcher.register("status", |message: &InboundMessage| {
///     println!("status is now {:?}", message.value());
/// });
///
/// let message = InboundMessage::parse(r#"{"status":"Opened"}"#).unwrap();
/// assert!(dispatcher.dispatch(&message));
/// ```
#[derive(Default)]
pub struct PropertyDispatcher {
    handlers: RwLock<HashMap<String, Arc<dyn PropertyHandler>>>,
}

impl PropertyDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `property`, replacing any previous handler.
    ///
    /// `"*"` registers the wildcard handler. Empty names are ignored.
    pub fn register<H>(&self, property: impl Into<String>, handler: H)
    where
        H: PropertyHandler + 'static,
    {
        let property = property.into();
        if property.is_empty() {
            tracing::warn!("Ignoring handler registration with an empty property name");
            return;
        }

        tracing::debug!("Setting handler for property: {}", property);
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(property, Arc::new(handler));
    }

    /// Registers the fallback handler for properties with no handler of their own
    pub fn register_wildcard<H>(&self, handler: H)
    where
        H: PropertyHandler + 'static,
    {
        self.register(WILDCARD_PROPERTY, handler);
    }

    /// Registers a channel-backed handler and returns its receiving half.
    ///
    /// Updates are dropped with a warning while the channel is full.
    pub fn on(&self, property: impl Into<String>) -> mpsc::Receiver<InboundMessage> {
        let (tx, rx) = mpsc::channel(HANDLER_CHANNEL_CAPACITY);
        self.register(property, ChannelHandler::new(tx));
        rx
    }

    /// Routes `message` to the handler of its first property, falling back to
    /// the wildcard handler. Returns `true` if a handler ran.
    ///
    /// Messages nobody handles are dropped silently.
    pub fn dispatch(&self, message: &InboundMessage) -> bool {
        let Some(property) = message.property() else {
            tracing::debug!("Dropping message without a property");
            return false;
        };

        let handler = {
            let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
            handlers
                .get(property)
                .or_else(|| handlers.get(WILDCARD_PROPERTY))
                .cloned()
        };

        match handler {
            Some(handler) => {
                tracing::debug!("Dispatching property {}", property);
                handler.handle(message);
                true
            }
            None => {
                tracing::debug!("No handler for property {}, dropping", property);
                false
            }
        }
    }

    pub fn has_handler(&self, property: &str) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(property)
    }

    pub fn len(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<InboundMessage>>>, impl PropertyHandler + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler = move |message: &InboundMessage| sink.lock().unwrap().push(message.clone());
        (seen, handler)
    }

    #[test]
    fn test_exact_handler_receives_full_message() {
        let dispatcher = PropertyDispatcher::new();
        let (limit_seen, limit) = recorder();
        let (motion_seen, motion) = recorder();
        let (wildcard_seen, wildcard) = recorder();
        dispatcher.register("limit", limit);
        dispatcher.register("motion", motion);
        dispatcher.register_wildcard(wildcard);

        let message = InboundMessage::new("limit", json!("h2"));
        assert!(dispatcher.dispatch(&message));

        assert_eq!(*limit_seen.lock().unwrap(), vec![message]);
        assert!(motion_seen.lock().unwrap().is_empty());
        assert!(wildcard_seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_wildcard_handles_unregistered_property() {
        let dispatcher = PropertyDispatcher::new();
        let (wildcard_seen, wildcard) = recorder();
        dispatcher.register("*", wildcard);

        let message = InboundMessage::new("uband", json!("ON"));
        assert!(dispatcher.dispatch(&message));
        assert_eq!(*wildcard_seen.lock().unwrap(), vec![message]);
    }

    #[test]
    fn test_unhandled_message_is_dropped() {
        let dispatcher = PropertyDispatcher::new();
        let (seen, handler) = recorder();
        dispatcher.register("halogen", handler);

        assert!(!dispatcher.dispatch(&InboundMessage::new("uband", json!("OFF"))));
        assert!(!dispatcher.dispatch(&InboundMessage::parse("{}").unwrap()));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_late_registration_receives_resent_message() {
        let dispatcher = PropertyDispatcher::new();
        let message = InboundMessage::parse(r#"{"status":"Closed"}"#).unwrap();

        assert!(!dispatcher.dispatch(&message));

        let (seen, handler) = recorder();
        dispatcher.register("status", handler);
        assert!(dispatcher.dispatch(&message));

        assert_eq!(*seen.lock().unwrap(), vec![json_message("status", "Closed")]);
    }

    #[test]
    fn test_register_overwrites_previous_handler() {
        let dispatcher = PropertyDispatcher::new();
        let (first_seen, first) = recorder();
        let (second_seen, second) = recorder();
        dispatcher.register("status", first);
        dispatcher.register("status", second);

        dispatcher.dispatch(&InboundMessage::new("status", json!("Ajar")));

        assert_eq!(dispatcher.len(), 1);
        assert!(first_seen.lock().unwrap().is_empty());
        assert_eq!(second_seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_routes_on_first_key_only() {
        let dispatcher = PropertyDispatcher::new();
        let (status_seen, status) = recorder();
        let (limit_seen, limit) = recorder();
        dispatcher.register("status", status);
        dispatcher.register("limit", limit);

        let message = InboundMessage::parse(r#"{"limit":"s1","status":"Opened"}"#).unwrap();
        dispatcher.dispatch(&message);

        assert_eq!(*limit_seen.lock().unwrap(), vec![message]);
        assert!(status_seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_empty_property_name_is_ignored() {
        let dispatcher = PropertyDispatcher::new();
        let (_, handler) = recorder();
        dispatcher.register("", handler);
        assert!(dispatcher.is_empty());
    }

    #[tokio::test]
    async fn test_on_returns_receiver() {
        let dispatcher = PropertyDispatcher::new();
        let mut rx = dispatcher.on("motion");
        assert!(dispatcher.has_handler("motion"));

        let message = InboundMessage::new("motion", json!(true));
        assert!(dispatcher.dispatch(&message));
        assert_eq!(rx.recv().await, Some(message));
    }

    fn json_message(property: &str, value: &str) -> InboundMessage {
        InboundMessage::new(property, json!(value))
    }
}
