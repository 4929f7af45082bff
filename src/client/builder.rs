use super::{ClientState, ConnectionManager, ConnectionState, LiveClient, SessionIdentity};
use crate::infrastructure::Timer;
use crate::messaging::PropertyDispatcher;
use crate::types::{DEFAULT_RETRY_DELAY, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;

/// Surfaces a blocking, user-facing notice (the transport-unsupported case)
pub type Notifier = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Debug, Clone, Default)]
pub struct LiveClientOptions {
    /// Fixed delay before each reconnect attempt, in milliseconds. Default: 1000.
    pub retry_delay: Option<u64>,
    /// Session identity used in the socket path. Default: current epoch millis.
    pub identity: Option<String>,
}

/// Builder for LiveClient that handles initialization
pub struct LiveClientBuilder {
    page_url: Url,
    options: LiveClientOptions,
    dispatcher: Option<Arc<PropertyDispatcher>>,
    notifier: Option<Notifier>,
}

impl LiveClientBuilder {
    /// Create a new builder for the page at `page_url`
    pub fn new(page_url: impl AsRef<str>, options: LiveClientOptions) -> Result<Self> {
        let page_url = Url::parse(page_url.as_ref())?;

        Ok(Self {
            page_url,
            options,
            dispatcher: None,
            notifier: None,
        })
    }

    /// Share a dispatcher that other components already register handlers on
    pub fn with_dispatcher(mut self, dispatcher: Arc<PropertyDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Replace the default notice (an error log plus a line on stderr)
    pub fn with_notifier<F>(mut self, notifier: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.notifier = Some(Arc::new(notifier));
        self
    }

    /// Build the client and spawn the reconnection watcher.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> LiveClient {
        let identity = self
            .options
            .identity
            .map(SessionIdentity::from)
            .unwrap_or_else(SessionIdentity::generate);
        let retry_delay =
            Duration::from_millis(self.options.retry_delay.unwrap_or(DEFAULT_RETRY_DELAY));

        let client = LiveClient {
            page_url: self.page_url,
            identity,
            retry_delay,
            notifier: self
                .notifier
                .unwrap_or_else(|| Arc::new(default_notice) as Notifier),
            dispatcher: self.dispatcher.unwrap_or_default(),
            connection: Arc::new(ConnectionManager::new()),
            state: Arc::new(RwLock::new(ClientState::new())),
        };

        // One reconnect per observed close, after the fixed delay
        let client_for_watcher = client.clone();
        let mut rx = client.connection.subscribe();
        tokio::spawn(async move {
            let mut timer = Timer::new(client_for_watcher.retry_delay);

            while rx.changed().await.is_ok() {
                let state = *rx.borrow_and_update();
                match state {
                    ConnectionState::Open => timer.reset(),
                    ConnectionState::Closed => {
                        if client_for_watcher.state.read().await.was_manual_disconnect {
                            continue;
                        }

                        tracing::info!(
                            "Reconnecting in {:?} (attempt {})",
                            client_for_watcher.retry_delay,
                            timer.attempts() + 1
                        );
                        timer.schedule_timeout().await;
                        client_for_watcher.reconnect().await;
                    }
                    ConnectionState::Connecting | ConnectionState::Failed => {}
                }
            }
            tracing::info!("Reconnection watcher task finished");
        });

        client
    }
}

fn default_notice(notice: &str) {
    tracing::error!("{}", notice);
    eprintln!("{}", notice);
}
