use std::time::Duration;
use tokio::time::sleep;

/// Reconnect timer with a fixed delay.
///
/// Every attempt waits the same interval; there is no backoff growth and no
/// attempt cap.
#[derive(Debug, Clone)]
pub struct Timer {
    attempts: u32,
    delay: Duration,
}

impl Timer {
    pub fn new(delay: Duration) -> Self {
        Self { attempts: 0, delay }
    }

    /// Get the next delay duration
    pub fn next_delay(&mut self) -> Duration {
        self.attempts = self.attempts.saturating_add(1);
        self.delay
    }

    /// Number of delays handed out so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Reset the attempt counter
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    /// Sleep for the next delay
    pub async fn schedule_timeout(&mut self) {
        let delay = self.next_delay();
        sleep(delay).await;
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new(Duration::from_millis(crate::types::DEFAULT_RETRY_DELAY))
    }
}
