use crate::infrastructure::TaskManager;

/// Consolidated mutable state for LiveClient
pub struct ClientState {
    /// Read task of the current connection
    pub task_manager: TaskManager,

    /// Whether the disconnect was manual (prevents auto-reconnect)
    pub was_manual_disconnect: bool,

    /// Transport attempts made so far, successful or not
    pub connection_attempts: u64,
}

impl ClientState {
    pub fn new() -> Self {
        Self {
            task_manager: TaskManager::new(),
            was_manual_disconnect: false,
            connection_attempts: 0,
        }
    }
}

impl Default for ClientState {
    fn default() -> Self {
        Self::new()
    }
}
