//! Error types for the timer and the sync link

use thiserror::Error;

/// Errors returned by timer operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// Durations and cycle count cannot change while the countdown runs
    #[error("configuration is locked while the timer is running")]
    ConfigLocked,
    /// The controller task has stopped and no longer accepts commands
    #[error("timer controller is not running")]
    ControllerUnavailable,
}

/// Errors raised by the relay connection
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to connect to relay {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },
    #[error("failed to encode sync message: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode sync message: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("sync link is closed")]
    Closed,
}
