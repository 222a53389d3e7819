//! # Playback Error Types
//!
//! Errors surfaced by coordinator construction and connection waits.
//! Intents never return these: engine command failures are logged and
//! swallowed, and the snapshot keeps its last good value.

use bridge_traits::BridgeError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// The session with the engine is not (or no longer) established.
    #[error("Not connected to the playback engine: {0}")]
    NotConnected(String),

    /// The engine did not connect within the allotted time.
    #[error("Timed out after {0:?} waiting for the playback engine")]
    ConnectTimeout(Duration),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    #[error("Invalid coordinator configuration: {0}")]
    InvalidConfig(String),

    /// Coordinators spawn their session task and need a running executor.
    #[error("No async runtime available: {0}")]
    NoRuntime(String),

    // ========================================================================
    // Bridge Errors
    // ========================================================================
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("Internal playback error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, PlaybackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlaybackError::NotConnected("connect failed".to_string());
        assert_eq!(
            err.to_string(),
            "Not connected to the playback engine: connect failed"
        );

        let err = PlaybackError::ConnectTimeout(Duration::from_millis(250));
        assert!(err.to_string().contains("250ms"));
    }

    #[test]
    fn test_bridge_error_converts() {
        let err: PlaybackError = BridgeError::Disconnected("host stopped".to_string()).into();
        assert!(matches!(err, PlaybackError::Bridge(_)));
        assert!(err.to_string().contains("host stopped"));
    }
}
