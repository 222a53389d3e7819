//! Observable playback state for one UI surface.

use core_library::Track;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Smallest duration ever reported, so `position / duration` stays defined.
pub const MIN_DURATION_MS: f64 = 1.0;

/// Read-only view of playback that a surface renders.
///
/// Replaced wholesale on every change and shared through a watch channel;
/// the playlist is behind an `Arc` so clones stay cheap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackStateSnapshot {
    pub is_playing: bool,
    pub position_ms: f64,
    /// Never below [`MIN_DURATION_MS`]
    pub duration_ms: f64,
    pub current_track: Option<Track>,
    /// Last playlist submitted from this surface
    pub playlist: Arc<[Track]>,
    /// Item count reported by the engine
    pub playlist_size: usize,
}

impl Default for PlaybackStateSnapshot {
    fn default() -> Self {
        Self {
            is_playing: false,
            position_ms: 0.0,
            duration_ms: MIN_DURATION_MS,
            current_track: None,
            playlist: Arc::from(Vec::new()),
            playlist_size: 0,
        }
    }
}

impl PlaybackStateSnapshot {
    /// Fraction of the track played, in `[0, 1]`. Drives the slider.
    pub fn progress(&self) -> f64 {
        (self.position_ms / self.duration_ms.max(MIN_DURATION_MS)).clamp(0.0, 1.0)
    }

    pub fn current_track_id(&self) -> Option<&str> {
        self.current_track.as_ref().map(|track| track.id.as_str())
    }
}

/// Clamps an engine-reported duration to [`MIN_DURATION_MS`].
pub fn safe_duration(duration_ms: i64) -> f64 {
    (duration_ms as f64).max(MIN_DURATION_MS)
}

/// Lifecycle of a coordinator's engine session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot() {
        let snapshot = PlaybackStateSnapshot::default();
        assert!(!snapshot.is_playing);
        assert_eq!(snapshot.duration_ms, MIN_DURATION_MS);
        assert!(snapshot.current_track.is_none());
        assert!(snapshot.playlist.is_empty());
        assert_eq!(snapshot.progress(), 0.0);
    }

    #[test]
    fn test_safe_duration() {
        assert_eq!(safe_duration(0), 1.0);
        assert_eq!(safe_duration(-9_223), 1.0);
        assert_eq!(safe_duration(180_000), 180_000.0);
    }

    #[test]
    fn test_progress_is_clamped() {
        let snapshot = PlaybackStateSnapshot {
            position_ms: 50_000.0,
            duration_ms: 200_000.0,
            ..Default::default()
        };
        assert_eq!(snapshot.progress(), 0.25);

        let overshoot = PlaybackStateSnapshot {
            position_ms: 300.0,
            duration_ms: 200.0,
            ..Default::default()
        };
        assert_eq!(overshoot.progress(), 1.0);
    }

    #[test]
    fn test_connection_state_serialization() {
        let json = serde_json::to_string(&ConnectionState::Disconnected).unwrap();
        assert_eq!(json, r#""disconnected""#);
        assert_eq!(ConnectionState::Connected.to_string(), "connected");
    }
}
