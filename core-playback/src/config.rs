//! # Coordinator Configuration
//!
//! Tuning knobs for a [`PlaybackCoordinator`](crate::PlaybackCoordinator).

use bridge_traits::RepeatMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fastest accepted poll period. Anything quicker is wasted work on the
/// engine's main thread.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Slowest accepted poll period. Slower than this and the progress bar
/// visibly stutters.
pub const MAX_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Upper bound for [`CoordinatorConfig::settle_ticks`].
pub const MAX_SETTLE_TICKS: u32 = 100;

/// Coordinator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// How often the position is read from the engine while playing.
    ///
    /// Default: 200 ms (5 Hz).
    #[serde(default = "default_poll_interval")]
    pub poll_interval: Duration,

    /// Repeat mode requested from the engine on every playlist submission.
    ///
    /// Default: [`RepeatMode::All`].
    #[serde(default = "default_repeat_mode")]
    pub repeat_mode: RepeatMode,

    /// Publish [`PlaybackEvent`](core_runtime::PlaybackEvent)s on the event
    /// bus, when one is attached.
    ///
    /// Default: true.
    #[serde(default = "default_emit_bus_events")]
    pub emit_bus_events: bool,

    /// Poll ticks to wait, after the engine acknowledged a seek or a
    /// playlist load, for its status to show the result before engine
    /// state is trusted again anyway.
    ///
    /// Default: 10.
    #[serde(default = "default_settle_ticks")]
    pub settle_ticks: u32,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            repeat_mode: default_repeat_mode(),
            emit_bus_events: default_emit_bus_events(),
            settle_ticks: default_settle_ticks(),
        }
    }
}

impl CoordinatorConfig {
    /// Smooth progress for full-screen surfaces (10 Hz).
    pub fn responsive() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            ..Default::default()
        }
    }

    /// Coarse progress for small or background surfaces (2 Hz).
    pub fn battery_saver() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            ..Default::default()
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_repeat_mode(mut self, mode: RepeatMode) -> Self {
        self.repeat_mode = mode;
        self
    }

    pub fn with_bus_events(mut self, enabled: bool) -> Self {
        self.emit_bus_events = enabled;
        self
    }

    pub fn with_settle_ticks(mut self, ticks: u32) -> Self {
        self.settle_ticks = ticks;
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), String> {
        if self.poll_interval < MIN_POLL_INTERVAL {
            return Err(format!(
                "poll_interval must be at least {:?}, got {:?}",
                MIN_POLL_INTERVAL, self.poll_interval
            ));
        }

        if self.poll_interval > MAX_POLL_INTERVAL {
            return Err(format!(
                "poll_interval must be at most {:?}, got {:?}",
                MAX_POLL_INTERVAL, self.poll_interval
            ));
        }

        if self.settle_ticks == 0 || self.settle_ticks > MAX_SETTLE_TICKS {
            return Err(format!(
                "settle_ticks must be in 1..={}, got {}",
                MAX_SETTLE_TICKS, self.settle_ticks
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_poll_interval() -> Duration {
    Duration::from_millis(200)
}

fn default_repeat_mode() -> RepeatMode {
    RepeatMode::All
}

fn default_emit_bus_events() -> bool {
    true
}

fn default_settle_ticks() -> u32 {
    10
}
