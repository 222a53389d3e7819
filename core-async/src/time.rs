//! Time primitives.
//!
//! `interval` plus [`MissedTickBehavior`] drive the position polling loop;
//! `timeout` bounds waits in tests and while waiting for a connection.

pub use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
pub use tokio::time::{
    interval, sleep, sleep_until, timeout, Interval, MissedTickBehavior, Sleep, Timeout,
};

/// Error returned by [`timeout`] when the deadline elapses first.
pub use tokio::time::error::Elapsed;

/// Creates an interval whose first tick fires after one full `period`
/// instead of immediately, skipping ticks that were missed while the
/// consumer was busy.
///
/// Polling loops use this so that a slow tick never causes a burst of
/// catch-up ticks afterwards.
pub fn steady_interval(period: Duration) -> Interval {
    let start = tokio::time::Instant::now() + period;
    let mut ticker = tokio::time::interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

/// Returns the current wall-clock time as milliseconds since `UNIX_EPOCH`.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
