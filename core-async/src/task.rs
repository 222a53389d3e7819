//! Task spawning.
//!
//! Thin wrappers over `tokio::task` so that the session loop of a
//! coordinator and the clock of a simulated engine are spawned the same way
//! everywhere.

pub use tokio::task::{yield_now, AbortHandle, JoinError, JoinHandle};

/// Spawns a new asynchronous task on the current runtime.
///
/// The task may run on a different worker thread, so both the future and its
/// output must be `Send + 'static`.
///
/// # Panics
///
/// Panics when called outside of a runtime context; check
/// [`crate::runtime::in_runtime`] first when that is possible.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

/// Result type for task operations.
pub type Result<T> = std::result::Result<T, JoinError>;
