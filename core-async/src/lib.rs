//! Runtime abstraction layer for the Furka playback core.
//!
//! Every `core-*` and `bridge-*` crate spawns tasks, sleeps, ticks and
//! synchronises through this crate instead of naming tokio directly. Keeping
//! the executor behind one seam means a host that embeds the core (an Android
//! service, a desktop shell, a test harness) only has to agree with this crate
//! about which runtime is driving the futures.
//!
//! # Modules
//!
//! - `task`: task spawning
//! - `time`: sleep, intervals, timeouts, instants
//! - `sync`: channels, locks and cancellation
//! - `runtime`: blocking entry points used by the attribute macros
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//! use core_async::time::{sleep, Duration};
//!
//! async fn example() {
//!     let handle = task::spawn(async {
//!         sleep(Duration::from_millis(5)).await;
//!         42
//!     });
//!     assert_eq!(handle.await.unwrap(), 42);
//! }
//! ```

// Async entry-point/test macros so downstream crates never need tokio's.
pub use core_async_macros::{main, test};

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use futures::future;
pub use task::spawn;
pub use time::{sleep, Duration, Instant};

/// Waits on multiple branches, running the first one that completes.
///
/// Re-exported from tokio so that crates driving select loops (session
/// loops, poll loops) keep depending on `core-async` only.
pub use tokio::select;
