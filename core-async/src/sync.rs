//! Synchronisation primitives.
//!
//! Async-aware channels and locks from `tokio::sync`, plus the cancellation
//! token from `tokio-util` that ties background loops to the lifetime of
//! their owner.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::{watch, CancellationToken};
//!
//! let (tx, rx) = watch::channel(0_u32);
//! tx.send_replace(7);
//! assert_eq!(*rx.borrow(), 7);
//!
//! let token = CancellationToken::new();
//! let child = token.child_token();
//! token.cancel();
//! assert!(child.is_cancelled());
//! ```

pub use tokio::sync::{
    broadcast, mpsc, oneshot, watch, Mutex, MutexGuard, Notify, RwLock, RwLockReadGuard,
    RwLockWriteGuard, Semaphore,
};

pub use tokio_util::sync::{CancellationToken, DropGuard, WaitForCancellationFuture};
