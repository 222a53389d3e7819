//! Blocking entry points onto the async runtime.
//!
//! The attribute macros in `core-async-macros` expand to [`block_on`], so
//! tests and small binaries get a fresh current-thread runtime without
//! touching tokio's builder themselves.

pub use tokio::runtime::{Builder, Handle, Runtime};

/// Runs the provided future to completion on a current-thread runtime with
/// time and I/O drivers enabled.
pub fn block_on<F>(future: F) -> F::Output
where
    F: std::future::Future,
{
    Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("core_async::runtime::block_on: failed to build Tokio runtime")
        .block_on(future)
}

/// Returns `true` when called from inside a runtime context.
///
/// Constructors that spawn background work use this to fail fast with a
/// descriptive error instead of panicking inside `spawn`.
pub fn in_runtime() -> bool {
    Handle::try_current().is_ok()
}
