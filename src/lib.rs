//! Workspace placeholder crate.
//!
//! Host applications depend on `furka-workspace` and get the playback core
//! through the `desktop-shims` feature, which pulls in `core-service` together
//! with the in-process engine host from `bridge-desktop`.

#[cfg(feature = "desktop-shims")]
pub use core_service::*;
