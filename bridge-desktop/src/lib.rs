//! # Desktop Bridge Implementations
//!
//! In-process stand-ins for the platform side of the playback session, used
//! by desktop builds and by test suites.
//!
//! - [`EngineHost`] owns long-lived engines, one per locator, the way a media
//!   service would on a phone.
//! - [`SimulatedEngine`] is a clock-driven engine with playlist, repeat and
//!   seek semantics.
//! - [`LocalSessionBridge`] connects controllers to the host, with a
//!   configurable [`ConnectBehavior`].
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{EngineHost, LocalSessionBridge};
//! use std::sync::Arc;
//!
//! let host = Arc::new(EngineHost::new());
//! let bridge = Arc::new(LocalSessionBridge::new(host.clone()));
//! // Hand `bridge` to CoreConfig::builder().session_bridge(bridge)
//! ```

mod engine;
mod host;

pub use engine::{SimulatedEngine, RESTART_THRESHOLD_MS};
pub use host::{ConnectBehavior, EngineHost, LocalSessionBridge};
