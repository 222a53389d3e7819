//! # Host Bridge Traits
//!
//! Contract between the playback core and the platform that hosts the
//! playback engine.
//!
//! ## Traits
//!
//! ### Engine Session
//! - [`SessionBridge`](session::SessionBridge) - Asynchronous connection to the engine service
//! - [`SessionHandle`](session::SessionHandle) - Commands and live status of a connected engine
//! - [`EngineListener`](session::EngineListener) - Push events from the engine
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation | Status |
//! |----------|----------------|--------|
//! | Desktop  | `bridge-desktop` (in-process engine host) | Available |
//! | Android  | `MediaController` over `MediaSessionService` | Host-provided |
//!
//! ## Fail-Fast Strategy
//!
//! The core refuses to start without a [`SessionBridge`](session::SessionBridge):
//!
//! ```ignore
//! let bridge = config.session_bridge
//!     .ok_or_else(|| Error::CapabilityMissing {
//!         capability: "SessionBridge".to_string(),
//!         message: "No session bridge provided.".to_string(),
//!     })?;
//! ```
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync`. Engines may deliver listener
//! events from any thread.

pub mod error;
pub mod session;
pub mod time;

pub use error::{BridgeError, Result};
pub use session::{
    EngineEvent, EngineEventKind, EngineItem, EngineListener, EngineLocator, EngineStatus,
    ItemMetadata, RepeatMode, SessionBridge, SessionHandle, Subscription,
};
pub use time::{Clock, ConsoleLogger, LogEntry, LogLevel, LoggerSink, ManualClock, SystemClock};

#[cfg(any(test, feature = "mocks"))]
pub use session::MockEngineListener;
