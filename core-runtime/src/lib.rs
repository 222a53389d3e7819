//! # Core Runtime Module
//!
//! Foundational infrastructure shared by the playback core:
//! - Logging and tracing setup
//! - Configuration with fail-fast capability checks
//! - Event bus for decoupled notifications

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{Error, Result};
pub use events::{CoreEvent, EventBus, EventStream, LibraryEvent, PlaybackEvent};
