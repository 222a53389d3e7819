//! # Core Configuration Module
//!
//! `CoreConfig` holds the platform capabilities and settings the playback
//! core needs. It is assembled with [`CoreConfigBuilder`], which refuses to
//! produce a config when a required capability is missing.
//!
//! ## Required Capabilities
//!
//! - `SessionBridge` - how coordinators reach the playback engine
//!
//! ## Optional Capabilities
//!
//! - `LoggerSink` - mirrors core logs into the host pipeline
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use bridge_traits::EngineLocator;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .session_bridge(Arc::new(MyMediaControllerBridge::new()))
//!     .engine_locator(EngineLocator::new("com.example.player/PlaybackService"))
//!     .event_buffer_size(64)
//!     .build()?;
//! ```
//!
//! Leaving out the bridge yields an actionable error:
//!
//! ```ignore
//! let err = CoreConfig::builder().build().unwrap_err();
//! // Capability missing: SessionBridge - ...
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{EngineLocator, LoggerSink, SessionBridge};
use std::sync::Arc;

/// Largest event buffer accepted. Anything above this is a configuration
/// mistake rather than a real need.
pub const MAX_EVENT_BUFFER_SIZE: usize = 10_000;

/// Core configuration for the playback core.
#[derive(Clone)]
pub struct CoreConfig {
    /// Bridge used by every coordinator to connect to the engine (required)
    pub session_bridge: Arc<dyn SessionBridge>,

    /// Which engine service coordinators connect to
    pub engine_locator: EngineLocator,

    /// Capacity of the event bus channel
    pub event_buffer_size: usize,

    /// Host log sink (optional)
    pub logger_sink: Option<Arc<dyn LoggerSink>>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("session_bridge", &"SessionBridge { ... }")
            .field("engine_locator", &self.engine_locator)
            .field("event_buffer_size", &self.event_buffer_size)
            .field(
                "logger_sink",
                &self.logger_sink.as_ref().map(|_| "LoggerSink { ... }"),
            )
            .finish()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Checks:
    /// - the engine locator is not blank
    /// - the event buffer size is within `1..=MAX_EVENT_BUFFER_SIZE`
    pub fn validate(&self) -> Result<()> {
        if self.engine_locator.as_str().trim().is_empty() {
            return Err(Error::Config("Engine locator cannot be empty".to_string()));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer_size > MAX_EVENT_BUFFER_SIZE {
            return Err(Error::Config(format!(
                "Event buffer size exceeds maximum of {}",
                MAX_EVENT_BUFFER_SIZE
            )));
        }

        Ok(())
    }
}

fn session_bridge_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "SessionBridge".to_string(),
        message: "A SessionBridge implementation is required to reach the playback engine. \
                  Android: wrap MediaController.Builder over the app's MediaSessionService. \
                  Desktop and tests: use bridge_desktop::EngineHost::bridge()."
            .to_string(),
    }
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    session_bridge: Option<Arc<dyn SessionBridge>>,
    engine_locator: Option<EngineLocator>,
    event_buffer_size: Option<usize>,
    logger_sink: Option<Arc<dyn LoggerSink>>,
}

impl CoreConfigBuilder {
    pub fn session_bridge(mut self, bridge: Arc<dyn SessionBridge>) -> Self {
        self.session_bridge = Some(bridge);
        self
    }

    /// Defaults to [`EngineLocator::default_service`].
    pub fn engine_locator(mut self, locator: EngineLocator) -> Self {
        self.engine_locator = Some(locator);
        self
    }

    /// Defaults to [`DEFAULT_EVENT_BUFFER_SIZE`].
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    pub fn logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logger_sink = Some(sink);
        self
    }

    /// Fails with [`Error::CapabilityMissing`] when no bridge was supplied and
    /// with [`Error::Config`] when validation fails.
    pub fn build(self) -> Result<CoreConfig> {
        let session_bridge = self
            .session_bridge
            .ok_or_else(session_bridge_missing_error)?;

        let config = CoreConfig {
            session_bridge,
            engine_locator: self.engine_locator.unwrap_or_default(),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            logger_sink: self.logger_sink,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_desktop::EngineHost;
    use bridge_traits::ConsoleLogger;

    fn bridge() -> Arc<dyn SessionBridge> {
        Arc::new(Arc::new(EngineHost::new()).bridge())
    }

    #[test]
    fn test_builder_requires_session_bridge() {
        let err = CoreConfig::builder().build().unwrap_err();
        match err {
            Error::CapabilityMissing { capability, message } => {
                assert_eq!(capability, "SessionBridge");
                assert!(message.contains("EngineHost"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_builder_defaults() {
        let config = CoreConfig::builder().session_bridge(bridge()).build().unwrap();
        assert_eq!(config.engine_locator, EngineLocator::default_service());
        assert_eq!(config.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
        assert!(config.logger_sink.is_none());
    }

    #[test]
    fn test_builder_with_all_fields() {
        let config = CoreConfig::builder()
            .session_bridge(bridge())
            .engine_locator(EngineLocator::new("com.example/PlaybackService"))
            .event_buffer_size(16)
            .logger_sink(Arc::new(ConsoleLogger::default()))
            .build()
            .unwrap();

        assert_eq!(config.engine_locator.as_str(), "com.example/PlaybackService");
        assert_eq!(config.event_buffer_size, 16);
        assert!(config.logger_sink.is_some());
    }

    #[test]
    fn test_validate_rejects_zero_buffer() {
        let err = CoreConfig::builder()
            .session_bridge(bridge())
            .event_buffer_size(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validate_rejects_excessive_buffer() {
        let err = CoreConfig::builder()
            .session_bridge(bridge())
            .event_buffer_size(MAX_EVENT_BUFFER_SIZE + 1)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validate_rejects_blank_locator() {
        let err = CoreConfig::builder()
            .session_bridge(bridge())
            .engine_locator(EngineLocator::new("  "))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Engine locator"));
    }

    #[test]
    fn test_config_debug_hides_bridges() {
        let config = CoreConfig::builder().session_bridge(bridge()).build().unwrap();
        let debug = format!("{config:?}");
        assert!(debug.contains("SessionBridge { ... }"));
        assert!(debug.contains("furka.playback"));
    }
}
