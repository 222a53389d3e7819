//! Core service façade and bootstrap helpers.
//!
//! This crate wires the host-provided session bridge into the shared core:
//! it owns the event bus and the current catalog, and hands out one
//! [`PlaybackCoordinator`] per UI surface. Desktop apps and tests typically
//! enable the `desktop-shims` feature (which depends on `bridge-desktop`) and
//! start from [`bootstrap_desktop`]; Android hosts build a [`CoreConfig`]
//! around their `MediaController` bridge.

pub mod error;

pub use error::{CoreError, Result};

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use core_library::{Catalog, Track};
use core_playback::{CoordinatorConfig, PlaybackCoordinator};
use core_runtime::events::{CoreEvent, EventBus, LibraryEvent};
use core_runtime::logging::{init_logging, LoggingConfig};
use core_runtime::CoreConfig;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop::EngineHost;

/// Kind of UI surface a coordinator drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    /// Collapsed player docked under the track list.
    MiniPlayer,
    FullPlayer,
}

impl SurfaceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceKind::MiniPlayer => "mini_player",
            SurfaceKind::FullPlayer => "full_player",
        }
    }
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct ServiceInner {
    config: CoreConfig,
    coordinator_config: CoordinatorConfig,
    events: EventBus,
    catalog: RwLock<Arc<Catalog>>,
    next_surface: AtomicU64,
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    inner: Arc<ServiceInner>,
}

impl CoreService {
    /// Validates both configurations and creates the event bus.
    pub fn new(config: CoreConfig, coordinator_config: CoordinatorConfig) -> Result<Self> {
        config.validate()?;
        coordinator_config
            .validate()
            .map_err(CoreError::Config)?;

        info!(
            locator = %config.engine_locator,
            poll_ms = coordinator_config.poll_interval.as_millis() as u64,
            "core service ready"
        );

        Ok(Self {
            inner: Arc::new(ServiceInner {
                events: EventBus::new(config.event_buffer_size),
                config,
                coordinator_config,
                catalog: RwLock::new(Arc::new(Catalog::empty())),
                next_surface: AtomicU64::new(1),
            }),
        })
    }

    /// Installs the global tracing subscriber, mirroring logs into the
    /// configured [`LoggerSink`](bridge_traits::LoggerSink) unless `logging`
    /// already names one. Fails if a subscriber is already installed.
    pub fn init_logging(&self, logging: LoggingConfig) -> Result<()> {
        let logging = match (&logging.logger_sink, &self.inner.config.logger_sink) {
            (None, Some(sink)) => logging.with_logger_sink(Arc::clone(sink)),
            _ => logging,
        };
        init_logging(logging)?;
        Ok(())
    }

    pub fn config(&self) -> &CoreConfig {
        &self.inner.config
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.inner.events
    }

    /// Starts a coordinator for a new surface, connected to the configured
    /// engine. Must be called from within an async runtime.
    pub fn attach_surface(&self, kind: SurfaceKind) -> Result<PlaybackCoordinator> {
        let number = self.inner.next_surface.fetch_add(1, Ordering::SeqCst);
        let surface_id = format!("{kind}-{number}");
        debug!(surface = %surface_id, "attaching surface");

        let coordinator = PlaybackCoordinator::builder(Arc::clone(&self.inner.config.session_bridge))
            .locator(self.inner.config.engine_locator.clone())
            .config(self.inner.coordinator_config.clone())
            .event_bus(self.inner.events.clone())
            .surface_id(surface_id)
            .spawn()?;
        Ok(coordinator)
    }

    /// Replaces the catalog with `tracks`. Returns the number of tracks
    /// loaded; the previous catalog stays in place on error.
    pub fn load_catalog(&self, tracks: Vec<Track>) -> Result<usize> {
        let catalog = Catalog::new(tracks)?;
        let track_count = catalog.len();
        *self.inner.catalog.write() = Arc::new(catalog);

        info!(track_count, "catalog loaded");
        let _ = self
            .inner
            .events
            .emit(CoreEvent::Library(LibraryEvent::CatalogLoaded { track_count }));
        Ok(track_count)
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.inner.catalog.read())
    }

    /// Catalog tracks matching `query`; see [`Catalog::search`].
    pub fn search(&self, query: &str) -> Vec<Track> {
        let matches = self.catalog().search(query);
        let _ = self
            .inner
            .events
            .emit(CoreEvent::Library(LibraryEvent::Searched {
                query: query.to_string(),
                matches: matches.len(),
            }));
        matches
    }
}

impl fmt::Debug for CoreService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreService")
            .field("config", &self.inner.config)
            .field("tracks", &self.inner.catalog.read().len())
            .finish()
    }
}

/// Convenience bootstrapper for desktop hosts and tests.
///
/// Starts an in-process [`EngineHost`] and a service connected to it. The
/// host is returned so callers can register media durations and shut it
/// down.
///
/// ```
/// # #[cfg(feature = "desktop-shims")]
/// # fn example() -> core_service::Result<()> {
/// use core_service::bootstrap_desktop;
/// use core_playback::CoordinatorConfig;
///
/// let (core, host) = bootstrap_desktop(CoordinatorConfig::default())?;
/// assert!(host.is_running());
/// assert!(core.catalog().is_empty());
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_desktop(
    coordinator_config: CoordinatorConfig,
) -> Result<(CoreService, Arc<EngineHost>)> {
    let host = Arc::new(EngineHost::new());
    let config = CoreConfig::builder()
        .session_bridge(Arc::new(host.bridge()))
        .build()?;
    let service = CoreService::new(config, coordinator_config)?;
    Ok((service, host))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_desktop::EngineHost;
    use std::time::Duration;

    fn service() -> CoreService {
        let host = Arc::new(EngineHost::new());
        let config = CoreConfig::builder()
            .session_bridge(Arc::new(host.bridge()))
            .build()
            .unwrap();
        CoreService::new(config, CoordinatorConfig::default()).unwrap()
    }

    #[test]
    fn test_surface_kind_names() {
        assert_eq!(SurfaceKind::MiniPlayer.to_string(), "mini_player");
        assert_eq!(
            serde_json::to_string(&SurfaceKind::FullPlayer).unwrap(),
            r#""full_player""#
        );
    }

    #[test]
    fn test_invalid_coordinator_config_rejected() {
        let host = Arc::new(EngineHost::new());
        let config = CoreConfig::builder()
            .session_bridge(Arc::new(host.bridge()))
            .build()
            .unwrap();
        let err = CoreService::new(
            config,
            CoordinatorConfig::default().with_poll_interval(Duration::from_secs(5)),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_runtime_errors_convert() {
        let err: CoreError = core_runtime::Error::CapabilityMissing {
            capability: "SessionBridge".to_string(),
            message: "missing".to_string(),
        }
        .into();
        assert!(matches!(err, CoreError::CapabilityMissing { .. }));
    }

    #[test]
    fn test_load_catalog_replaces_tracks() {
        let core = service();
        let mut events = core.event_bus().subscribe();

        let loaded = core
            .load_catalog(vec![
                Track::new(2, "Track 10", "Nova", 1_000, "content://media/2"),
                Track::new(1, "Track 2", "Nova", 1_000, "content://media/1"),
            ])
            .unwrap();
        assert_eq!(loaded, 2);
        assert_eq!(core.catalog().tracks()[0].title, "Track 2");

        assert_eq!(
            events.try_recv().unwrap(),
            CoreEvent::Library(LibraryEvent::CatalogLoaded { track_count: 2 })
        );
    }

    #[test]
    fn test_failed_load_keeps_previous_catalog() {
        let core = service();
        core.load_catalog(vec![Track::new(1, "Keep", "A", 1_000, "content://media/1")])
            .unwrap();

        let err = core
            .load_catalog(vec![
                Track::new(5, "a", "A", 1, "content://media/5"),
                Track::new(5, "b", "B", 1, "content://media/5"),
            ])
            .unwrap_err();
        assert!(matches!(err, CoreError::Library(_)));
        assert_eq!(core.catalog().tracks()[0].title, "Keep");
    }

    #[test]
    fn test_search_emits_event() {
        let core = service();
        core.load_catalog(vec![Track::new(1, "Aurora", "Nova", 1_000, "content://media/1")])
            .unwrap();
        let mut events = core.event_bus().subscribe();

        assert_eq!(core.search("nova").len(), 1);
        assert_eq!(
            events.try_recv().unwrap(),
            CoreEvent::Library(LibraryEvent::Searched {
                query: "nova".to_string(),
                matches: 1
            })
        );
    }

    #[test]
    fn test_attach_surface_outside_runtime_fails() {
        let err = service().attach_surface(SurfaceKind::MiniPlayer).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Playback(core_playback::PlaybackError::NoRuntime(_))
        ));
    }
}
