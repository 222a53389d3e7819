//! Session bridge traits and the types that cross the engine boundary.
//!
//! The playback engine lives in a long-lived, host-managed service (on
//! Android a `MediaSessionService`) and keeps playing while UI surfaces come
//! and go. A UI-side controller reaches it in two steps:
//!
//! 1. [`SessionBridge::connect`] resolves asynchronously to a
//!    [`SessionHandle`]. Resolution may take arbitrarily long.
//! 2. The handle issues commands (load, play, seek, skip) and registers
//!    [`EngineListener`]s that receive an [`EngineEvent`] on every change.
//!
//! Tracks are serialised into [`EngineItem`]s before they cross the
//! boundary. Items only carry an identifier, a content locator and display
//! metadata, so anything richer (duration, album, size) has to be recovered
//! on the controller side from its own lookup table.

use crate::error::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Name of the engine service a bridge should connect to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngineLocator(String);

impl EngineLocator {
    /// Locator of the application's own playback service.
    pub const DEFAULT_SERVICE: &'static str = "furka.playback";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn default_service() -> Self {
        Self::new(Self::DEFAULT_SERVICE)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EngineLocator {
    fn default() -> Self {
        Self::default_service()
    }
}

impl fmt::Display for EngineLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display metadata attached to an [`EngineItem`].
///
/// This is what a system notification or lock screen can render without
/// asking the app for anything else.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    /// Artwork locator, surfaced to notifications.
    pub artwork: Option<String>,
    pub is_playable: bool,
}

/// Serialised, metadata-lossy form of a track handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineItem {
    /// Opaque identifier echoed back by the engine in its events.
    pub id: String,
    /// Locator of the playable content (content URI, file path).
    pub locator: String,
    pub metadata: ItemMetadata,
}

impl EngineItem {
    pub fn new(id: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            locator: locator.into(),
            metadata: ItemMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: ItemMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Repeat behaviour of the engine's playlist cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop after the last item.
    #[default]
    Off,
    /// Loop the current item.
    One,
    /// Wrap around to the first item after the last one.
    All,
}

/// Live engine state as seen through a handle.
///
/// Durations and positions are signed: engines report "unknown" as zero or a
/// negative sentinel, and consumers are expected to clamp.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineStatus {
    pub is_playing: bool,
    pub position_ms: i64,
    pub duration_ms: i64,
    pub item_count: usize,
    pub current_item: Option<EngineItem>,
    pub repeat_mode: RepeatMode,
}

impl EngineStatus {
    /// Identifier of the item under the engine's cursor, if any.
    pub fn current_item_id(&self) -> Option<&str> {
        self.current_item.as_ref().map(|item| item.id.as_str())
    }
}

/// What triggered an [`EngineEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineEventKind {
    /// `is_playing` flipped.
    IsPlayingChanged,
    /// The cursor moved to a different item (skip, auto-advance, reload).
    MediaItemTransition,
    /// The position jumped (seek, repeat-one restart).
    PositionDiscontinuity,
    /// Catch-all for any other engine-internal change.
    Changed,
}

/// Push notification delivered to every registered listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineEvent {
    pub kind: EngineEventKind,
    /// Engine state right after the change.
    pub status: EngineStatus,
}

impl EngineEvent {
    pub fn new(kind: EngineEventKind, status: EngineStatus) -> Self {
        Self { kind, status }
    }
}

/// Receiver of engine push events.
///
/// Engines may call listeners from any thread, and must not hold internal
/// locks while doing so. Implementations should hand the event off quickly.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
pub trait EngineListener: Send + Sync {
    fn on_event(&self, event: EngineEvent);
}

type ReleaseFn = Box<dyn FnOnce() + Send>;

/// Registration of an [`EngineListener`], returned by
/// [`SessionHandle::add_listener`].
///
/// The listener stays registered until [`Subscription::unsubscribe`] is
/// called or the subscription is dropped, whichever comes first. Releasing
/// more than once is harmless.
pub struct Subscription {
    id: Uuid,
    release: Mutex<Option<ReleaseFn>>,
}

impl Subscription {
    /// Creates a subscription that runs `release` exactly once when it ends.
    pub fn new<F>(release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            id: Uuid::new_v4(),
            release: Mutex::new(Some(Box::new(release))),
        }
    }

    /// A subscription with nothing to release.
    pub fn detached() -> Self {
        Self {
            id: Uuid::new_v4(),
            release: Mutex::new(None),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.release.lock().is_some()
    }

    /// Deregisters the listener. Returns `true` only for the call that
    /// actually released it.
    pub fn unsubscribe(&self) -> bool {
        let release = self.release.lock().take();
        match release {
            Some(release) => {
                release();
                true
            }
            None => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Connected handle to a playback engine.
///
/// Commands are fire-and-forget from the engine's point of view: their
/// effects are observed through listener events, not through return values.
/// Errors are reserved for commands the engine refused outright.
#[async_trait]
pub trait SessionHandle: Send + Sync {
    /// Reads the live engine state. Must not block on engine I/O.
    fn status(&self) -> EngineStatus;

    /// Registers a listener for push events.
    fn add_listener(&self, listener: Arc<dyn EngineListener>) -> Subscription;

    /// Replaces the playlist and positions the cursor at `start_index`.
    async fn set_items(&self, items: Vec<EngineItem>, start_index: usize) -> Result<()>;

    /// Prepares the current item for playback.
    async fn prepare(&self) -> Result<()>;

    async fn set_repeat_mode(&self, mode: RepeatMode) -> Result<()>;

    async fn play(&self) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    /// Seeks within the current item. Out-of-range targets are clamped by the
    /// engine.
    async fn seek_to(&self, position_ms: u64) -> Result<()>;

    async fn skip_next(&self) -> Result<()>;

    async fn skip_previous(&self) -> Result<()>;
}

/// Asynchronous acquisition of a [`SessionHandle`].
#[async_trait]
pub trait SessionBridge: Send + Sync {
    /// Connects to the engine identified by `locator`.
    ///
    /// The returned future may take arbitrarily long, or never complete;
    /// callers must stay usable in the meantime. Dropping the handle releases
    /// the connection.
    async fn connect(&self, locator: &EngineLocator) -> Result<Arc<dyn SessionHandle>>;
}
