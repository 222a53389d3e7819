//! # Event Bus System
//!
//! Broadcast channel used by the playback core to announce what happened to
//! anyone who cares (analytics, notification surfaces, debug overlays)
//! without coupling them to the coordinator.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     emit      ┌───────────┐
//! │ Coordinator  ├──────────────>│           │     subscribe    ┌────────────┐
//! └──────────────┘               │ EventBus  ├─────────────────>│ Subscriber │
//! ┌──────────────┐     emit      │ (broadcast│                  └────────────┘
//! │ CoreService  ├──────────────>│  channel) │
//! └──────────────┘               └───────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
//!
//! let bus = EventBus::new(16);
//! let mut rx = bus.subscribe();
//! bus.emit(CoreEvent::Playback(PlaybackEvent::StateChanged {
//!     surface_id: "main".to_string(),
//!     is_playing: true,
//! }))
//! .ok();
//! assert!(rx.try_recv().is_ok());
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events. Non-fatal.
//! - **`RecvError::Closed`**: every sender is gone. Treat as shutdown.
//!
//! Emitting with no subscribers returns an error that publishers ignore.

use core_async::sync::broadcast;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use core_async::sync::broadcast::error::{RecvError, SendError};
pub use core_async::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Library(LibraryEvent),
    Playback(PlaybackEvent),
}

impl CoreEvent {
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Library(e) => e.description(),
            CoreEvent::Playback(e) => e.description(),
        }
    }

    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Playback(PlaybackEvent::CommandFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Playback(PlaybackEvent::ConnectionChanged { state, .. })
                if state == "disconnected" =>
            {
                EventSeverity::Warning
            }
            CoreEvent::Library(LibraryEvent::CatalogLoaded { .. }) => EventSeverity::Info,
            CoreEvent::Playback(PlaybackEvent::PlaylistSubmitted { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Library Events
// ============================================================================

/// Events about the on-device track catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum LibraryEvent {
    /// A catalog snapshot replaced the previous one.
    CatalogLoaded { track_count: usize },
    /// A search ran against the catalog.
    Searched { query: String, matches: usize },
}

impl LibraryEvent {
    fn description(&self) -> &str {
        match self {
            LibraryEvent::CatalogLoaded { .. } => "Catalog loaded",
            LibraryEvent::Searched { .. } => "Catalog searched",
        }
    }
}

// ============================================================================
// Playback Events
// ============================================================================

/// Events emitted by playback coordinators. `surface_id` names the UI
/// surface whose coordinator produced the event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// Connection to the engine moved to `state`
    /// (`connecting`, `connected`, `disconnected`).
    ConnectionChanged { surface_id: String, state: String },
    /// A new playlist was handed to the engine.
    PlaylistSubmitted {
        surface_id: String,
        size: usize,
        start_index: usize,
    },
    /// The displayed track changed.
    TrackChanged {
        surface_id: String,
        track_id: Option<String>,
        title: Option<String>,
    },
    /// Play/pause flipped.
    StateChanged { surface_id: String, is_playing: bool },
    /// A seek was issued after a slider drag.
    Seeked { surface_id: String, position_ms: f64 },
    /// The engine refused a command.
    CommandFailed {
        surface_id: String,
        command: String,
        message: String,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::ConnectionChanged { .. } => "Engine connection changed",
            PlaybackEvent::PlaylistSubmitted { .. } => "Playlist submitted",
            PlaybackEvent::TrackChanged { .. } => "Current track changed",
            PlaybackEvent::StateChanged { .. } => "Playback state changed",
            PlaybackEvent::Seeked { .. } => "Seek issued",
            PlaybackEvent::CommandFailed { .. } => "Engine command failed",
        }
    }

    pub fn surface_id(&self) -> &str {
        match self {
            PlaybackEvent::ConnectionChanged { surface_id, .. }
            | PlaybackEvent::PlaylistSubmitted { surface_id, .. }
            | PlaybackEvent::TrackChanged { surface_id, .. }
            | PlaybackEvent::StateChanged { surface_id, .. }
            | PlaybackEvent::Seeked { surface_id, .. }
            | PlaybackEvent::CommandFailed { surface_id, .. } => surface_id,
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central broadcast channel. Cheap to clone; clones share the channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// `capacity` is how far a subscriber may fall behind before it lags.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Returns the number of subscribers that received the event, or an
    /// error when nobody is listening.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// Receiver with an optional predicate.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let bus = EventBus::new(8);
/// let playback_only = EventStream::new(bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Playback(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Only events for the given UI surface.
    pub fn for_surface(self, surface_id: impl Into<String>) -> Self {
        let surface_id = surface_id.into();
        self.filter(move |event| match event {
            CoreEvent::Playback(e) => e.surface_id() == surface_id,
            CoreEvent::Library(_) => false,
        })
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Waits for the next event that passes the filter.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Returns `None` when no matching event is buffered.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.accepts(&event) => return Some(Ok(event)),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
