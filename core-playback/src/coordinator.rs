//! # Playback Coordinator
//!
//! Single source of truth for one UI surface's view of playback.
//!
//! ## Overview
//!
//! A coordinator owns a [`PlaybackStateSnapshot`] and keeps it in step with
//! the engine behind a [`SessionBridge`]. Surfaces call intents (play,
//! seek, submit a playlist) as plain synchronous functions and render
//! whatever the snapshot watch channel yields.
//!
//! ## Architecture
//!
//! ```text
//!  UI intents ──> lock ──> snapshot + command queue
//!                                │
//!                    ┌───────────▼────────────┐
//!                    │ session task           │<── listener (forwards only)
//!                    │  - connect             │
//!                    │  - run engine commands │<── poll tick
//!                    │  - re-sync on events   │
//!                    └───────────┬────────────┘
//!                                ▼
//!                         SessionHandle
//! ```
//!
//! Every snapshot mutation happens under one lock and is published before
//! the lock is released, so intents, event re-syncs and poll ticks never
//! interleave. The engine listener does no work itself; it only wakes the
//! session task, which reads the live engine status.
//!
//! ## Settling
//!
//! Engine commands are fire-and-forget: a resolved command only means the
//! engine accepted it. After a slider seek or a playlist submission the
//! coordinator keeps its own values until the engine status shows the
//! result (position near the target, submitted start item playing). An
//! acknowledged command that never shows up is given up on after
//! [`CoordinatorConfig::settle_ticks`] poll ticks; a failed one right away.
//!
//! ## Lifecycle
//!
//! `Connecting` until the bridge resolves, then `Connected`, and finally
//! `Disconnected` on connect failure or [`PlaybackCoordinator::shutdown`].
//! Intents that need the engine are silent no-ops while not connected.

use crate::cache::PlaylistCache;
use crate::config::CoordinatorConfig;
use crate::error::{PlaybackError, Result};
use crate::mapper::{partial_track, to_engine_item};
use crate::position::PositionArbiter;
use crate::shuffle::shuffled;
use crate::snapshot::{safe_duration, ConnectionState, PlaybackStateSnapshot};
use bridge_traits::{
    BridgeError, EngineEvent, EngineItem, EngineListener, EngineLocator, EngineStatus,
    RepeatMode, SessionBridge, SessionHandle, Subscription,
};
use core_async::sync::{mpsc, watch, CancellationToken};
use core_async::time::{steady_interval, timeout, Duration};
use core_library::Track;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;

// ============================================================================
// Engine Commands
// ============================================================================

/// Work queued for the session task, executed in submission order.
#[derive(Debug)]
enum EngineCommand {
    LoadPlaylist {
        items: Vec<EngineItem>,
        start_index: usize,
        repeat_mode: RepeatMode,
        load_seq: u64,
    },
    Play,
    Pause,
    SeekTo {
        position_ms: u64,
        seq: u64,
    },
    SkipNext,
    SkipPrevious,
}

impl EngineCommand {
    fn name(&self) -> &'static str {
        match self {
            EngineCommand::LoadPlaylist { .. } => "load_playlist",
            EngineCommand::Play => "play",
            EngineCommand::Pause => "pause",
            EngineCommand::SeekTo { .. } => "seek_to",
            EngineCommand::SkipNext => "skip_next",
            EngineCommand::SkipPrevious => "skip_previous",
        }
    }
}

/// Engine listener that only wakes the session task.
///
/// Engines may call listeners from any thread, possibly while holding their
/// own locks, so nothing here touches coordinator state.
struct WakeListener {
    wake: mpsc::UnboundedSender<()>,
}

impl EngineListener for WakeListener {
    fn on_event(&self, event: EngineEvent) {
        trace!(kind = ?event.kind, "engine event");
        let _ = self.wake.send(());
    }
}

// ============================================================================
// Shared State
// ============================================================================

enum SessionLink {
    Connecting,
    Connected {
        handle: Arc<dyn SessionHandle>,
        subscription: Subscription,
    },
    Disconnected,
}

impl SessionLink {
    fn handle(&self) -> Option<&Arc<dyn SessionHandle>> {
        match self {
            SessionLink::Connected { handle, .. } => Some(handle),
            _ => None,
        }
    }
}

/// Submitted playlist the engine has not been seen playing yet.
struct PendingLoad {
    seq: u64,
    start_item_id: String,
    /// Set once the load commands have been acknowledged.
    ticks_left: Option<u32>,
}

impl PendingLoad {
    fn is_confirmed_by(&self, status: &EngineStatus) -> bool {
        status.is_playing
            && status
                .current_item
                .as_ref()
                .is_some_and(|item| item.id == self.start_item_id)
    }
}

struct CoordinatorState {
    snapshot: PlaybackStateSnapshot,
    arbiter: PositionArbiter,
    cache: PlaylistCache,
    link: SessionLink,
    pending_load: Option<PendingLoad>,
    next_load_seq: u64,
    next_seek_seq: u64,
}

struct Shared {
    surface_id: String,
    config: CoordinatorConfig,
    state: Mutex<CoordinatorState>,
    snapshot_tx: watch::Sender<PlaybackStateSnapshot>,
    connection_tx: watch::Sender<ConnectionState>,
    commands: mpsc::UnboundedSender<EngineCommand>,
    events: Option<EventBus>,
    token: CancellationToken,
    closed: AtomicBool,
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`PlaybackCoordinator`].
pub struct CoordinatorBuilder {
    bridge: Arc<dyn SessionBridge>,
    locator: EngineLocator,
    config: CoordinatorConfig,
    events: Option<EventBus>,
    surface_id: Option<String>,
}

impl CoordinatorBuilder {
    /// Defaults to [`EngineLocator::default_service`].
    pub fn locator(mut self, locator: EngineLocator) -> Self {
        self.locator = locator;
        self
    }

    pub fn config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    /// Name used in logs and bus events. Defaults to a random UUID.
    pub fn surface_id(mut self, id: impl Into<String>) -> Self {
        self.surface_id = Some(id.into());
        self
    }

    /// Validates the configuration and starts connecting.
    ///
    /// Must be called from within a runtime; the session task is spawned
    /// here.
    pub fn spawn(self) -> Result<PlaybackCoordinator> {
        self.config
            .validate()
            .map_err(PlaybackError::InvalidConfig)?;

        if !core_async::runtime::in_runtime() {
            return Err(PlaybackError::NoRuntime(
                "PlaybackCoordinator must be created inside an async runtime".to_string(),
            ));
        }

        let surface_id = self
            .surface_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let (snapshot_tx, _) = watch::channel(PlaybackStateSnapshot::default());
        let (connection_tx, _) = watch::channel(ConnectionState::Connecting);
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let shared = Arc::new(Shared {
            surface_id,
            config: self.config,
            state: Mutex::new(CoordinatorState {
                snapshot: PlaybackStateSnapshot::default(),
                arbiter: PositionArbiter::default(),
                cache: PlaylistCache::default(),
                link: SessionLink::Connecting,
                pending_load: None,
                next_load_seq: 0,
                next_seek_seq: 0,
            }),
            snapshot_tx,
            connection_tx,
            commands: command_tx,
            events: self.events,
            token: CancellationToken::new(),
            closed: AtomicBool::new(false),
        });

        shared.emit(PlaybackEvent::ConnectionChanged {
            surface_id: shared.surface_id.clone(),
            state: ConnectionState::Connecting.as_str().to_string(),
        });

        core_async::spawn(run_session(
            Arc::clone(&shared),
            self.bridge,
            self.locator,
            command_rx,
        ));

        Ok(PlaybackCoordinator { shared })
    }
}

// ============================================================================
// Coordinator
// ============================================================================

/// Playback state coordinator for one UI surface.
///
/// Not `Clone`: dropping the coordinator tears its session down. Share it
/// behind an `Arc` if several components drive the same surface.
pub struct PlaybackCoordinator {
    shared: Arc<Shared>,
}

impl PlaybackCoordinator {
    pub fn builder(bridge: Arc<dyn SessionBridge>) -> CoordinatorBuilder {
        CoordinatorBuilder {
            bridge,
            locator: EngineLocator::default_service(),
            config: CoordinatorConfig::default(),
            events: None,
            surface_id: None,
        }
    }

    /// Connects to `locator` with the given configuration and no event bus.
    pub fn connect(
        bridge: Arc<dyn SessionBridge>,
        locator: EngineLocator,
        config: CoordinatorConfig,
    ) -> Result<Self> {
        Self::builder(bridge).locator(locator).config(config).spawn()
    }

    pub fn surface_id(&self) -> &str {
        &self.shared.surface_id
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.shared.config
    }

    // ------------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------------

    pub fn snapshot(&self) -> PlaybackStateSnapshot {
        self.shared.snapshot_tx.borrow().clone()
    }

    /// Receiver that yields every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackStateSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.shared.connection_tx.borrow()
    }

    pub fn watch_connection(&self) -> watch::Receiver<ConnectionState> {
        self.shared.connection_tx.subscribe()
    }

    /// Waits until the session is connected.
    ///
    /// Fails with [`PlaybackError::NotConnected`] once the coordinator is
    /// disconnected and with [`PlaybackError::ConnectTimeout`] when `limit`
    /// elapses first.
    pub async fn wait_connected(&self, limit: Duration) -> Result<()> {
        let mut rx = self.watch_connection();
        let wait = async move {
            loop {
                let state = *rx.borrow_and_update();
                match state {
                    ConnectionState::Connected => return Ok(()),
                    ConnectionState::Disconnected => {
                        return Err(PlaybackError::NotConnected(
                            "session is disconnected".to_string(),
                        ))
                    }
                    ConnectionState::Connecting => {}
                }
                if rx.changed().await.is_err() {
                    return Err(PlaybackError::NotConnected(
                        "coordinator dropped".to_string(),
                    ));
                }
            }
        };

        timeout(limit, wait)
            .await
            .map_err(|_| PlaybackError::ConnectTimeout(limit))?
    }

    // ------------------------------------------------------------------------
    // Intents
    // ------------------------------------------------------------------------

    /// Replaces the engine playlist with `tracks`, starting at `start_index`
    /// (clamped to the last track).
    ///
    /// The snapshot shows the start track as playing before this returns;
    /// the engine catches up asynchronously. No-op when `tracks` is empty or
    /// the session is not connected.
    pub fn submit_playlist(&self, tracks: Vec<Track>, start_index: usize) {
        if tracks.is_empty() {
            debug!(surface = %self.shared.surface_id, "empty playlist ignored");
            return;
        }

        let shared = &self.shared;
        let mut state = shared.state.lock();
        if state.link.handle().is_none() {
            debug!(surface = %shared.surface_id, "submit ignored: not connected");
            return;
        }

        let before = state.snapshot.clone();
        let start_index = start_index.min(tracks.len() - 1);
        let playlist: Arc<[Track]> = Arc::from(tracks);
        let start = playlist[start_index].clone();
        let items: Vec<EngineItem> = playlist.iter().map(to_engine_item).collect();

        state.cache.replace(Arc::clone(&playlist));
        state.arbiter.release_seek();
        let load_seq = state.next_load_seq;
        state.next_load_seq += 1;
        state.pending_load = Some(PendingLoad {
            seq: load_seq,
            start_item_id: start.id.as_str().to_string(),
            ticks_left: None,
        });

        let keep_position = state.arbiter.is_dragging();
        let snapshot = &mut state.snapshot;
        snapshot.duration_ms =
            safe_duration(i64::try_from(start.duration_ms).unwrap_or(i64::MAX));
        snapshot.current_track = Some(start);
        snapshot.is_playing = true;
        if !keep_position {
            snapshot.position_ms = 0.0;
        }
        snapshot.playlist_size = playlist.len();
        snapshot.playlist = Arc::clone(&playlist);
        shared.publish(&before, &state.snapshot);

        info!(
            surface = %shared.surface_id,
            size = playlist.len(),
            start_index,
            "playlist submitted"
        );
        shared.enqueue(EngineCommand::LoadPlaylist {
            items,
            start_index,
            repeat_mode: shared.config.repeat_mode,
            load_seq,
        });
        drop(state);

        shared.emit(PlaybackEvent::PlaylistSubmitted {
            surface_id: shared.surface_id.clone(),
            size: playlist.len(),
            start_index,
        });
    }

    /// Submits a uniformly shuffled copy of `tracks`, starting at its first
    /// entry. No-op when `tracks` is empty.
    pub fn shuffle_play(&self, tracks: &[Track]) {
        if tracks.is_empty() {
            debug!(surface = %self.shared.surface_id, "shuffle of empty list ignored");
            return;
        }
        self.submit_playlist(shuffled(tracks), 0);
    }

    /// Pauses if the engine is playing right now, otherwise plays.
    ///
    /// Only the live engine status counts. While a submitted playlist is
    /// still loading the engine reports idle, so a tap then queues `Play`
    /// even though the snapshot already shows the new track playing.
    pub fn toggle_play_pause(&self) {
        let Some(handle) = self.shared.handle() else {
            debug!(surface = %self.shared.surface_id, "toggle ignored: not connected");
            return;
        };

        if handle.status().is_playing {
            self.shared.enqueue(EngineCommand::Pause);
        } else {
            self.shared.enqueue(EngineCommand::Play);
        }
    }

    pub fn play(&self) {
        self.enqueue_when_connected(EngineCommand::Play);
    }

    pub fn pause(&self) {
        self.enqueue_when_connected(EngineCommand::Pause);
    }

    /// The new track shows up once the engine reports the transition.
    pub fn skip_to_next(&self) {
        self.enqueue_when_connected(EngineCommand::SkipNext);
    }

    pub fn skip_to_previous(&self) {
        self.enqueue_when_connected(EngineCommand::SkipPrevious);
    }

    /// One drag frame. Moves the slider locally; the engine is not touched.
    pub fn on_slider_change(&self, fraction: f64) {
        let fraction = clamp_fraction(fraction);
        let mut state = self.shared.state.lock();
        let before = state.snapshot.clone();

        state.arbiter.begin_drag();
        state.snapshot.position_ms = fraction * state.snapshot.duration_ms;
        self.shared.publish(&before, &state.snapshot);
    }

    /// End of a drag: seeks the engine to `fraction` of the duration and
    /// keeps the slider there until the engine reports the new position.
    pub fn on_slider_change_finished(&self, fraction: f64) {
        let fraction = clamp_fraction(fraction);
        let shared = &self.shared;
        let mut state = shared.state.lock();
        let before = state.snapshot.clone();
        let target_ms = fraction * state.snapshot.duration_ms;

        let seek_seq = if state.link.handle().is_some() {
            let seq = state.next_seek_seq;
            state.next_seek_seq += 1;
            shared.enqueue(EngineCommand::SeekTo {
                position_ms: target_ms.round() as u64,
                seq,
            });
            Some(seq)
        } else {
            None
        };

        state.snapshot.position_ms = target_ms;
        state.arbiter.finish_drag(target_ms, seek_seq);
        shared.publish(&before, &state.snapshot);
        drop(state);

        if seek_seq.is_some() {
            debug!(surface = %shared.surface_id, position_ms = target_ms, "seek queued");
            shared.emit(PlaybackEvent::Seeked {
                surface_id: shared.surface_id.clone(),
                position_ms: target_ms,
            });
        }
    }

    // ------------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------------

    /// Stops polling, unsubscribes from the engine and releases the handle.
    /// Safe to call any number of times; only the first call has effects.
    pub fn shutdown(&self) {
        self.shared.shutdown();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }

    fn enqueue_when_connected(&self, command: EngineCommand) {
        let state = self.shared.state.lock();
        if state.link.handle().is_none() {
            debug!(
                surface = %self.shared.surface_id,
                command = command.name(),
                "command ignored: not connected"
            );
            return;
        }
        self.shared.enqueue(command);
    }
}

impl Drop for PlaybackCoordinator {
    fn drop(&mut self) {
        self.shared.shutdown();
    }
}

impl std::fmt::Debug for PlaybackCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackCoordinator")
            .field("surface_id", &self.shared.surface_id)
            .field("connection", &self.connection_state())
            .finish()
    }
}

fn clamp_fraction(fraction: f64) -> f64 {
    if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    }
}

// ============================================================================
// Session Task
// ============================================================================

#[instrument(skip_all, fields(surface = %shared.surface_id, locator = %locator))]
async fn run_session(
    shared: Arc<Shared>,
    bridge: Arc<dyn SessionBridge>,
    locator: EngineLocator,
    mut commands: mpsc::UnboundedReceiver<EngineCommand>,
) {
    debug!("connecting to engine");
    let connected = core_async::select! {
        _ = shared.token.cancelled() => {
            debug!("connect abandoned");
            return;
        }
        result = bridge.connect(&locator) => result,
    };

    let handle = match connected {
        Ok(handle) => handle,
        Err(err) => {
            shared.on_connect_failed(&err);
            return;
        }
    };

    let (wake_tx, mut wake_rx) = mpsc::unbounded_channel();
    if !shared.on_connected(handle, Arc::new(WakeListener { wake: wake_tx })) {
        return;
    }

    let mut ticker = steady_interval(shared.config.poll_interval);
    loop {
        core_async::select! {
            biased;

            _ = shared.token.cancelled() => break,
            Some(command) = commands.recv() => {
                core_async::select! {
                    _ = shared.token.cancelled() => break,
                    _ = shared.execute(command) => {}
                }
            }
            Some(()) = wake_rx.recv() => {
                // One re-sync covers every event queued so far.
                while wake_rx.try_recv().is_ok() {}
                shared.resync();
            }
            _ = ticker.tick() => shared.poll(),
        }
    }

    debug!("session task stopped");
}

impl Shared {
    fn handle(&self) -> Option<Arc<dyn SessionHandle>> {
        self.state.lock().link.handle().cloned()
    }

    fn enqueue(&self, command: EngineCommand) {
        if self.commands.send(command).is_err() {
            debug!(surface = %self.surface_id, "command dropped: session task gone");
        }
    }

    fn emit(&self, event: PlaybackEvent) {
        if !self.config.emit_bus_events {
            return;
        }
        if let Some(bus) = &self.events {
            // No subscribers is fine.
            let _ = bus.emit(CoreEvent::Playback(event));
        }
    }

    /// Publishes `after` if it differs from `before`. Called with the state
    /// lock held so publication order matches mutation order.
    fn publish(&self, before: &PlaybackStateSnapshot, after: &PlaybackStateSnapshot) {
        if before == after {
            return;
        }
        self.snapshot_tx.send_replace(after.clone());

        if before.current_track_id() != after.current_track_id() {
            self.emit(PlaybackEvent::TrackChanged {
                surface_id: self.surface_id.clone(),
                track_id: after.current_track_id().map(str::to_string),
                title: after.current_track.as_ref().map(|t| t.title.clone()),
            });
        }
        if before.is_playing != after.is_playing {
            self.emit(PlaybackEvent::StateChanged {
                surface_id: self.surface_id.clone(),
                is_playing: after.is_playing,
            });
        }
    }

    fn set_connection(&self, state: ConnectionState) {
        let previous = self.connection_tx.send_replace(state);
        if previous != state {
            self.emit(PlaybackEvent::ConnectionChanged {
                surface_id: self.surface_id.clone(),
                state: state.as_str().to_string(),
            });
        }
    }

    fn on_connect_failed(&self, err: &BridgeError) {
        warn!(surface = %self.surface_id, error = %err, "engine connection failed");
        {
            let mut state = self.state.lock();
            if !matches!(state.link, SessionLink::Connecting) {
                return;
            }
            state.link = SessionLink::Disconnected;
        }
        self.set_connection(ConnectionState::Disconnected);
    }

    /// Installs the connected handle and pulls the initial engine state.
    /// Returns `false` when the coordinator was torn down meanwhile.
    fn on_connected(&self, handle: Arc<dyn SessionHandle>, listener: Arc<WakeListener>) -> bool {
        let subscription = handle.add_listener(listener);
        let status = handle.status();

        {
            let mut state = self.state.lock();
            if self.token.is_cancelled() || !matches!(state.link, SessionLink::Connecting) {
                drop(state);
                subscription.unsubscribe();
                debug!(surface = %self.surface_id, "connected after teardown, releasing");
                return false;
            }

            state.link = SessionLink::Connected {
                handle,
                subscription,
            };
            // Catches up on anything that happened before the listener was
            // registered.
            let before = state.snapshot.clone();
            self.apply_status(&mut state, &status);
            self.publish(&before, &state.snapshot);
        }

        info!(
            surface = %self.surface_id,
            items = status.item_count,
            playing = status.is_playing,
            "engine connected"
        );
        self.set_connection(ConnectionState::Connected);
        true
    }

    async fn execute(&self, command: EngineCommand) {
        let Some(handle) = self.handle() else {
            return;
        };
        let name = command.name();
        trace!(surface = %self.surface_id, command = name, "executing");

        match command {
            EngineCommand::LoadPlaylist {
                items,
                start_index,
                repeat_mode,
                load_seq,
            } => {
                let result: bridge_traits::Result<()> = async {
                    handle.set_items(items, start_index).await?;
                    handle.prepare().await?;
                    handle.set_repeat_mode(repeat_mode).await?;
                    handle.play().await
                }
                .await;
                if let Err(err) = &result {
                    self.command_failed(name, err);
                }
                self.finish_load(handle.as_ref(), load_seq, result.is_ok());
            }
            EngineCommand::SeekTo { position_ms, seq } => {
                let result = handle.seek_to(position_ms).await;
                if let Err(err) = &result {
                    self.command_failed(name, err);
                }
                self.finish_seek(handle.as_ref(), seq, result.is_ok());
            }
            EngineCommand::Play => self.report(name, handle.play().await),
            EngineCommand::Pause => self.report(name, handle.pause().await),
            EngineCommand::SkipNext => self.report(name, handle.skip_next().await),
            EngineCommand::SkipPrevious => self.report(name, handle.skip_previous().await),
        }
    }

    fn report(&self, command: &str, result: bridge_traits::Result<()>) {
        if let Err(err) = result {
            self.command_failed(command, &err);
        }
    }

    fn command_failed(&self, command: &str, err: &BridgeError) {
        warn!(surface = %self.surface_id, command, error = %err, "engine command failed");
        self.emit(PlaybackEvent::CommandFailed {
            surface_id: self.surface_id.clone(),
            command: command.to_string(),
            message: err.to_string(),
        });
    }

    /// The load command sequence for `load_seq` returned. A failed load
    /// stops the wait right away; an acknowledged one keeps waiting for the
    /// engine to report the start item, at most `settle_ticks` polls.
    fn finish_load(&self, handle: &dyn SessionHandle, load_seq: u64, succeeded: bool) {
        let status = handle.status();
        let mut state = self.state.lock();
        let before = state.snapshot.clone();

        if state
            .pending_load
            .as_ref()
            .is_some_and(|pending| pending.seq == load_seq)
        {
            if succeeded {
                if let Some(pending) = state.pending_load.as_mut() {
                    pending.ticks_left.get_or_insert(self.config.settle_ticks);
                }
            } else {
                state.pending_load = None;
            }
        }

        self.apply_status(&mut state, &status);
        self.publish(&before, &state.snapshot);
    }

    fn finish_seek(&self, handle: &dyn SessionHandle, seq: u64, succeeded: bool) {
        let status = handle.status();
        let mut state = self.state.lock();
        let before = state.snapshot.clone();

        if succeeded {
            state.arbiter.seek_acknowledged(seq, self.config.settle_ticks);
        } else {
            state.arbiter.seek_failed(seq);
        }

        self.apply_status(&mut state, &status);
        self.publish(&before, &state.snapshot);
    }

    /// Ends the seek and load holds the engine status proves are done.
    fn settle(&self, state: &mut CoordinatorState, status: &EngineStatus) {
        if state.arbiter.confirm_seek(status.position_ms as f64) {
            debug!(surface = %self.surface_id, position_ms = status.position_ms, "seek landed");
        }
        if state
            .pending_load
            .as_ref()
            .is_some_and(|pending| pending.is_confirmed_by(status))
        {
            debug!(surface = %self.surface_id, "playlist load landed");
            state.pending_load = None;
        }
    }

    /// Counts one poll tick against acknowledged holds.
    fn expire_holds(&self, state: &mut CoordinatorState) {
        if state.arbiter.tick() {
            debug!(surface = %self.surface_id, "seek never reported, following engine again");
        }

        let expired = match state.pending_load.as_mut() {
            Some(PendingLoad {
                ticks_left: Some(ticks),
                ..
            }) => {
                *ticks = ticks.saturating_sub(1);
                *ticks == 0
            }
            _ => false,
        };
        if expired {
            debug!(surface = %self.surface_id, "playlist load never reported, following engine again");
            state.pending_load = None;
        }
    }

    /// Re-derives the snapshot from the live engine status.
    fn resync(&self) {
        let Some(handle) = self.handle() else {
            return;
        };
        let status = handle.status();
        let mut state = self.state.lock();
        let before = state.snapshot.clone();
        self.apply_status(&mut state, &status);
        self.publish(&before, &state.snapshot);
    }

    fn poll(&self) {
        let Some(handle) = self.handle() else {
            return;
        };
        let status = handle.status();
        let mut state = self.state.lock();
        let before = state.snapshot.clone();
        let was_loading = state.pending_load.is_some();

        self.settle(&mut state, &status);
        self.expire_holds(&mut state);

        if was_loading && state.pending_load.is_none() {
            self.apply_status(&mut state, &status);
        } else if status.is_playing
            && state.arbiter.accepts_engine_position()
            && state.pending_load.is_none()
        {
            state.snapshot.position_ms = status.position_ms.max(0) as f64;
            trace!(surface = %self.surface_id, position_ms = state.snapshot.position_ms, "poll");
        }
        self.publish(&before, &state.snapshot);
    }

    /// Folds an engine status into the snapshot. Does not publish.
    fn apply_status(&self, state: &mut CoordinatorState, status: &EngineStatus) {
        self.settle(state, status);
        if state.pending_load.is_some() {
            trace!(surface = %self.surface_id, "engine state ignored: load pending");
            return;
        }

        let snapshot = &mut state.snapshot;
        snapshot.is_playing = status.is_playing;
        snapshot.duration_ms = safe_duration(status.duration_ms);
        snapshot.playlist_size = status.item_count;

        if let Some(item) = &status.current_item {
            match state.cache.resolve(&item.id) {
                Some(track) => {
                    if snapshot.current_track.as_ref() != Some(track) {
                        snapshot.current_track = Some(track.clone());
                    }
                }
                None if snapshot.current_track.is_none() => {
                    debug!(surface = %self.surface_id, item_id = %item.id, "unknown item, using engine metadata");
                    snapshot.current_track = Some(partial_track(item));
                }
                None => {
                    debug!(surface = %self.surface_id, item_id = %item.id, "unknown item, keeping current track");
                }
            }
        }

        if state.arbiter.accepts_engine_position() {
            snapshot.position_ms = status.position_ms.max(0) as f64;
        }
    }

    fn shutdown(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.token.cancel();

        let link = std::mem::replace(&mut self.state.lock().link, SessionLink::Disconnected);
        if let SessionLink::Connected {
            handle,
            subscription,
        } = link
        {
            subscription.unsubscribe();
            drop(handle);
        }

        info!(surface = %self.surface_id, "coordinator shut down");
        self.set_connection(ConnectionState::Disconnected);
    }
}
