//! Recording engine fake shared by the coordinator test suites.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::{
    BridgeError, EngineEvent, EngineEventKind, EngineItem, EngineListener, EngineLocator,
    EngineStatus, RepeatMode, Result, SessionBridge, SessionHandle, Subscription,
};
use core_async::sync::Notify;
use core_async::time::{sleep, Duration, Instant};
use core_library::Track;
use core_playback::{CoordinatorConfig, PlaybackCoordinator};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

// ============================================================================
// Recording Engine
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetItems(Vec<String>, usize),
    Prepare,
    SetRepeatMode(RepeatMode),
    Play,
    Pause,
    SeekTo(u64),
    SkipNext,
    SkipPrevious,
}

type Effect = Box<dyn FnOnce(&FakeEngine, &mut FakeState) + Send>;

#[derive(Default)]
struct FakeState {
    status: EngineStatus,
    items: Vec<EngineItem>,
    index: usize,
}

/// Minimal engine that records every command and applies the obvious
/// effect to its status. It never emits events on its own; tests call
/// [`FakeEngine::emit`].
///
/// A lagging engine acknowledges commands immediately but holds their
/// effects back until [`FakeEngine::catch_up`].
#[derive(Default)]
pub struct FakeEngine {
    state: Mutex<FakeState>,
    calls: Mutex<Vec<Call>>,
    durations: Mutex<HashMap<String, i64>>,
    listeners: Arc<Mutex<HashMap<usize, Arc<dyn EngineListener>>>>,
    next_listener: AtomicUsize,
    releases: Arc<AtomicUsize>,
    fail_commands: AtomicBool,
    lagging: AtomicBool,
    deferred: Mutex<Vec<Effect>>,
}

impl FakeEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lagging() -> Arc<Self> {
        let engine = Self::default();
        engine.lagging.store(true, Ordering::SeqCst);
        Arc::new(engine)
    }

    /// Applies every effect a lagging engine has held back so far.
    pub fn catch_up(&self) {
        let effects = std::mem::take(&mut *self.deferred.lock());
        let mut state = self.state.lock();
        for effect in effects {
            effect(self, &mut *state);
        }
    }

    pub fn deferred_effects(&self) -> usize {
        self.deferred.lock().len()
    }

    pub fn set_duration(&self, item_id: &str, duration_ms: i64) {
        self.durations.lock().insert(item_id.to_string(), duration_ms);
    }

    pub fn fail_commands(&self, fail: bool) {
        self.fail_commands.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    /// Mutates the live status without notifying anyone.
    pub fn update(&self, f: impl FnOnce(&mut EngineStatus)) {
        f(&mut self.state.lock().status);
    }

    /// Notifies every listener with the current status.
    pub fn emit(&self, kind: EngineEventKind) {
        let status = self.state.lock().status.clone();
        let listeners: Vec<_> = self.listeners.lock().values().cloned().collect();
        for listener in listeners {
            listener.on_event(EngineEvent::new(kind, status.clone()));
        }
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls.lock().push(call);
        if self.fail_commands.load(Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed("engine refused".to_string()));
        }
        Ok(())
    }

    fn apply(&self, effect: impl FnOnce(&FakeEngine, &mut FakeState) + Send + 'static) {
        if self.lagging.load(Ordering::SeqCst) {
            self.deferred.lock().push(Box::new(effect));
        } else {
            effect(self, &mut *self.state.lock());
        }
    }

    fn select(&self, state: &mut FakeState, index: usize) {
        state.index = index;
        let item = state.items.get(index).cloned();
        state.status.duration_ms = item
            .as_ref()
            .and_then(|item| self.durations.lock().get(&item.id).copied())
            .unwrap_or(0);
        state.status.current_item = item;
        state.status.position_ms = 0;
    }
}

#[async_trait]
impl SessionHandle for FakeEngine {
    fn status(&self) -> EngineStatus {
        self.state.lock().status.clone()
    }

    fn add_listener(&self, listener: Arc<dyn EngineListener>) -> Subscription {
        let id = self.next_listener.fetch_add(1, Ordering::SeqCst);
        self.listeners.lock().insert(id, listener);

        let listeners = Arc::clone(&self.listeners);
        let releases = Arc::clone(&self.releases);
        Subscription::new(move || {
            listeners.lock().remove(&id);
            releases.fetch_add(1, Ordering::SeqCst);
        })
    }

    async fn set_items(&self, items: Vec<EngineItem>, start_index: usize) -> Result<()> {
        let ids = items.iter().map(|item| item.id.clone()).collect();
        self.record(Call::SetItems(ids, start_index))?;
        self.apply(move |engine, state| {
            state.status.item_count = items.len();
            state.items = items;
            engine.select(state, start_index);
        });
        Ok(())
    }

    async fn prepare(&self) -> Result<()> {
        self.record(Call::Prepare)
    }

    async fn set_repeat_mode(&self, mode: RepeatMode) -> Result<()> {
        self.record(Call::SetRepeatMode(mode))?;
        self.apply(move |_, state| state.status.repeat_mode = mode);
        Ok(())
    }

    async fn play(&self) -> Result<()> {
        self.record(Call::Play)?;
        self.apply(|_, state| state.status.is_playing = true);
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        self.record(Call::Pause)?;
        self.apply(|_, state| state.status.is_playing = false);
        Ok(())
    }

    async fn seek_to(&self, position_ms: u64) -> Result<()> {
        self.record(Call::SeekTo(position_ms))?;
        self.apply(move |_, state| state.status.position_ms = position_ms as i64);
        Ok(())
    }

    async fn skip_next(&self) -> Result<()> {
        self.record(Call::SkipNext)?;
        self.apply(|engine, state| {
            let next = state.index + 1;
            if next < state.items.len() {
                engine.select(state, next);
            }
        });
        Ok(())
    }

    async fn skip_previous(&self) -> Result<()> {
        self.record(Call::SkipPrevious)?;
        self.apply(|engine, state| {
            let previous = state.index.saturating_sub(1);
            engine.select(state, previous);
        });
        Ok(())
    }
}

// ============================================================================
// Gated Bridge
// ============================================================================

/// Bridge whose connection resolves only when the test opens the gate.
pub struct GatedBridge {
    engine: Arc<FakeEngine>,
    gate: Notify,
    gated: bool,
    failure: Option<BridgeError>,
}

impl GatedBridge {
    pub fn immediate(engine: Arc<FakeEngine>) -> Arc<Self> {
        Arc::new(Self {
            engine,
            gate: Notify::new(),
            gated: false,
            failure: None,
        })
    }

    pub fn gated(engine: Arc<FakeEngine>) -> Arc<Self> {
        Arc::new(Self {
            engine,
            gate: Notify::new(),
            gated: true,
            failure: None,
        })
    }

    pub fn failing(error: BridgeError) -> Arc<Self> {
        Arc::new(Self {
            engine: FakeEngine::new(),
            gate: Notify::new(),
            gated: false,
            failure: Some(error),
        })
    }

    pub fn open(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl SessionBridge for GatedBridge {
    async fn connect(&self, _locator: &EngineLocator) -> Result<Arc<dyn SessionHandle>> {
        if self.gated {
            self.gate.notified().await;
        }
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        let handle: Arc<dyn SessionHandle> = self.engine.clone();
        Ok(handle)
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn fast_config() -> CoordinatorConfig {
    CoordinatorConfig::default().with_poll_interval(Duration::from_millis(50))
}

pub async fn connected_with(
    engine: &Arc<FakeEngine>,
    config: CoordinatorConfig,
) -> PlaybackCoordinator {
    let coordinator = PlaybackCoordinator::builder(GatedBridge::immediate(Arc::clone(engine)))
        .config(config)
        .surface_id("test")
        .spawn()
        .unwrap();
    coordinator
        .wait_connected(Duration::from_secs(2))
        .await
        .unwrap();
    coordinator
}

pub fn track(id: i64, title: &str, duration_ms: u64) -> Track {
    Track::new(id, title, "Artist", duration_ms, format!("content://media/{id}"))
}

pub async fn connected(engine: &Arc<FakeEngine>) -> PlaybackCoordinator {
    connected_with(engine, fast_config()).await
}

/// Polls `condition` until it holds, panicking after two seconds.
pub async fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !condition() {
        if Instant::now() > deadline {
            panic!("timed out waiting for {what}");
        }
        sleep(Duration::from_millis(5)).await;
    }
}
