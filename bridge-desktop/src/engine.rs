//! In-process playback engine.
//!
//! `SimulatedEngine` behaves like a media engine without decoding anything:
//! position is derived from the injected [`Clock`], items auto-advance when
//! their duration elapses, and every state change is pushed to registered
//! listeners. Durations are looked up per content locator; media that was
//! never registered reports an unknown (zero) duration.

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    session::{
        EngineEvent, EngineEventKind, EngineItem, EngineListener, EngineStatus, RepeatMode,
        SessionHandle, Subscription,
    },
    time::Clock,
};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Pressing "previous" later than this into an item restarts it instead of
/// moving back.
pub const RESTART_THRESHOLD_MS: i64 = 3_000;

type ListenerMap = HashMap<u64, Arc<dyn EngineListener>>;

#[derive(Debug, Default)]
struct EngineState {
    items: Vec<EngineItem>,
    index: Option<usize>,
    prepared: bool,
    play_when_ready: bool,
    repeat_mode: RepeatMode,
    /// Position at `anchor_at_ms`.
    anchor_position_ms: i64,
    anchor_at_ms: i64,
}

impl EngineState {
    fn is_playing(&self) -> bool {
        self.play_when_ready && self.prepared && self.index.is_some()
    }

    fn position_at(&self, now_ms: i64) -> i64 {
        if self.is_playing() {
            self.anchor_position_ms + (now_ms - self.anchor_at_ms).max(0)
        } else {
            self.anchor_position_ms
        }
    }

    fn anchor(&mut self, position_ms: i64, now_ms: i64) {
        self.anchor_position_ms = position_ms.max(0);
        self.anchor_at_ms = now_ms;
    }

    fn current(&self) -> Option<&EngineItem> {
        self.index.and_then(|index| self.items.get(index))
    }
}

/// Clock-driven engine implementing [`SessionHandle`].
pub struct SimulatedEngine {
    state: Mutex<EngineState>,
    listeners: Arc<Mutex<ListenerMap>>,
    next_listener_id: Mutex<u64>,
    durations: RwLock<HashMap<String, i64>>,
    clock: Arc<dyn Clock>,
}

impl SimulatedEngine {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(EngineState::default()),
            listeners: Arc::new(Mutex::new(HashMap::new())),
            next_listener_id: Mutex::new(0),
            durations: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Declares how long the media behind `locator` plays.
    pub fn register_duration(&self, locator: impl Into<String>, duration_ms: u64) {
        let duration = i64::try_from(duration_ms).unwrap_or(i64::MAX);
        self.durations.write().insert(locator.into(), duration);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Stops playback and clears the playlist.
    pub fn reset(&self) {
        let events = {
            let mut state = self.state.lock();
            let was_playing = state.is_playing();
            *state = EngineState::default();
            let mut events = vec![EngineEventKind::MediaItemTransition];
            if was_playing {
                events.push(EngineEventKind::IsPlayingChanged);
            }
            events
        };
        self.dispatch(events);
    }

    fn now_ms(&self) -> i64 {
        self.clock.unix_timestamp_millis()
    }

    fn duration_of(&self, item: Option<&EngineItem>) -> i64 {
        item.and_then(|item| self.durations.read().get(&item.locator).copied())
            .unwrap_or(0)
    }

    /// Applies every item boundary crossed since the last anchor.
    fn settle(&self, state: &mut EngineState, now_ms: i64, events: &mut Vec<EngineEventKind>) {
        loop {
            if !state.is_playing() {
                return;
            }
            let duration = self.duration_of(state.current());
            let position = state.position_at(now_ms);
            if duration <= 0 || position < duration {
                return;
            }

            let overshoot = position - duration;
            let index = state.index.unwrap_or(0);
            let last = state.items.len().saturating_sub(1);
            match state.repeat_mode {
                RepeatMode::One => {
                    state.anchor(overshoot, now_ms);
                    events.push(EngineEventKind::PositionDiscontinuity);
                }
                RepeatMode::All => {
                    state.index = Some(if index >= last { 0 } else { index + 1 });
                    state.anchor(overshoot, now_ms);
                    events.push(EngineEventKind::MediaItemTransition);
                }
                RepeatMode::Off if index < last => {
                    state.index = Some(index + 1);
                    state.anchor(overshoot, now_ms);
                    events.push(EngineEventKind::MediaItemTransition);
                }
                RepeatMode::Off => {
                    state.anchor(duration, now_ms);
                    state.play_when_ready = false;
                    events.push(EngineEventKind::IsPlayingChanged);
                    return;
                }
            }
        }
    }

    fn snapshot(&self, state: &EngineState, now_ms: i64) -> EngineStatus {
        EngineStatus {
            is_playing: state.is_playing(),
            position_ms: state.position_at(now_ms),
            duration_ms: self.duration_of(state.current()),
            item_count: state.items.len(),
            current_item: state.current().cloned(),
            repeat_mode: state.repeat_mode,
        }
    }

    /// Runs `mutate` on settled state and dispatches the resulting events
    /// once the state lock is released.
    fn update<F>(&self, mutate: F)
    where
        F: FnOnce(&mut EngineState, i64, &mut Vec<EngineEventKind>),
    {
        let events = {
            let mut state = self.state.lock();
            let now = self.now_ms();
            let mut events = Vec::new();
            self.settle(&mut state, now, &mut events);
            mutate(&mut state, now, &mut events);
            events
        };
        self.dispatch(events);
    }

    fn dispatch(&self, kinds: Vec<EngineEventKind>) {
        if kinds.is_empty() {
            return;
        }
        let listeners: Vec<Arc<dyn EngineListener>> =
            self.listeners.lock().values().cloned().collect();
        if listeners.is_empty() {
            return;
        }

        let status = {
            let state = self.state.lock();
            self.snapshot(&state, self.now_ms())
        };
        for kind in kinds {
            trace!(?kind, "dispatching engine event");
            let event = EngineEvent::new(kind, status.clone());
            for listener in &listeners {
                listener.on_event(event.clone());
            }
        }
    }

    fn set_playing(state: &mut EngineState, now: i64, playing: bool, events: &mut Vec<EngineEventKind>) {
        let before = state.is_playing();
        let position = state.position_at(now);
        state.play_when_ready = playing;
        state.anchor(position, now);
        if state.is_playing() != before {
            events.push(EngineEventKind::IsPlayingChanged);
        }
    }
}

#[async_trait]
impl SessionHandle for SimulatedEngine {
    fn status(&self) -> EngineStatus {
        let events = {
            let mut state = self.state.lock();
            let now = self.now_ms();
            let mut events = Vec::new();
            self.settle(&mut state, now, &mut events);
            events
        };
        self.dispatch(events);

        let state = self.state.lock();
        self.snapshot(&state, self.now_ms())
    }

    fn add_listener(&self, listener: Arc<dyn EngineListener>) -> Subscription {
        let id = {
            let mut next = self.next_listener_id.lock();
            *next += 1;
            *next
        };
        self.listeners.lock().insert(id, listener);

        let listeners = Arc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners.lock().remove(&id);
            }
        })
    }

    async fn set_items(&self, items: Vec<EngineItem>, start_index: usize) -> Result<()> {
        debug!(count = items.len(), start_index, "engine: set items");
        self.update(|state, now, events| {
            let before = state.is_playing();
            state.index = if items.is_empty() {
                None
            } else {
                Some(start_index.min(items.len() - 1))
            };
            state.items = items;
            state.prepared = false;
            state.anchor(0, now);
            events.push(EngineEventKind::MediaItemTransition);
            if before != state.is_playing() {
                events.push(EngineEventKind::IsPlayingChanged);
            }
        });
        Ok(())
    }

    async fn prepare(&self) -> Result<()> {
        self.update(|state, now, events| {
            let before = state.is_playing();
            let position = state.position_at(now);
            state.prepared = state.index.is_some();
            state.anchor(position, now);
            if before != state.is_playing() {
                events.push(EngineEventKind::IsPlayingChanged);
            } else {
                events.push(EngineEventKind::Changed);
            }
        });
        Ok(())
    }

    async fn set_repeat_mode(&self, mode: RepeatMode) -> Result<()> {
        self.update(|state, _, events| {
            if state.repeat_mode != mode {
                state.repeat_mode = mode;
                events.push(EngineEventKind::Changed);
            }
        });
        Ok(())
    }

    async fn play(&self) -> Result<()> {
        self.update(|state, now, events| Self::set_playing(state, now, true, events));
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        self.update(|state, now, events| Self::set_playing(state, now, false, events));
        Ok(())
    }

    async fn seek_to(&self, position_ms: u64) -> Result<()> {
        let requested = i64::try_from(position_ms).unwrap_or(i64::MAX);
        let duration = {
            let state = self.state.lock();
            self.duration_of(state.current())
        };
        let target = if duration > 0 {
            requested.min(duration)
        } else {
            requested
        };
        debug!(position_ms = target, "engine: seek");
        self.update(|state, now, events| {
            if state.index.is_none() {
                return;
            }
            state.anchor(target, now);
            events.push(EngineEventKind::PositionDiscontinuity);
        });
        Ok(())
    }

    async fn skip_next(&self) -> Result<()> {
        self.update(|state, now, events| {
            let Some(index) = state.index else {
                return;
            };
            let next = if index + 1 < state.items.len() {
                Some(index + 1)
            } else if state.repeat_mode == RepeatMode::All {
                Some(0)
            } else {
                None
            };
            if let Some(next) = next {
                state.index = Some(next);
                state.anchor(0, now);
                events.push(EngineEventKind::MediaItemTransition);
            }
        });
        Ok(())
    }

    async fn skip_previous(&self) -> Result<()> {
        self.update(|state, now, events| {
            let Some(index) = state.index else {
                return;
            };
            if state.position_at(now) > RESTART_THRESHOLD_MS {
                state.anchor(0, now);
                events.push(EngineEventKind::PositionDiscontinuity);
                return;
            }
            let previous = if index > 0 {
                Some(index - 1)
            } else if state.repeat_mode == RepeatMode::All {
                Some(state.items.len() - 1)
            } else {
                None
            };
            state.anchor(0, now);
            match previous {
                Some(previous) => {
                    state.index = Some(previous);
                    events.push(EngineEventKind::MediaItemTransition);
                }
                None => events.push(EngineEventKind::PositionDiscontinuity),
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::time::ManualClock;

    struct Recorder(Mutex<Vec<EngineEvent>>);

    impl EngineListener for Recorder {
        fn on_event(&self, event: EngineEvent) {
            self.0.lock().push(event);
        }
    }

    fn items(n: usize) -> Vec<EngineItem> {
        (0..n)
            .map(|i| EngineItem::new(i.to_string(), format!("file:///music/{i}.mp3")))
            .collect()
    }

    fn engine_with(n: usize, duration_ms: u64) -> (Arc<SimulatedEngine>, ManualClock) {
        let clock = ManualClock::at_epoch();
        let engine = Arc::new(SimulatedEngine::new(Arc::new(clock.clone())));
        for i in 0..n {
            engine.register_duration(format!("file:///music/{i}.mp3"), duration_ms);
        }
        (engine, clock)
    }

    async fn load_and_play(engine: &SimulatedEngine, n: usize, start: usize, mode: RepeatMode) {
        engine.set_items(items(n), start).await.unwrap();
        engine.prepare().await.unwrap();
        engine.set_repeat_mode(mode).await.unwrap();
        engine.play().await.unwrap();
    }

    #[core_async::test]
    async fn position_follows_clock_while_playing() {
        let (engine, clock) = engine_with(2, 10_000);
        load_and_play(&engine, 2, 0, RepeatMode::Off).await;

        clock.advance_millis(1_250);
        let status = engine.status();
        assert!(status.is_playing);
        assert_eq!(status.position_ms, 1_250);
        assert_eq!(status.duration_ms, 10_000);

        engine.pause().await.unwrap();
        clock.advance_millis(5_000);
        assert_eq!(engine.status().position_ms, 1_250);
    }

    #[core_async::test]
    async fn auto_advance_wraps_with_repeat_all() {
        let (engine, clock) = engine_with(2, 1_000);
        load_and_play(&engine, 2, 1, RepeatMode::All).await;

        clock.advance_millis(1_200);
        let status = engine.status();
        assert_eq!(status.current_item_id(), Some("0"));
        assert_eq!(status.position_ms, 200);
    }

    #[core_async::test]
    async fn playback_stops_after_last_item_without_repeat() {
        let (engine, clock) = engine_with(1, 1_000);
        load_and_play(&engine, 1, 0, RepeatMode::Off).await;

        clock.advance_millis(5_000);
        let status = engine.status();
        assert!(!status.is_playing);
        assert_eq!(status.position_ms, 1_000);
    }

    #[core_async::test]
    async fn seek_is_clamped_to_duration() {
        let (engine, _clock) = engine_with(1, 4_000);
        load_and_play(&engine, 1, 0, RepeatMode::Off).await;

        engine.seek_to(9_000).await.unwrap();
        assert_eq!(engine.status().position_ms, 4_000);
    }

    #[core_async::test]
    async fn unknown_media_reports_zero_duration() {
        let clock = ManualClock::at_epoch();
        let engine = SimulatedEngine::new(Arc::new(clock));
        engine.set_items(items(1), 0).await.unwrap();
        assert_eq!(engine.status().duration_ms, 0);
    }

    #[core_async::test]
    async fn skip_previous_restarts_late_in_item() {
        let (engine, clock) = engine_with(3, 60_000);
        load_and_play(&engine, 3, 1, RepeatMode::Off).await;

        clock.advance_millis(4_000);
        engine.skip_previous().await.unwrap();
        let status = engine.status();
        assert_eq!(status.current_item_id(), Some("1"));
        assert_eq!(status.position_ms, 0);

        clock.advance_millis(1_000);
        engine.skip_previous().await.unwrap();
        assert_eq!(engine.status().current_item_id(), Some("0"));
    }

    #[core_async::test]
    async fn skip_next_stops_at_end_without_repeat() {
        let (engine, _clock) = engine_with(2, 60_000);
        load_and_play(&engine, 2, 1, RepeatMode::Off).await;

        engine.skip_next().await.unwrap();
        assert_eq!(engine.status().current_item_id(), Some("1"));
    }

    #[core_async::test]
    async fn listeners_receive_events_until_unsubscribed() {
        let (engine, _clock) = engine_with(2, 60_000);
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        let subscription = engine.add_listener(recorder.clone());
        assert_eq!(engine.listener_count(), 1);

        load_and_play(&engine, 2, 0, RepeatMode::All).await;
        {
            let events = recorder.0.lock();
            assert!(events
                .iter()
                .any(|e| e.kind == EngineEventKind::MediaItemTransition));
            let last = events.last().unwrap();
            assert_eq!(last.kind, EngineEventKind::IsPlayingChanged);
            assert!(last.status.is_playing);
        }

        subscription.unsubscribe();
        assert_eq!(engine.listener_count(), 0);
        let before = recorder.0.lock().len();
        engine.skip_next().await.unwrap();
        assert_eq!(recorder.0.lock().len(), before);
    }

    #[core_async::test]
    async fn listener_may_read_status_during_dispatch() {
        struct Reader(Arc<SimulatedEngine>, Mutex<Vec<bool>>);
        impl EngineListener for Reader {
            fn on_event(&self, _event: EngineEvent) {
                let playing = self.0.status().is_playing;
                self.1.lock().push(playing);
            }
        }

        let (engine, _clock) = engine_with(1, 60_000);
        let reader = Arc::new(Reader(Arc::clone(&engine), Mutex::new(Vec::new())));
        let _subscription = engine.add_listener(reader.clone());

        load_and_play(&engine, 1, 0, RepeatMode::Off).await;
        assert_eq!(reader.1.lock().last(), Some(&true));
    }
}
