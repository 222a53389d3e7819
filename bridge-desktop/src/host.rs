//! Engine host and the session bridge that connects to it.
//!
//! [`EngineHost`] plays the role of the long-lived media service: it owns one
//! engine per [`EngineLocator`] and outlives any controller connected to it.
//! [`LocalSessionBridge`] hands out handles to those engines, optionally after
//! a delay, never, or not at all, so controllers can be exercised against
//! every connection outcome.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    session::{
        EngineItem, EngineListener, EngineLocator, EngineStatus, RepeatMode, SessionBridge,
        SessionHandle, Subscription,
    },
    time::{Clock, SystemClock},
};
use core_async::time::{sleep, Duration};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::engine::SimulatedEngine;

/// Registry of running engines keyed by locator.
pub struct EngineHost {
    engines: Mutex<HashMap<EngineLocator, Arc<SimulatedEngine>>>,
    clock: Arc<dyn Clock>,
    connections: Mutex<HashMap<EngineLocator, Arc<AtomicUsize>>>,
    alive: Arc<AtomicBool>,
}

impl EngineHost {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            engines: Mutex::new(HashMap::new()),
            clock,
            connections: Mutex::new(HashMap::new()),
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Returns the engine for `locator`, starting it if needed.
    pub fn engine(&self, locator: &EngineLocator) -> Arc<SimulatedEngine> {
        let mut engines = self.engines.lock();
        Arc::clone(engines.entry(locator.clone()).or_insert_with(|| {
            info!(%locator, "starting playback engine");
            Arc::new(SimulatedEngine::new(Arc::clone(&self.clock)))
        }))
    }

    pub fn is_running(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Handles currently held by controllers, across every engine.
    pub fn active_connections(&self) -> usize {
        self.connections
            .lock()
            .values()
            .map(|count| count.load(Ordering::SeqCst))
            .sum()
    }

    /// Handles currently held against the engine behind `locator`.
    pub fn connection_count(&self, locator: &EngineLocator) -> usize {
        self.connections
            .lock()
            .get(locator)
            .map_or(0, |count| count.load(Ordering::SeqCst))
    }

    /// A bridge that connects controllers to this host.
    pub fn bridge(self: &Arc<Self>) -> LocalSessionBridge {
        LocalSessionBridge::new(Arc::clone(self))
    }

    /// Opens a new connection to the engine behind `locator`.
    pub fn connect(&self, locator: &EngineLocator) -> Result<Arc<dyn SessionHandle>> {
        if !self.is_running() {
            return Err(BridgeError::NotAvailable(format!(
                "engine host stopped, cannot reach {locator}"
            )));
        }
        let engine = self.engine(locator);
        let counter = Arc::clone(
            self.connections
                .lock()
                .entry(locator.clone())
                .or_insert_with(|| Arc::new(AtomicUsize::new(0))),
        );
        let active = counter.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(%locator, active, "controller connected");

        Ok(Arc::new(HostedHandle {
            engine,
            connections: counter,
            alive: Arc::clone(&self.alive),
        }))
    }

    /// Stops every engine. Existing handles keep answering status reads but
    /// reject commands.
    pub fn shutdown(&self) {
        if !self.alive.swap(false, Ordering::SeqCst) {
            return;
        }
        let engines: Vec<_> = self.engines.lock().drain().map(|(_, e)| e).collect();
        info!(count = engines.len(), "stopping playback engines");
        for engine in engines {
            engine.reset();
        }
    }
}

impl Default for EngineHost {
    fn default() -> Self {
        Self::new()
    }
}

/// Controller-side view of a hosted engine. Dropping it releases the
/// connection.
struct HostedHandle {
    engine: Arc<SimulatedEngine>,
    connections: Arc<AtomicUsize>,
    alive: Arc<AtomicBool>,
}

impl HostedHandle {
    fn ensure_alive(&self, command: &str) -> Result<()> {
        if self.alive.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BridgeError::Disconnected(format!(
                "{command} rejected: engine host stopped"
            )))
        }
    }
}

impl Drop for HostedHandle {
    fn drop(&mut self) {
        self.connections.fetch_sub(1, Ordering::SeqCst);
        debug!("controller released");
    }
}

#[async_trait]
impl SessionHandle for HostedHandle {
    fn status(&self) -> EngineStatus {
        self.engine.status()
    }

    fn add_listener(&self, listener: Arc<dyn EngineListener>) -> Subscription {
        self.engine.add_listener(listener)
    }

    async fn set_items(&self, items: Vec<EngineItem>, start_index: usize) -> Result<()> {
        self.ensure_alive("set_items")?;
        self.engine.set_items(items, start_index).await
    }

    async fn prepare(&self) -> Result<()> {
        self.ensure_alive("prepare")?;
        self.engine.prepare().await
    }

    async fn set_repeat_mode(&self, mode: RepeatMode) -> Result<()> {
        self.ensure_alive("set_repeat_mode")?;
        self.engine.set_repeat_mode(mode).await
    }

    async fn play(&self) -> Result<()> {
        self.ensure_alive("play")?;
        self.engine.play().await
    }

    async fn pause(&self) -> Result<()> {
        self.ensure_alive("pause")?;
        self.engine.pause().await
    }

    async fn seek_to(&self, position_ms: u64) -> Result<()> {
        self.ensure_alive("seek_to")?;
        self.engine.seek_to(position_ms).await
    }

    async fn skip_next(&self) -> Result<()> {
        self.ensure_alive("skip_next")?;
        self.engine.skip_next().await
    }

    async fn skip_previous(&self) -> Result<()> {
        self.ensure_alive("skip_previous")?;
        self.engine.skip_previous().await
    }
}

/// How [`LocalSessionBridge::connect`] resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectBehavior {
    Immediate,
    /// Resolve after the given delay.
    Delayed(Duration),
    /// Never resolve.
    Never,
    /// Fail with the given reason.
    Fail(String),
}

/// [`SessionBridge`] backed by an in-process [`EngineHost`].
pub struct LocalSessionBridge {
    host: Arc<EngineHost>,
    behavior: Mutex<ConnectBehavior>,
    attempts: AtomicUsize,
}

impl LocalSessionBridge {
    pub fn new(host: Arc<EngineHost>) -> Self {
        Self::with_behavior(host, ConnectBehavior::Immediate)
    }

    pub fn with_behavior(host: Arc<EngineHost>, behavior: ConnectBehavior) -> Self {
        Self {
            host,
            behavior: Mutex::new(behavior),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn host(&self) -> &Arc<EngineHost> {
        &self.host
    }

    /// Changes how later connection attempts resolve.
    pub fn set_behavior(&self, behavior: ConnectBehavior) {
        *self.behavior.lock() = behavior;
    }

    pub fn connect_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionBridge for LocalSessionBridge {
    async fn connect(&self, locator: &EngineLocator) -> Result<Arc<dyn SessionHandle>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let behavior = self.behavior.lock().clone();
        match behavior {
            ConnectBehavior::Immediate => {}
            ConnectBehavior::Delayed(delay) => sleep(delay).await,
            ConnectBehavior::Never => {
                core_async::future::pending::<()>().await;
            }
            ConnectBehavior::Fail(reason) => {
                warn!(%locator, %reason, "refusing controller connection");
                return Err(BridgeError::NotAvailable(reason));
            }
        }
        self.host.connect(locator)
    }
}
