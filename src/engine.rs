//=========================================================================
// Phoenix Engine
//
// Main entry point and coordinator for the engine.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──run_ticks(n)──> [deterministic]
//         │                          │
//         ├─ with_tps()              └──spawn()──> EngineHandle
//         ├─ with_channel_capacity()                 ├─ pause() / resume()
//         └─ from_config()                           └─ shutdown() → ticks
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::core::config::{self, ConfigError};
use crate::core::event_bus::EventBus;
use crate::core::{ControlEvent, CoreSystemsOrchestrator, GlobalContext, GlobalSystems};

//=== EngineConfig ========================================================

/// Serializable engine pacing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Logic ticks per second.
    pub tps: f64,
    /// Capacity of the control channel to the logic thread.
    pub channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tps: 60.0,
            channel_capacity: 128,
        }
    }
}

impl EngineConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let parsed: Self = config::from_json(text)?;
        parsed.validate()?;
        Ok(parsed)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tps > 0.0) {
            return Err(ConfigError::Invalid(format!("TPS must be positive, got {}", self.tps)));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid("Channel capacity must be positive".into()));
        }
        Ok(())
    }
}

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// - **TPS**: 60.0 (logic updates per second)
/// - **Channel capacity**: 128 control messages
///
/// # Examples
///
/// Deterministic stepping:
/// ```
/// use phoenix_engine::EngineBuilder;
///
/// let mut engine = EngineBuilder::new().with_tps(30.0).build();
/// engine.run_ticks(30);
/// assert_eq!(engine.context().time.frame, 30);
/// ```
///
/// With initialization:
/// ```
/// # use phoenix_engine::prelude::*;
/// let sweeper = LifetimeSweeper::new();
///
/// let engine = EngineBuilder::new()
///     .build()
///     .init(|systems, _context| {
///         systems.register_system(sweeper);
///     });
/// assert!(engine.systems().contains("lifetime_sweeper"));
/// ```
pub struct EngineBuilder {
    tps: f64,
    channel_capacity: usize,
    events: Option<Arc<EventBus>>,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            tps: 60.0,
            channel_capacity: 128,
            events: None,
        }
    }

    /// Creates a builder from validated configuration.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new()
            .with_tps(config.tps)
            .with_channel_capacity(config.channel_capacity))
    }

    /// Sets the target ticks per second for the logic thread.
    ///
    /// Also fixes the delta handed to systems: every tick advances the
    /// clock by `1 / tps` seconds.
    ///
    /// Default: 60.0
    ///
    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn with_tps(mut self, tps: f64) -> Self {
        assert!(tps > 0.0, "TPS must be positive, got {}", tps);
        self.tps = tps;
        self
    }

    /// Sets the capacity of the control channel to the logic thread.
    ///
    /// Default: 128
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    /// Shares an existing event bus instead of creating one.
    pub fn with_event_bus(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    /// Builds the engine instance.
    pub fn build(self) -> Engine {
        info!("Building engine (TPS: {}, channel: {})", self.tps, self.channel_capacity);

        let context = match self.events {
            Some(events) => GlobalContext::with_bus(events),
            None => GlobalContext::new(),
        };

        Engine {
            orchestrator: CoreSystemsOrchestrator::new(context),
            tps: self.tps,
            channel_capacity: self.channel_capacity,
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Engine ==============================================================

/// Phoenix Engine runtime.
///
/// ```text
/// Engine
///   └─► CoreSystemsOrchestrator
///         ├─ GlobalContext: FrameTime, EventBus, Scheduler
///         └─ GlobalSystems: poolers, sweepers, agents...
///
/// run_ticks(n): steps on the calling thread
/// spawn():      moves the orchestrator to a logic thread @ TPS
/// ```
pub struct Engine {
    orchestrator: CoreSystemsOrchestrator,
    tps: f64,
    channel_capacity: usize,
}

impl Engine {
    //--- Initialization ---------------------------------------------------

    /// Registers systems and listeners before the engine runs.
    pub fn init<F>(mut self, init_fn: F) -> Self
    where
        F: FnOnce(&mut GlobalSystems, &mut GlobalContext),
    {
        info!("Initializing engine systems");

        self.orchestrator.init_systems(init_fn);

        info!("Engine initialization complete");
        self
    }

    //--- Deterministic Execution ------------------------------------------

    /// Runs `count` ticks on the calling thread with a fixed delta of
    /// `1 / tps`. Systems are started on the first call.
    pub fn run_ticks(&mut self, count: u64) {
        let delta = self.delta();
        self.orchestrator.start();
        for _ in 0..count {
            self.orchestrator.tick(delta);
        }
    }

    /// Calls `on_stop` on every started system.
    pub fn stop(&mut self) {
        self.orchestrator.stop();
    }

    //--- Threaded Execution -----------------------------------------------

    /// Moves the engine onto a background logic thread.
    ///
    /// # Lifecycle
    ///
    /// 1. Creates the bounded control channel
    /// 2. Spawns the logic thread running at the configured TPS
    /// 3. Returns a handle; `shutdown()` stops systems and joins
    pub fn spawn(self) -> EngineHandle {
        info!("Starting engine runtime (TPS: {})", self.tps);

        //--- 1. Create control channel ------------------------------------
        let (tx, rx): (Sender<ControlEvent>, Receiver<ControlEvent>) = bounded(self.channel_capacity);

        //--- 2. Spawn the core logic thread -------------------------------
        let events = Arc::clone(&self.orchestrator.context().events);
        let thread = self.orchestrator.spawn_core_thread(rx, self.tps);
        info!("Core logic thread spawned");

        EngineHandle {
            sender: tx,
            thread: Some(thread),
            events,
        }
    }

    //--- Accessors --------------------------------------------------------

    pub fn tps(&self) -> f64 {
        self.tps
    }

    /// Seconds each tick advances the clock.
    pub fn delta(&self) -> f32 {
        (1.0 / self.tps) as f32
    }

    pub fn events(&self) -> Arc<EventBus> {
        Arc::clone(&self.orchestrator.context().events)
    }

    pub fn context(&self) -> &GlobalContext {
        self.orchestrator.context()
    }

    pub fn context_mut(&mut self) -> &mut GlobalContext {
        self.orchestrator.context_mut()
    }

    pub fn systems(&self) -> &GlobalSystems {
        self.orchestrator.systems()
    }
}

//=== EngineHandle ========================================================

/// Control handle for an engine running on its logic thread.
///
/// Dropping the handle shuts the thread down.
pub struct EngineHandle {
    sender: Sender<ControlEvent>,
    thread: Option<JoinHandle<u64>>,
    events: Arc<EventBus>,
}

impl EngineHandle {
    /// Stops ticking until [`EngineHandle::resume`].
    pub fn pause(&self) -> bool {
        self.send(ControlEvent::Pause)
    }

    pub fn resume(&self) -> bool {
        self.send(ControlEvent::Resume)
    }

    /// Bus shared with the logic thread. Events queued here are delivered
    /// at the end of the next tick.
    pub fn events(&self) -> Arc<EventBus> {
        Arc::clone(&self.events)
    }

    /// Stops the logic thread and returns the number of ticks it ran.
    pub fn shutdown(mut self) -> u64 {
        self.join()
    }

    fn send(&self, event: ControlEvent) -> bool {
        match self.sender.send(event) {
            Ok(()) => true,
            Err(_) => {
                warn!("Logic thread is gone; dropped {:?}", event);
                false
            }
        }
    }

    fn join(&mut self) -> u64 {
        let Some(thread) = self.thread.take() else {
            return 0;
        };

        // A disconnected channel also stops the thread
        let _ = self.sender.send(ControlEvent::Shutdown);

        match thread.join() {
            Ok(ticks) => {
                info!("Core thread terminated cleanly after {} ticks", ticks);
                ticks
            }
            Err(e) => {
                error!("Core thread panicked: {:?}", e);
                0
            }
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.join();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ai::{Agent, AiAction, AiBrainBuilder, BrainStatus};
    use crate::core::System;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    struct Counter(Arc<AtomicU64>);

    impl System for Counter {
        fn name(&self) -> &str {
            "counter"
        }

        fn update(&mut self, _context: &mut GlobalContext) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    //=====================================================================
    // EngineBuilder Tests
    //=====================================================================

    #[test]
    fn default_engine_steps_sixty_times_a_second() {
        let mut engine = EngineBuilder::default().build();
        assert_eq!(engine.context().time.frame, 0);
        assert!(engine.context().scheduler.is_empty());
        assert!(engine.systems().is_empty());

        engine.run_ticks(60);
        assert_eq!(engine.context().time.frame, 60);
        assert!((engine.context().time.elapsed - 1.0).abs() < 1e-4);
    }

    #[test]
    fn shared_bus_reaches_context_and_handle() {
        let bus = Arc::new(EventBus::new());
        let engine = EngineBuilder::new().with_event_bus(Arc::clone(&bus)).build();
        assert!(Arc::ptr_eq(&engine.events(), &bus));

        let handle = engine.spawn();
        assert!(Arc::ptr_eq(&handle.events(), &bus));
        handle.shutdown();
    }

    #[test]
    #[should_panic(expected = "TPS must be positive")]
    fn nan_tps_is_rejected() {
        EngineBuilder::new().with_tps(f64::NAN);
    }

    #[test]
    fn from_config_validates() {
        let config = EngineConfig::from_json(r#"{ "tps": 30.0 }"#).unwrap();
        let builder = EngineBuilder::from_config(&config).unwrap();
        assert_eq!(builder.tps, 30.0);
        assert_eq!(builder.channel_capacity, 128);

        let bad = EngineConfig { tps: 0.0, ..Default::default() };
        assert!(matches!(EngineBuilder::from_config(&bad), Err(ConfigError::Invalid(_))));

        let closed = EngineConfig::from_json(r#"{ "channel_capacity": 0 }"#);
        assert!(matches!(closed, Err(ConfigError::Invalid(_))));
    }

    //=====================================================================
    // Engine Tests
    //=====================================================================

    #[test]
    fn run_ticks_uses_fixed_delta() {
        let ticks = Arc::new(AtomicU64::new(0));
        let counter = Counter(Arc::clone(&ticks));
        let mut engine = EngineBuilder::new()
            .with_tps(4.0)
            .build()
            .init(|systems, _| systems.register_system(counter));

        engine.run_ticks(8);

        assert_eq!(ticks.load(Ordering::SeqCst), 8);
        assert_eq!(engine.context().time.delta, 0.25);
        assert_eq!(engine.context().time.elapsed, 2.0);
    }

    #[test]
    fn agent_added_after_start_runs() {
        struct Bump;
        impl AiAction<Arc<AtomicUsize>> for Bump {
            fn perform_action(&mut self, runs: &mut Arc<AtomicUsize>, _status: &BrainStatus) {
                runs.fetch_add(1, Ordering::SeqCst);
            }
        }

        let runs = Arc::new(AtomicUsize::new(0));
        let mut builder: AiBrainBuilder<Arc<AtomicUsize>> = AiBrainBuilder::new("late");
        let bump = builder.add_action(Bump);
        builder.state("Working").action(bump);
        let agent = Agent::new("late", builder.build().unwrap(), Arc::clone(&runs));

        let mut engine = EngineBuilder::new().with_tps(10.0).build();
        engine.run_ticks(1);
        let mut engine = engine.init(|systems, _| systems.register_system(agent));
        engine.run_ticks(5);

        assert_eq!(runs.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn spawned_engine_reports_ticks_on_shutdown() {
        let ticks = Arc::new(AtomicU64::new(0));
        let counter = Counter(Arc::clone(&ticks));
        let handle = EngineBuilder::new()
            .with_tps(500.0)
            .build()
            .init(|systems, _| systems.register_system(counter))
            .spawn();

        thread::sleep(Duration::from_millis(40));
        let reported = handle.shutdown();

        assert!(reported > 0);
        assert_eq!(reported, ticks.load(Ordering::SeqCst));
    }

    #[test]
    fn paused_engine_does_not_tick() {
        let ticks = Arc::new(AtomicU64::new(0));
        let counter = Counter(Arc::clone(&ticks));
        let handle = EngineBuilder::new()
            .with_tps(500.0)
            .build()
            .init(|systems, _| systems.register_system(counter))
            .spawn();

        assert!(handle.pause());
        thread::sleep(Duration::from_millis(30));
        let frozen = ticks.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(ticks.load(Ordering::SeqCst), frozen);

        assert!(handle.resume());
        thread::sleep(Duration::from_millis(30));
        assert!(ticks.load(Ordering::SeqCst) > frozen);

        handle.shutdown();
    }
}
