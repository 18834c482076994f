//=========================================================================
// Core Systems Orchestrator
//
// Central coordinator for all gameplay systems running on the logic
// thread.
//
// Responsibilities:
// - Own the registered systems and the shared GlobalContext
// - Run the fixed tick pipeline (time, scheduled tasks, systems, events)
// - Receive control messages (pause / resume / shutdown) over a channel
// - Maintain deterministic pacing using a fixed tick rate (TPS)
//
// Notes:
// The orchestrator can be stepped directly (deterministic, used by tests
// and tools) or moved onto a background thread. Communication with the
// owning thread happens only through message passing.
//
//=========================================================================

//=== Standard Library Imports ============================================
use std::thread;
use std::time::{Duration, Instant};

//=== External Crates =====================================================
use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use log::{debug, info};

//=== Module Declarations =================================================

pub mod ai;
pub mod config;
pub mod event_bus;
pub mod globals;
pub mod pooling;
pub mod state_machine;
pub mod time;

//=== Internal Modules ====================================================
pub use globals::{GlobalContext, GlobalSystems, System};

//=== ControlEvent ========================================================
//
// Messages accepted by a running logic thread.
//
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Stop ticking; the thread keeps waiting for messages.
    Pause,
    /// Resume ticking after a pause.
    Resume,
    /// Stop systems and end the thread.
    Shutdown,
}

//=== TickControl =========================================================
//
// Defines control flow for the core update loop.
// Each frame signals either to tick, to skip (paused), or to terminate.
//
pub(crate) enum TickControl {
    Continue,
    Paused,
    Exit,
}

//=== CoreSystemsOrchestrator =============================================
//
// Manages the lifetime and update scheduling of all registered systems.
//
pub(crate) struct CoreSystemsOrchestrator {
    systems: GlobalSystems,
    context: GlobalContext,
}

impl CoreSystemsOrchestrator {
    //--- Construction -----------------------------------------------------
    //
    // Wraps a context but does not yet start any system.
    //
    pub fn new(context: GlobalContext) -> Self {
        Self {
            systems: GlobalSystems::new(),
            context,
        }
    }

    pub fn init_systems<F>(&mut self, init_fn: F)
    where
        F: FnOnce(&mut GlobalSystems, &mut GlobalContext),
    {
        init_fn(&mut self.systems, &mut self.context);
        // Systems added to a running engine start here
        self.systems.start_pending(&mut self.context);
    }

    //--- Stepping ---------------------------------------------------------

    pub fn start(&mut self) {
        self.systems.start(&mut self.context);
    }

    pub fn stop(&mut self) {
        self.systems.stop(&mut self.context);
    }

    //--- tick() -----------------------------------------------------------
    //
    // One frame of the pipeline:
    //  1. Advance the clock
    //  2. Run scheduled tasks whose deadline has passed
    //  3. Update systems in registration order
    //  4. Deliver events queued during the frame
    //
    pub fn tick(&mut self, delta: f32) {
        //--- Step 1: Advance time ------------------------------------------
        self.context.time.advance(delta);
        let now = self.context.time.elapsed;

        //--- Step 2: Scheduled tasks ---------------------------------------
        for task in self.context.scheduler.take_due(now) {
            task(&mut self.context);
        }

        //--- Step 3: Update systems ----------------------------------------
        self.systems.update(&mut self.context);

        //--- Step 4: Flush deferred events ---------------------------------
        let delivered = self.context.events.flush_queued();
        if delivered > 0 {
            debug!("Delivered {} queued events on frame {}", delivered, self.context.time.frame);
        }
    }

    //--- spawn_core_thread() ---------------------------------------------
    //
    // Spawns the logic thread ticking all systems at a fixed TPS.
    //
    // Each frame:
    //  1. Drains control messages
    //  2. Ticks the pipeline unless paused
    //  3. Sleeps to maintain fixed pacing
    //  4. Exits cleanly on shutdown or when the sender is dropped
    //
    // The thread returns the number of frames it ticked.
    //
    pub fn spawn_core_thread(mut self, receiver: Receiver<ControlEvent>, tps: f64) -> thread::JoinHandle<u64> {
        let frame_duration = Duration::from_secs_f64(1.0 / tps);
        let delta = frame_duration.as_secs_f32();

        thread::spawn(move || {
            let mut paused = false;
            self.start();

            loop {
                let frame_start = Instant::now();

                //--- Step 1: Gather control messages -----------------------
                match Self::collect_control_events(&receiver, &mut paused, frame_duration) {
                    TickControl::Exit => {
                        info!("Core thread exiting.");
                        break;
                    }
                    TickControl::Paused => continue,
                    TickControl::Continue => {}
                }

                //--- Step 2: Update systems --------------------------------
                self.tick(delta);

                //--- Step 3: Maintain deterministic pacing ----------------
                let elapsed = frame_start.elapsed();
                if elapsed < frame_duration {
                    thread::sleep(frame_duration - elapsed);
                }
            }

            self.stop();
            self.context.time.frame
        })
    }

    //--- collect_control_events() ----------------------------------------
    //
    // Applies every pending control message. While paused, waits up to one
    // frame for the next message instead of spinning.
    //
    fn collect_control_events(
        receiver: &Receiver<ControlEvent>,
        paused: &mut bool,
        frame_duration: Duration,
    ) -> TickControl {
        if *paused {
            match receiver.recv_timeout(frame_duration) {
                Ok(event) => {
                    if let TickControl::Exit = Self::apply(event, paused) {
                        return TickControl::Exit;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => return TickControl::Exit,
                Err(RecvTimeoutError::Timeout) => {}
            }
        }

        // Drain additional messages queued since the last frame
        loop {
            match receiver.try_recv() {
                Ok(event) => {
                    if let TickControl::Exit = Self::apply(event, paused) {
                        return TickControl::Exit;
                    }
                }
                Err(TryRecvError::Disconnected) => return TickControl::Exit,
                Err(TryRecvError::Empty) => break,
            }
        }

        if *paused {
            TickControl::Paused
        } else {
            TickControl::Continue
        }
    }

    fn apply(event: ControlEvent, paused: &mut bool) -> TickControl {
        match event {
            ControlEvent::Pause => {
                if !*paused {
                    info!("Core thread paused");
                }
                *paused = true;
            }
            ControlEvent::Resume => {
                if *paused {
                    info!("Core thread resumed");
                }
                *paused = false;
            }
            ControlEvent::Shutdown => return TickControl::Exit,
        }
        TickControl::Continue
    }

    //--- Accessors --------------------------------------------------------

    pub fn systems(&self) -> &GlobalSystems {
        &self.systems
    }

    pub fn context(&self) -> &GlobalContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut GlobalContext {
        &mut self.context
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event_bus::GameEvent;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct Recorder {
        log: Arc<Mutex<Vec<String>>>,
    }

    impl System for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn update(&mut self, context: &mut GlobalContext) {
            self.log.lock().push(format!("update {}", context.time.frame));
            context.events.queue_event(GameEvent::new("queued"));
        }
    }

    #[test]
    fn tick_pipeline_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut orchestrator = CoreSystemsOrchestrator::new(GlobalContext::new());

        let events = Arc::clone(&log);
        orchestrator.context().events.subscribe(move |e: &GameEvent| {
            events.lock().push(format!("event {}", e.name));
        });
        let tasks = Arc::clone(&log);
        orchestrator
            .context_mut()
            .scheduler
            .schedule_at(0.0, move |ctx| tasks.lock().push(format!("task {}", ctx.time.frame)));
        orchestrator.init_systems(|systems, _| {
            systems.register_system(Recorder { log: Arc::clone(&log) });
        });

        orchestrator.start();
        orchestrator.tick(0.5);

        assert_eq!(*log.lock(), vec!["task 1", "update 1", "event queued"]);
        assert_eq!(orchestrator.context().time.elapsed, 0.5);
    }

    #[test]
    fn control_messages_toggle_pause_and_exit() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut paused = false;
        let frame = Duration::from_millis(1);

        tx.send(ControlEvent::Pause).unwrap();
        assert!(matches!(
            CoreSystemsOrchestrator::collect_control_events(&rx, &mut paused, frame),
            TickControl::Paused
        ));

        tx.send(ControlEvent::Resume).unwrap();
        assert!(matches!(
            CoreSystemsOrchestrator::collect_control_events(&rx, &mut paused, frame),
            TickControl::Continue
        ));

        tx.send(ControlEvent::Shutdown).unwrap();
        assert!(matches!(
            CoreSystemsOrchestrator::collect_control_events(&rx, &mut paused, frame),
            TickControl::Exit
        ));

        drop(tx);
        assert!(matches!(
            CoreSystemsOrchestrator::collect_control_events(&rx, &mut paused, frame),
            TickControl::Exit
        ));
    }
}
