//=========================================================================
// Global Context
//=========================================================================
//
// Shared data container for systems.
//
// Contains state data that systems read/write:
// - time: Logical clock for the current tick
// - events: Typed event bus shared with every publisher
// - scheduler: Deadline queue for deferred work
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

//=== Internal Dependencies ===============================================

use crate::core::event_bus::EventBus;
use crate::core::time::{FrameTime, Scheduler};

//=== GlobalContext =======================================================

/// Shared context data accessible to systems during updates.
///
/// Systems receive `&mut GlobalContext` during their lifecycle methods.
/// This separates system-accessible data from the systems themselves.
pub struct GlobalContext {
    /// Logical clock, advanced by the engine before any system runs.
    pub time: FrameTime,

    /// Event bus for cross-system notifications.
    ///
    /// Reference counted so state machines and brains can publish without
    /// borrowing the context.
    pub events: Arc<EventBus>,

    /// Deferred tasks, run at the start of the tick their deadline falls in.
    pub scheduler: Scheduler,
}

impl GlobalContext {
    /// Creates a new context with a fresh bus and clock at zero.
    pub fn new() -> Self {
        Self::with_bus(Arc::new(EventBus::new()))
    }

    /// Creates a context sharing an existing bus.
    pub fn with_bus(events: Arc<EventBus>) -> Self {
        Self {
            time: FrameTime::new(),
            events,
            scheduler: Scheduler::new(),
        }
    }

    /// Seconds since the clock started.
    pub fn now(&self) -> f64 {
        self.time.elapsed
    }
}

impl Default for GlobalContext {
    fn default() -> Self {
        Self::new()
    }
}
