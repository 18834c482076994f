//=========================================================================
// Event Bus
//=========================================================================
//
// Typed publish/subscribe between systems.
//
// Architecture:
//   EventBus
//     ├─ listeners: TypeId → ordered listener list
//     └─ queued: deliveries deferred to the tick boundary
//
//=========================================================================

//=== Module Declarations =================================================

mod event_bus;
mod listener_list;

//=== Public API ==========================================================

pub use event_bus::{Event, EventBus, EventListener};

//=== GameEvent ===========================================================

/// General-purpose event identified only by its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEvent {
    pub name: String,
}

impl GameEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Builds and triggers a `GameEvent` on `bus` in one call.
    pub fn trigger(bus: &EventBus, name: impl Into<String>) {
        bus.trigger_event(Self::new(name));
    }
}

//=== Tests ===============================================================
