//=========================================================================
// State Machine
//=========================================================================
//
// Generic typed state holder with change notification.
//
// A machine is exclusively owned by the component driving it (a brain,
// a spawner, a gameplay system). Transitions are instantaneous and
// synchronous with the caller; there are no pending states.
//
// Flow:
//   change_state(new) → previous ← current, current ← new
//                     → StateChangeEvent<T> on the bus (if enabled)
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::trace;

//=== Internal Dependencies ===============================================

use crate::core::event_bus::EventBus;

//=== State Key Trait =====================================================

/// Marker trait for state identifiers.
///
/// Typically implemented by game-specific enums. `Default` provides the
/// value both current and previous state hold before the first change.
pub trait StateKey: Clone + Copy + Eq + Hash + Debug + Default + Send + Sync + 'static {}

//=== MachineId ===========================================================

/// Process-unique identifier of a state machine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MachineId(u64);

impl MachineId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        MachineId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

//=== StateChangeEvent ====================================================

/// Published on the bus whenever a machine with events enabled changes state.
#[derive(Debug, Clone, PartialEq)]
pub struct StateChangeEvent<T: StateKey> {
    /// Label of the owner driving the machine.
    pub target: Arc<str>,
    /// The machine that changed.
    pub machine: MachineId,
    pub new_state: T,
    pub old_state: T,
}

//=== StateMachine ========================================================

/// Generic state machine tracking the current and previous state.
///
/// # Example
///
/// ```rust
/// # use std::sync::Arc;
/// # use phoenix_engine::prelude::*;
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// enum Movement { #[default] Idle, Walking }
/// impl StateKey for Movement {}
///
/// let bus = Arc::new(EventBus::new());
/// let mut movement = StateMachine::new("player", bus, true);
/// movement.change_state(Movement::Walking);
/// assert_eq!(movement.previous_state(), Movement::Idle);
/// ```
pub struct StateMachine<T: StateKey> {
    id: MachineId,
    target: Arc<str>,
    bus: Arc<EventBus>,
    trigger_events: bool,
    current: T,
    previous: T,
}

impl<T: StateKey> StateMachine<T> {
    //--- Construction -----------------------------------------------------

    /// Creates a machine owned by `target`, publishing on `bus` when
    /// `trigger_events` is set.
    pub fn new(target: impl Into<Arc<str>>, bus: Arc<EventBus>, trigger_events: bool) -> Self {
        Self {
            id: MachineId::next(),
            target: target.into(),
            bus,
            trigger_events,
            current: T::default(),
            previous: T::default(),
        }
    }

    //--- Transitions ------------------------------------------------------

    /// Moves to `new_state`.
    ///
    /// No-op when `new_state` equals the current state. Returns `true`
    /// if the state actually changed.
    pub fn change_state(&mut self, new_state: T) -> bool {
        if new_state == self.current {
            return false;
        }

        trace!("[{}] {:?} -> {:?}", self.target, self.current, new_state);

        self.previous = self.current;
        self.current = new_state;
        self.notify();
        true
    }

    /// Returns to the previously recorded state.
    ///
    /// Current and previous are swapped, so a second call undoes the first.
    /// Returns `true` if the state actually changed.
    pub fn restore_previous_state(&mut self) -> bool {
        if self.previous == self.current {
            return false;
        }

        std::mem::swap(&mut self.current, &mut self.previous);
        self.notify();
        true
    }

    fn notify(&self) {
        if !self.trigger_events {
            return;
        }

        self.bus.trigger_event(StateChangeEvent {
            target: Arc::clone(&self.target),
            machine: self.id,
            new_state: self.current,
            old_state: self.previous,
        });
    }

    //--- Accessors --------------------------------------------------------

    pub fn current_state(&self) -> T {
        self.current
    }

    pub fn previous_state(&self) -> T {
        self.previous
    }

    pub fn id(&self) -> MachineId {
        self.id
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn trigger_events(&self) -> bool {
        self.trigger_events
    }

    pub fn set_trigger_events(&mut self, enabled: bool) {
        self.trigger_events = enabled;
    }
}

impl<T: StateKey> Debug for StateMachine<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachine")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("current", &self.current)
            .field("previous", &self.previous)
            .finish()
    }
}

//=========================================================================
// Tests
//=========================================================================
