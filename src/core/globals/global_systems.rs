//=========================================================================
// Global Systems
//=========================================================================
//
// Container for engine-level systems with logic.
//
// Systems are updated in registration order, once per tick, after the
// scheduler has run due tasks. Systems operate on GlobalContext data.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::{GlobalContext, System};

//=== GlobalSystems =======================================================

struct Registered {
    system: Box<dyn System>,
    started: bool,
}

/// Ordered container of engine-level logic systems.
///
/// Systems registered after the container has started receive `on_start`
/// before their first update.
pub struct GlobalSystems {
    systems: Vec<Registered>,
    started: bool,
}

impl GlobalSystems {
    /// Creates an empty container.
    ///
    /// This is typically called internally by the engine. Users should access
    /// systems via [`crate::Engine::init`] instead.
    pub(crate) fn new() -> Self {
        Self {
            systems: Vec::new(),
            started: false,
        }
    }

    //--- Registration -----------------------------------------------------

    /// Registers a system at the end of the update order.
    ///
    /// A system whose name is already registered replaces the old one in
    /// place, keeping its position.
    pub fn register_system<T>(&mut self, system: T)
    where
        T: System + 'static,
    {
        let name = system.name().to_owned();
        let entry = Registered {
            system: Box::new(system),
            started: false,
        };

        if let Some(slot) = self.systems.iter_mut().find(|r| r.system.name() == name) {
            warn!("System '{}' was already registered and has been replaced", name);
            *slot = entry;
            return;
        }

        debug!("Registered system '{}'", name);
        self.systems.push(entry);
    }

    /// Removes a system by name. Returns `false` if none matched.
    pub fn remove_system(&mut self, name: &str) -> bool {
        let before = self.systems.len();
        self.systems.retain(|r| r.system.name() != name);
        before != self.systems.len()
    }

    //--- Lifecycle --------------------------------------------------------

    /// Calls `on_start` on every system. Subsequent calls only start
    /// systems registered since.
    pub(crate) fn start(&mut self, context: &mut GlobalContext) {
        self.started = true;
        self.start_pending(context);
    }

    /// Starts systems registered after [`Self::start`]. Does nothing while
    /// the container is stopped.
    pub(crate) fn start_pending(&mut self, context: &mut GlobalContext) {
        if !self.started {
            return;
        }

        for entry in self.systems.iter_mut().filter(|r| !r.started) {
            debug!("Starting system '{}'", entry.system.name());
            entry.system.on_start(context);
            entry.started = true;
        }
    }

    /// Updates all systems for the current tick.
    pub(crate) fn update(&mut self, context: &mut GlobalContext) {
        self.start_pending(context);

        for entry in &mut self.systems {
            entry.system.update(context);
        }
    }

    /// Calls `on_stop` on every started system in reverse order.
    pub(crate) fn stop(&mut self, context: &mut GlobalContext) {
        if !self.started {
            return;
        }
        self.started = false;

        for entry in self.systems.iter_mut().rev().filter(|r| r.started) {
            debug!("Stopping system '{}'", entry.system.name());
            entry.system.on_stop(context);
            entry.started = false;
        }
    }

    //--- Queries ----------------------------------------------------------

    pub fn names(&self) -> Vec<&str> {
        self.systems.iter().map(|r| r.system.name()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.systems.iter().any(|r| r.system.name() == name)
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

//=========================================================================
// Tests
//=========================================================================
