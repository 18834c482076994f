//=========================================================================
// Global Engine State
//=========================================================================
//
// Separates systems (logic components) from context (shared data).
//
// Architecture:
//   GlobalSystems: ordered Vec<Box<dyn System>> (owned by the engine)
//   GlobalContext: FrameTime + EventBus + Scheduler (passed to systems)
//
//=========================================================================

//=== Module Declarations =================================================

mod global_context;
mod global_systems;

//=== Public API ==========================================================

pub use global_context::GlobalContext;
pub use global_systems::GlobalSystems;

//=== System Trait ========================================================

/// Unit of per-tick game logic driven by the engine.
///
/// Systems are registered in [`GlobalSystems`] and updated in registration
/// order. Poolers, spawners, brains and sweepers all plug in here.
///
/// # Minimal Implementation
///
/// ```rust
/// # use phoenix_engine::prelude::*;
/// struct Heartbeat;
///
/// impl System for Heartbeat {
///     fn name(&self) -> &str {
///         "heartbeat"
///     }
///
///     fn update(&mut self, context: &mut GlobalContext) {
///         GameEvent::trigger(&context.events, "beat");
///     }
/// }
/// ```
pub trait System: Send {
    /// Unique name used for logging and duplicate detection.
    fn name(&self) -> &str;

    /// Called once before the first tick.
    fn on_start(&mut self, _context: &mut GlobalContext) {}

    /// Called every tick.
    fn update(&mut self, context: &mut GlobalContext);

    /// Called once when the engine stops.
    fn on_stop(&mut self, _context: &mut GlobalContext) {}
}
