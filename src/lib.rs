//=========================================================================
// Phoenix Engine Library Root
//
// This crate defines the public API surface of the Phoenix Engine.
//
// Responsibilities:
// - Expose the engine facade (`Engine`, `EngineBuilder`, `EngineHandle`)
// - Expose the gameplay framework under `core` (state machines, event
//   bus, timers, object pooling, AI brains)
// - Offer a `prelude` with the types most game code reaches for
//
// Typical usage:
// ```no_run
// use phoenix_engine::prelude::*;
//
// let handle = EngineBuilder::new()
//     .with_tps(60.0)
//     .build()
//     .init(|systems, _context| {
//         systems.register_system(LifetimeSweeper::new());
//     })
//     .spawn();
//
// handle.shutdown();
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` contains the gameplay systems and the logic-thread orchestrator.
// It is exposed publicly for extensibility, but most application code
// will go through the `prelude`.
//
pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `engine` defines the main engine entry point and runtime control.
//
mod engine;

//--- Public Exports ------------------------------------------------------
//
// Re-exports the engine facade so users can simply
// `use phoenix_engine::EngineBuilder;`.
//
pub use crate::core::ControlEvent;
pub use engine::{Engine, EngineBuilder, EngineConfig, EngineHandle};
