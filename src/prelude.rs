//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use phoenix_engine::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine core
pub use crate::engine::{Engine, EngineBuilder, EngineConfig, EngineHandle};

// Global systems and context
pub use crate::core::globals::{GlobalContext, GlobalSystems, System};

// Event bus
pub use crate::core::event_bus::{Event, EventBus, EventListener, GameEvent};

// State machines
pub use crate::core::state_machine::{StateChangeEvent, StateKey, StateMachine};

// Time
pub use crate::core::time::{FrameTime, Scheduler, Timer};

// Object pooling
pub use crate::core::pooling::{
    FnPrototype, LifetimeSweeper, MultipleObjectPooler, MultiplePoolConfig, ObjectPooler, PoolEntryConfig, PoolError,
    PoolHandle, Poolable, Prototype, SimpleObjectPooler, SimplePoolConfig, SpawnManager, WaitingPools,
};

// AI
pub use crate::core::ai::{
    Agent, AiAction, AiBrain, AiBrainBuilder, AiDecision, AiStateChangeEvent, BehaviorRegistry, BrainConfig,
    BrainStatus,
};

// Configuration
pub use crate::core::config::ConfigError;
