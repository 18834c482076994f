//=========================================================================
// AI
//=========================================================================
//
// State-based agent behavior: states hold actions and transitions,
// transitions hold decisions, a brain drives the current state.
//
// Architecture:
//   AiBrain<C>
//     ├─ states:    Vec<AiState>        (StateId = index)
//     │               ├─ actions:     Vec<ActionId>
//     │               └─ transitions: Vec<AiTransition>
//     ├─ actions:   Vec<ActionSlot<C>>  (shared by id)
//     └─ decisions: Vec<DecisionSlot<C>>
//
//   Agent<C>: System owning a brain plus its context C
//
//=========================================================================

//=== Module Declarations =================================================

mod action;
mod agent;
mod brain;
mod builder;
mod config;
mod decision;
mod state;

//=== Public API ==========================================================

pub use action::{ActionId, AiAction};
pub use agent::Agent;
pub use brain::{AiBrain, AiStateChangeEvent, BrainError, BrainId};
pub use builder::{AiBrainBuilder, StateBuilder};
pub use config::{BehaviorRegistry, BrainConfig, StateConfig, TransitionConfig};
pub use decision::{AiDecision, DecisionId};
pub use state::{AiState, AiTransition, StateId};

//=== Internal Dependencies ===============================================

use crate::core::time::FrameTime;

//=== BrainStatus =========================================================

/// Read-only view of the brain handed to actions and decisions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrainStatus {
    pub state: Option<StateId>,
    /// Seconds since the current state was entered.
    pub time_in_state: f32,
    pub time: FrameTime,
}
