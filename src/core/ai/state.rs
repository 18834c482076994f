//=========================================================================
// AI States & Transitions
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

//=== Internal Dependencies ===============================================

use super::action::ActionId;
use super::decision::DecisionId;

//=== StateId =============================================================

/// Index of a state inside one brain, resolved when the brain is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub(crate) usize);

impl StateId {
    pub fn index(&self) -> usize {
        self.0
    }
}

//=== AiTransition ========================================================

/// Decision plus the state to enter for each outcome.
///
/// A missing decision makes the transition inert; a missing target means
/// "stay" for that outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AiTransition {
    pub decision: Option<DecisionId>,
    pub true_state: Option<StateId>,
    pub false_state: Option<StateId>,
}

impl AiTransition {
    /// Target for a decision outcome.
    pub fn target(&self, outcome: bool) -> Option<StateId> {
        if outcome {
            self.true_state
        } else {
            self.false_state
        }
    }
}

//=== AiState =============================================================

#[derive(Debug, Clone, PartialEq)]
pub struct AiState {
    pub(crate) name: Arc<str>,
    pub(crate) actions: Vec<ActionId>,
    pub(crate) transitions: Vec<AiTransition>,
}

impl AiState {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn actions(&self) -> &[ActionId] {
        &self.actions
    }

    pub fn transitions(&self) -> &[AiTransition] {
        &self.transitions
    }

    /// Decisions referenced by this state's transitions, in order.
    pub fn decisions(&self) -> impl Iterator<Item = DecisionId> + '_ {
        self.transitions.iter().filter_map(|t| t.decision)
    }
}

//=========================================================================
// Tests
//=========================================================================
