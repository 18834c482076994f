//=========================================================================
// AI Decisions
//=========================================================================
//
// Boolean predicates evaluated on decision ticks. Each transition of the
// current state holds at most one decision; its result picks the true or
// false target state.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::type_name;

//=== Internal Dependencies ===============================================

use super::BrainStatus;

//=== AiDecision Trait ====================================================

pub trait AiDecision<C>: Send {
    fn decide(&mut self, agent: &C, status: &BrainStatus) -> bool;

    /// Called once when the brain starts.
    fn initialize(&mut self, _agent: &mut C) {}

    fn on_enter_state(&mut self, _agent: &mut C) {}

    fn on_exit_state(&mut self, _agent: &mut C) {}

    fn label(&self) -> &str {
        type_name::<Self>()
    }
}

//=== DecisionId ==========================================================

/// Index of a decision slot inside one brain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecisionId(pub(crate) usize);

impl DecisionId {
    pub fn index(&self) -> usize {
        self.0
    }
}

//=== DecisionSlot ========================================================

pub(crate) struct DecisionSlot<C> {
    decision: Box<dyn AiDecision<C>>,
    in_progress: bool,
}

impl<C> DecisionSlot<C> {
    pub(crate) fn new(decision: Box<dyn AiDecision<C>>) -> Self {
        Self {
            decision,
            in_progress: false,
        }
    }

    pub(crate) fn enter(&mut self, agent: &mut C) {
        self.in_progress = true;
        self.decision.on_enter_state(agent);
    }

    pub(crate) fn exit(&mut self, agent: &mut C) {
        self.in_progress = false;
        self.decision.on_exit_state(agent);
    }

    pub(crate) fn initialize(&mut self, agent: &mut C) {
        self.decision.initialize(agent);
    }

    pub(crate) fn decide(&mut self, agent: &C, status: &BrainStatus) -> bool {
        self.decision.decide(agent, status)
    }

    pub(crate) fn in_progress(&self) -> bool {
        self.in_progress
    }

    pub(crate) fn label(&self) -> &str {
        self.decision.label()
    }
}
