//=========================================================================
// AI Actions
//=========================================================================
//
// Behaviors performed while a state is current. Actions live in slots
// owned by the brain; states refer to them by ActionId so one instance
// can serve several states.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::type_name;

//=== Internal Dependencies ===============================================

use super::BrainStatus;

//=== AiAction Trait ======================================================

/// Behavior run every action tick while its state is current.
///
/// `C` is the agent context the brain drives (position, target, stats...).
pub trait AiAction<C>: Send {
    fn perform_action(&mut self, agent: &mut C, status: &BrainStatus);

    /// Called once when the brain starts.
    fn initialize(&mut self, _agent: &mut C) {}

    fn on_enter_state(&mut self, _agent: &mut C) {}

    fn on_exit_state(&mut self, _agent: &mut C) {}

    /// Label used in logs. Defaults to the type name.
    fn label(&self) -> &str {
        type_name::<Self>()
    }
}

//=== ActionId ============================================================

/// Index of an action slot inside one brain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub(crate) usize);

impl ActionId {
    pub fn index(&self) -> usize {
        self.0
    }
}

//=== ActionSlot ==========================================================

/// Brain-owned storage for one action. An empty slot stands for a
/// missing action reference and is reported when performed.
pub(crate) struct ActionSlot<C> {
    action: Option<Box<dyn AiAction<C>>>,
    in_progress: bool,
}

impl<C> ActionSlot<C> {
    pub(crate) fn new(action: Option<Box<dyn AiAction<C>>>) -> Self {
        Self {
            action,
            in_progress: false,
        }
    }

    pub(crate) fn enter(&mut self, agent: &mut C) {
        self.in_progress = true;
        if let Some(action) = self.action.as_mut() {
            action.on_enter_state(agent);
        }
    }

    pub(crate) fn exit(&mut self, agent: &mut C) {
        self.in_progress = false;
        if let Some(action) = self.action.as_mut() {
            action.on_exit_state(agent);
        }
    }

    pub(crate) fn initialize(&mut self, agent: &mut C) {
        if let Some(action) = self.action.as_mut() {
            action.initialize(agent);
        }
    }

    /// Returns `false` when the slot is empty.
    pub(crate) fn perform(&mut self, agent: &mut C, status: &BrainStatus) -> bool {
        match self.action.as_mut() {
            Some(action) => {
                action.perform_action(agent, status);
                true
            }
            None => false,
        }
    }

    pub(crate) fn in_progress(&self) -> bool {
        self.in_progress
    }

    pub(crate) fn label(&self) -> &str {
        self.action.as_ref().map_or("<empty>", |a| a.label())
    }
}
