//=========================================================================
// Agent
//=========================================================================
//
// System pairing one brain with the agent context it drives.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::brain::AiBrain;
use crate::core::globals::{GlobalContext, System};

//=== Agent ===============================================================

pub struct Agent<C> {
    name: String,
    brain: AiBrain<C>,
    context: C,
}

impl<C: Send> Agent<C> {
    pub fn new(name: impl Into<String>, brain: AiBrain<C>, context: C) -> Self {
        Self {
            name: name.into(),
            brain,
            context,
        }
    }

    pub fn brain(&self) -> &AiBrain<C> {
        &self.brain
    }

    pub fn brain_mut(&mut self) -> &mut AiBrain<C> {
        &mut self.brain
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// Requests a transition from outside the brain's own decisions.
    pub fn transition_to_state(&mut self, name: &str) -> bool {
        self.brain.transition_to_state(name, &mut self.context)
    }
}

impl<C: Send> System for Agent<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_start(&mut self, _context: &mut GlobalContext) {
        self.brain.start(&mut self.context);
    }

    fn update(&mut self, context: &mut GlobalContext) {
        self.brain.tick(&context.time, &mut self.context);
    }
}

//=========================================================================
// Tests
//=========================================================================
