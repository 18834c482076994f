//=========================================================================
// AI Brain Builder
//=========================================================================
//
// Assembles a brain from actions, decisions and named states. Transition
// targets are written as state names and resolved to StateIds in
// build(), so a misspelled target fails at load time instead of mid-game.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashSet;
use std::sync::Arc;

//=== Internal Dependencies ===============================================

use super::action::{ActionId, ActionSlot, AiAction};
use super::brain::{AiBrain, BrainError, BrainParts};
use super::decision::{AiDecision, DecisionId, DecisionSlot};
use super::state::{AiState, AiTransition, StateId};
use crate::core::event_bus::EventBus;

//=== Pending Definitions =================================================

struct TransitionSpec {
    decision: Option<DecisionId>,
    true_state: String,
    false_state: String,
}

struct StateSpec {
    name: String,
    actions: Vec<ActionId>,
    transitions: Vec<TransitionSpec>,
}

//=== AiBrainBuilder ======================================================

/// Builder for [`AiBrain`].
///
/// # Example
///
/// ```rust
/// # use phoenix_engine::prelude::*;
/// struct Wander;
/// impl AiAction<()> for Wander {
///     fn perform_action(&mut self, _agent: &mut (), _status: &BrainStatus) {}
/// }
///
/// struct Bored;
/// impl AiDecision<()> for Bored {
///     fn decide(&mut self, _agent: &(), status: &BrainStatus) -> bool {
///         status.time_in_state > 5.0
///     }
/// }
///
/// let mut builder: AiBrainBuilder<()> = AiBrainBuilder::new("villager");
/// let wander = builder.add_action(Wander);
/// let bored = builder.add_decision(Bored);
/// builder.state("Wander").action(wander).transition(Some(bored), "Rest", "");
/// builder.state("Rest");
///
/// let brain = builder.build().unwrap();
/// assert_eq!(brain.states().len(), 2);
/// ```
pub struct AiBrainBuilder<C> {
    owner: String,
    actions: Vec<Option<Box<dyn AiAction<C>>>>,
    decisions: Vec<Box<dyn AiDecision<C>>>,
    states: Vec<StateSpec>,
    active: bool,
    actions_frequency: f32,
    decision_frequency: f32,
    bus: Option<Arc<EventBus>>,
}

impl<C> AiBrainBuilder<C> {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            actions: Vec::new(),
            decisions: Vec::new(),
            states: Vec::new(),
            active: true,
            actions_frequency: 0.0,
            decision_frequency: 0.0,
            bus: None,
        }
    }

    //--- Configuration ----------------------------------------------------

    /// Seconds between action runs and between decision evaluations.
    /// 0 means every tick.
    pub fn with_frequencies(mut self, actions: f32, decisions: f32) -> Self {
        self.actions_frequency = actions;
        self.decision_frequency = decisions;
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Bus receiving [`super::AiStateChangeEvent`]s.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    //--- Registration -----------------------------------------------------

    pub fn add_action<A>(&mut self, action: A) -> ActionId
    where
        A: AiAction<C> + 'static,
    {
        self.push_action(Some(Box::new(action)))
    }

    pub(crate) fn add_boxed_action(&mut self, action: Box<dyn AiAction<C>>) -> ActionId {
        self.push_action(Some(action))
    }

    /// Reserves a slot with no action. Performing it logs an error.
    pub fn add_empty_action_slot(&mut self) -> ActionId {
        self.push_action(None)
    }

    fn push_action(&mut self, action: Option<Box<dyn AiAction<C>>>) -> ActionId {
        self.actions.push(action);
        ActionId(self.actions.len() - 1)
    }

    pub fn add_decision<D>(&mut self, decision: D) -> DecisionId
    where
        D: AiDecision<C> + 'static,
    {
        self.add_boxed_decision(Box::new(decision))
    }

    pub(crate) fn add_boxed_decision(&mut self, decision: Box<dyn AiDecision<C>>) -> DecisionId {
        self.decisions.push(decision);
        DecisionId(self.decisions.len() - 1)
    }

    /// Appends a state. The first state added is the initial state.
    pub fn state(&mut self, name: impl Into<String>) -> StateBuilder<'_, C> {
        self.states.push(StateSpec {
            name: name.into(),
            actions: Vec::new(),
            transitions: Vec::new(),
        });
        let index = self.states.len() - 1;
        StateBuilder { builder: self, index }
    }

    //--- Build ------------------------------------------------------------

    /// Validates state names, slot references and transition targets.
    pub fn build(self) -> Result<AiBrain<C>, BrainError> {
        let mut names = HashSet::new();
        for spec in &self.states {
            if !names.insert(spec.name.as_str()) {
                return Err(BrainError::DuplicateState(spec.name.clone()));
            }
        }

        let resolve = |state: &str, target: &str| -> Result<Option<StateId>, BrainError> {
            if target.is_empty() {
                return Ok(None);
            }
            self.states
                .iter()
                .position(|s| s.name == target)
                .map(|index| Some(StateId(index)))
                .ok_or_else(|| BrainError::UnknownState {
                    state: state.to_owned(),
                    target: target.to_owned(),
                })
        };

        let mut states = Vec::with_capacity(self.states.len());
        for spec in &self.states {
            if let Some(id) = spec.actions.iter().find(|id| id.0 >= self.actions.len()) {
                return Err(BrainError::DanglingSlot {
                    state: spec.name.clone(),
                    index: id.0,
                });
            }

            let mut transitions = Vec::with_capacity(spec.transitions.len());
            for t in &spec.transitions {
                if let Some(id) = t.decision.filter(|id| id.0 >= self.decisions.len()) {
                    return Err(BrainError::DanglingSlot {
                        state: spec.name.clone(),
                        index: id.0,
                    });
                }
                transitions.push(AiTransition {
                    decision: t.decision,
                    true_state: resolve(&spec.name, &t.true_state)?,
                    false_state: resolve(&spec.name, &t.false_state)?,
                });
            }

            states.push(AiState {
                name: Arc::from(spec.name.as_str()),
                actions: spec.actions.clone(),
                transitions,
            });
        }

        Ok(AiBrain::from_parts(BrainParts {
            owner: Arc::from(self.owner.as_str()),
            states,
            actions: self.actions.into_iter().map(ActionSlot::new).collect(),
            decisions: self.decisions.into_iter().map(DecisionSlot::new).collect(),
            active: self.active,
            actions_frequency: self.actions_frequency,
            decision_frequency: self.decision_frequency,
            bus: self.bus,
        }))
    }
}

//=== StateBuilder ========================================================

/// Adds actions and transitions to the state just declared.
pub struct StateBuilder<'a, C> {
    builder: &'a mut AiBrainBuilder<C>,
    index: usize,
}

impl<C> StateBuilder<'_, C> {
    pub fn action(self, action: ActionId) -> Self {
        self.builder.states[self.index].actions.push(action);
        self
    }

    /// Adds a transition. An empty target name means "stay" for that
    /// outcome; `None` makes the transition inert.
    pub fn transition(self, decision: Option<DecisionId>, true_state: &str, false_state: &str) -> Self {
        self.builder.states[self.index].transitions.push(TransitionSpec {
            decision,
            true_state: true_state.to_owned(),
            false_state: false_state.to_owned(),
        });
        self
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ai::BrainStatus;

    struct Noop;
    impl AiAction<()> for Noop {
        fn perform_action(&mut self, _agent: &mut (), _status: &BrainStatus) {}
    }

    struct Yes;
    impl AiDecision<()> for Yes {
        fn decide(&mut self, _agent: &(), _status: &BrainStatus) -> bool {
            true
        }
    }

    #[test]
    fn resolves_targets_to_ids() {
        let mut builder: AiBrainBuilder<()> = AiBrainBuilder::new("bot");
        let yes = builder.add_decision(Yes);
        builder.state("A").transition(Some(yes), "B", "");
        builder.state("B").transition(Some(yes), "A", "B");
        let brain = builder.build().unwrap();

        let a = &brain.states()[0];
        assert_eq!(a.transitions()[0].true_state, Some(StateId(1)));
        assert_eq!(a.transitions()[0].false_state, None);
        assert_eq!(brain.state_id("B"), Some(StateId(1)));
    }

    #[test]
    fn unknown_target_fails_at_build() {
        let mut builder: AiBrainBuilder<()> = AiBrainBuilder::new("bot");
        let yes = builder.add_decision(Yes);
        builder.state("A").transition(Some(yes), "Missing", "");

        match builder.build() {
            Err(BrainError::UnknownState { state, target }) => {
                assert_eq!(state, "A");
                assert_eq!(target, "Missing");
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn duplicate_state_fails_at_build() {
        let mut builder: AiBrainBuilder<()> = AiBrainBuilder::new("bot");
        builder.state("A");
        builder.state("A");
        assert!(matches!(builder.build(), Err(BrainError::DuplicateState(name)) if name == "A"));
    }

    #[test]
    fn shared_action_is_one_instance() {
        let mut builder: AiBrainBuilder<()> = AiBrainBuilder::new("bot");
        let noop = builder.add_action(Noop);
        builder.state("A").action(noop);
        builder.state("B").action(noop);
        let brain = builder.build().unwrap();

        assert_eq!(brain.states()[0].actions(), brain.states()[1].actions());
    }
}
