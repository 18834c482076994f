//=========================================================================
// Brain Configuration
//=========================================================================
//
// Data-driven brains: a serde description of states and transitions
// whose action/decision names are resolved through a registry of
// factories.
//
// Flow:
//   JSON → BrainConfig → BehaviorRegistry::builder() → AiBrainBuilder
//                                                   → build() → AiBrain
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use super::action::{ActionId, AiAction};
use super::brain::{AiBrain, BrainError};
use super::builder::AiBrainBuilder;
use super::decision::{AiDecision, DecisionId};
use crate::core::config::{self, ConfigError};
use crate::core::event_bus::EventBus;

//=== Config Types ========================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Registered decision name; `None` makes the transition inert.
    pub decision: Option<String>,
    /// Target when the decision returns true; empty means stay.
    pub true_state: String,
    /// Target when the decision returns false; empty means stay.
    pub false_state: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    pub name: String,
    /// Registered action names; `null` entries become empty slots.
    pub actions: Vec<Option<String>>,
    pub transitions: Vec<TransitionConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrainConfig {
    pub states: Vec<StateConfig>,
    pub active: bool,
    pub actions_frequency: f32,
    pub decision_frequency: f32,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            states: Vec::new(),
            active: true,
            actions_frequency: 0.0,
            decision_frequency: 0.0,
        }
    }
}

impl BrainConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        config::from_json(text)
    }
}

//=== BehaviorRegistry ====================================================

type ActionFactory<C> = Box<dyn Fn() -> Box<dyn AiAction<C>> + Send + Sync>;
type DecisionFactory<C> = Box<dyn Fn() -> Box<dyn AiDecision<C>> + Send + Sync>;

/// Named factories for the actions and decisions a config may refer to.
pub struct BehaviorRegistry<C> {
    actions: HashMap<String, ActionFactory<C>>,
    decisions: HashMap<String, DecisionFactory<C>>,
}

impl<C> BehaviorRegistry<C> {
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
            decisions: HashMap::new(),
        }
    }

    //--- Registration -----------------------------------------------------

    pub fn register_action<A, F>(&mut self, name: impl Into<String>, factory: F)
    where
        A: AiAction<C> + 'static,
        F: Fn() -> A + Send + Sync + 'static,
    {
        self.actions
            .insert(name.into(), Box::new(move || Box::new(factory()) as Box<dyn AiAction<C>>));
    }

    pub fn register_decision<D, F>(&mut self, name: impl Into<String>, factory: F)
    where
        D: AiDecision<C> + 'static,
        F: Fn() -> D + Send + Sync + 'static,
    {
        self.decisions
            .insert(name.into(), Box::new(move || Box::new(factory()) as Box<dyn AiDecision<C>>));
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn has_decision(&self, name: &str) -> bool {
        self.decisions.contains_key(name)
    }

    //--- Assembly ---------------------------------------------------------

    /// Translates `config` into a builder.
    ///
    /// Each distinct action or decision name is instantiated once and
    /// shared by every state that lists it.
    pub fn builder(&self, owner: impl Into<String>, config: &BrainConfig) -> Result<AiBrainBuilder<C>, BrainError> {
        let mut builder = AiBrainBuilder::new(owner)
            .with_active(config.active)
            .with_frequencies(config.actions_frequency, config.decision_frequency);

        let mut action_ids: HashMap<&str, ActionId> = HashMap::new();
        let mut decision_ids: HashMap<&str, DecisionId> = HashMap::new();

        for state in &config.states {
            let mut actions = Vec::with_capacity(state.actions.len());
            for entry in &state.actions {
                let id = match entry.as_deref() {
                    None => builder.add_empty_action_slot(),
                    Some(name) => match action_ids.get(name) {
                        Some(&id) => id,
                        None => {
                            let factory = self
                                .actions
                                .get(name)
                                .ok_or_else(|| BrainError::UnknownAction(name.to_owned()))?;
                            let id = builder.add_boxed_action(factory());
                            action_ids.insert(name, id);
                            id
                        }
                    },
                };
                actions.push(id);
            }

            let mut transitions = Vec::with_capacity(state.transitions.len());
            for transition in &state.transitions {
                let decision = match transition.decision.as_deref() {
                    None => None,
                    Some(name) => Some(match decision_ids.get(name) {
                        Some(&id) => id,
                        None => {
                            let factory = self
                                .decisions
                                .get(name)
                                .ok_or_else(|| BrainError::UnknownDecision(name.to_owned()))?;
                            let id = builder.add_boxed_decision(factory());
                            decision_ids.insert(name, id);
                            id
                        }
                    }),
                };
                transitions.push((decision, transition));
            }

            let mut state_builder = builder.state(state.name.as_str());
            for id in actions {
                state_builder = state_builder.action(id);
            }
            for (decision, transition) in transitions {
                state_builder = state_builder.transition(decision, &transition.true_state, &transition.false_state);
            }
        }

        debug!(
            "Assembled brain config: {} states, {} actions, {} decisions",
            config.states.len(),
            action_ids.len(),
            decision_ids.len()
        );
        Ok(builder)
    }

    /// Builds a brain straight from configuration.
    pub fn build_brain(
        &self,
        owner: impl Into<String>,
        config: &BrainConfig,
        bus: Option<Arc<EventBus>>,
    ) -> Result<AiBrain<C>, BrainError> {
        let mut builder = self.builder(owner, config)?;
        if let Some(bus) = bus {
            builder = builder.with_event_bus(bus);
        }
        builder.build()
    }

    /// Parses JSON and builds the brain it describes.
    pub fn build_brain_from_json(
        &self,
        owner: impl Into<String>,
        json: &str,
        bus: Option<Arc<EventBus>>,
    ) -> Result<AiBrain<C>, BrainError> {
        let config = BrainConfig::from_json(json)?;
        self.build_brain(owner, &config, bus)
    }
}

impl<C> Default for BehaviorRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Tests
//=========================================================================
