//=========================================================================
// AI Brain
//=========================================================================
//
// Finite-state driver for one agent: performs the current state's actions
// and evaluates its transitions at configurable frequencies.
//
// Tick:
//   1. elapsed - last_actions   > actions_frequency  → perform actions
//   2. elapsed - last_decisions > decision_frequency → evaluate transitions
//   3. time_in_state += delta
//
// Transitions are applied immediately while the evaluated state's list
// is walked, so the last transition that fires in a tick wins.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{debug, error, warn};
use thiserror::Error;

//=== Internal Dependencies ===============================================

use super::action::{ActionId, ActionSlot};
use super::decision::{DecisionId, DecisionSlot};
use super::state::{AiState, StateId};
use super::BrainStatus;
use crate::core::config::ConfigError;
use crate::core::event_bus::EventBus;
use crate::core::time::FrameTime;

//=== BrainError ==========================================================

#[derive(Debug, Error)]
pub enum BrainError {
    #[error("state '{0}' is defined more than once")]
    DuplicateState(String),

    #[error("state '{state}' transitions to unknown state '{target}'")]
    UnknownState { state: String, target: String },

    #[error("no action registered under '{0}'")]
    UnknownAction(String),

    #[error("no decision registered under '{0}'")]
    UnknownDecision(String),

    #[error("state '{state}' refers to missing slot {index}")]
    DanglingSlot { state: String, index: usize },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

//=== BrainId =============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BrainId(u64);

impl BrainId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        BrainId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

//=== AiStateChangeEvent ==================================================

/// Published whenever a brain with an attached bus changes state.
#[derive(Debug, Clone, PartialEq)]
pub struct AiStateChangeEvent {
    pub owner: Arc<str>,
    pub brain: BrainId,
    pub from: Arc<str>,
    pub to: Arc<str>,
}

//=== AiBrain =============================================================

pub struct AiBrain<C> {
    id: BrainId,
    owner: Arc<str>,
    states: Vec<AiState>,
    actions: Vec<ActionSlot<C>>,
    decisions: Vec<DecisionSlot<C>>,
    current: Option<StateId>,
    previous: Option<StateId>,
    active: bool,
    started: bool,
    time_in_state: f32,
    actions_frequency: f32,
    decision_frequency: f32,
    last_actions: f64,
    last_decisions: f64,
    bus: Option<Arc<EventBus>>,
}

/// Parts assembled and validated by the builder.
pub(crate) struct BrainParts<C> {
    pub owner: Arc<str>,
    pub states: Vec<AiState>,
    pub actions: Vec<ActionSlot<C>>,
    pub decisions: Vec<DecisionSlot<C>>,
    pub active: bool,
    pub actions_frequency: f32,
    pub decision_frequency: f32,
    pub bus: Option<Arc<EventBus>>,
}

impl<C> AiBrain<C> {
    pub(crate) fn from_parts(parts: BrainParts<C>) -> Self {
        Self {
            id: BrainId::next(),
            owner: parts.owner,
            states: parts.states,
            actions: parts.actions,
            decisions: parts.decisions,
            current: None,
            previous: None,
            active: parts.active,
            started: false,
            time_in_state: 0.0,
            actions_frequency: parts.actions_frequency.max(0.0),
            decision_frequency: parts.decision_frequency.max(0.0),
            last_actions: f64::NEG_INFINITY,
            last_decisions: f64::NEG_INFINITY,
            bus: parts.bus,
        }
    }

    //--- Lifecycle --------------------------------------------------------

    /// Initializes every action and decision, then enters the first state.
    ///
    /// A brain without states stays idle. Starting twice does nothing.
    pub fn start(&mut self, agent: &mut C) {
        if self.started {
            return;
        }
        self.started = true;

        for slot in &mut self.actions {
            slot.initialize(agent);
        }
        for slot in &mut self.decisions {
            slot.initialize(agent);
        }

        if self.states.is_empty() {
            warn!("Brain of '{}' has no states and will stay idle", self.owner);
            return;
        }

        let initial = StateId(0);
        self.current = Some(initial);
        self.time_in_state = 0.0;
        self.enter_state(initial, agent);
        debug!("Brain of '{}' started in '{}'", self.owner, self.states[0].name);
    }

    /// Advances the brain by one frame.
    pub fn tick(&mut self, time: &FrameTime, agent: &mut C) {
        if !self.active || self.current.is_none() {
            return;
        }
        let now = time.elapsed;

        if now - self.last_actions > f64::from(self.actions_frequency) {
            self.perform_actions(time, agent);
            self.last_actions = now;
        }

        if now - self.last_decisions > f64::from(self.decision_frequency) {
            self.evaluate_transitions(time, agent);
            self.last_decisions = now;
        }

        self.time_in_state += time.delta;
    }

    //--- Transitions ------------------------------------------------------

    /// Moves to the state named `name`.
    ///
    /// Unknown names are logged and the brain stays where it is. Returns
    /// `true` if the state changed.
    pub fn transition_to_state(&mut self, name: &str, agent: &mut C) -> bool {
        match self.state_id(name) {
            Some(target) => self.transition_to(target, agent),
            None => {
                error!(
                    "Brain of '{}' has no state named '{}'; staying in {:?}",
                    self.owner,
                    name,
                    self.current_state_name()
                );
                false
            }
        }
    }

    /// Moves to `target`. No-op if it is already current or the brain has
    /// not started.
    pub fn transition_to(&mut self, target: StateId, agent: &mut C) -> bool {
        let Some(current) = self.current else {
            warn!("Brain of '{}' must be started before transitioning", self.owner);
            return false;
        };
        if target == current || target.0 >= self.states.len() {
            return false;
        }

        self.exit_state(current, agent);
        self.time_in_state = 0.0;
        self.previous = Some(current);
        self.current = Some(target);
        self.enter_state(target, agent);

        let from = Arc::clone(&self.states[current.0].name);
        let to = Arc::clone(&self.states[target.0].name);
        debug!("Brain of '{}': {} -> {}", self.owner, from, to);

        if let Some(bus) = &self.bus {
            bus.trigger_event(AiStateChangeEvent {
                owner: Arc::clone(&self.owner),
                brain: self.id,
                from,
                to,
            });
        }
        true
    }

    //--- Internals --------------------------------------------------------

    fn status(&self, time: &FrameTime) -> BrainStatus {
        BrainStatus {
            state: self.current,
            time_in_state: self.time_in_state,
            time: *time,
        }
    }

    fn perform_actions(&mut self, time: &FrameTime, agent: &mut C) {
        let Some(state) = self.current else {
            return;
        };
        let status = self.status(time);

        for i in 0..self.states[state.0].actions.len() {
            let id = self.states[state.0].actions[i];
            if !self.actions[id.0].perform(agent, &status) {
                error!(
                    "Action slot {} of state '{}' in the brain of '{}' is empty",
                    i, self.states[state.0].name, self.owner
                );
            }
        }
    }

    fn evaluate_transitions(&mut self, time: &FrameTime, agent: &mut C) {
        let Some(evaluated) = self.current else {
            return;
        };

        // Walk the list of the state evaluation started in, even after a
        // transition fired
        for i in 0..self.states[evaluated.0].transitions.len() {
            let transition = self.states[evaluated.0].transitions[i];
            let Some(decision) = transition.decision else {
                continue;
            };

            let status = self.status(time);
            let outcome = self.decisions[decision.0].decide(agent, &status);
            if let Some(target) = transition.target(outcome) {
                self.transition_to(target, agent);
            }
        }
    }

    fn enter_state(&mut self, state: StateId, agent: &mut C) {
        let state = &self.states[state.0];
        for id in &state.actions {
            self.actions[id.0].enter(agent);
        }
        for id in state.decisions() {
            self.decisions[id.0].enter(agent);
        }
    }

    fn exit_state(&mut self, state: StateId, agent: &mut C) {
        let state = &self.states[state.0];
        for id in &state.actions {
            self.actions[id.0].exit(agent);
        }
        for id in state.decisions() {
            self.decisions[id.0].exit(agent);
        }
    }

    //--- Control ----------------------------------------------------------

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn set_frequencies(&mut self, actions: f32, decisions: f32) {
        self.actions_frequency = actions.max(0.0);
        self.decision_frequency = decisions.max(0.0);
    }

    /// Attaches a bus for state-change notifications.
    pub fn set_event_bus(&mut self, bus: Option<Arc<EventBus>>) {
        self.bus = bus;
    }

    //--- Queries ----------------------------------------------------------

    pub fn id(&self) -> BrainId {
        self.id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn current_state(&self) -> Option<StateId> {
        self.current
    }

    pub fn current_state_name(&self) -> Option<&str> {
        self.current.map(|id| self.states[id.0].name())
    }

    pub fn previous_state(&self) -> Option<StateId> {
        self.previous
    }

    pub fn previous_state_name(&self) -> Option<&str> {
        self.previous.map(|id| self.states[id.0].name())
    }

    pub fn time_in_state(&self) -> f32 {
        self.time_in_state
    }

    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.states.iter().position(|s| s.name() == name).map(StateId)
    }

    pub fn state(&self, id: StateId) -> Option<&AiState> {
        self.states.get(id.0)
    }

    pub fn states(&self) -> &[AiState] {
        &self.states
    }

    pub fn action_in_progress(&self, id: ActionId) -> bool {
        self.actions.get(id.0).is_some_and(|slot| slot.in_progress())
    }

    pub fn decision_in_progress(&self, id: DecisionId) -> bool {
        self.decisions.get(id.0).is_some_and(|slot| slot.in_progress())
    }

    pub fn action_label(&self, id: ActionId) -> Option<&str> {
        self.actions.get(id.0).map(|slot| slot.label())
    }

    pub fn decision_label(&self, id: DecisionId) -> Option<&str> {
        self.decisions.get(id.0).map(|slot| slot.label())
    }

    pub fn actions_frequency(&self) -> f32 {
        self.actions_frequency
    }

    pub fn decision_frequency(&self) -> f32 {
        self.decision_frequency
    }
}

impl<C> std::fmt::Debug for AiBrain<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiBrain")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("current", &self.current_state_name())
            .field("active", &self.active)
            .field("time_in_state", &self.time_in_state)
            .finish()
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ai::{AiAction, AiBrainBuilder, AiDecision};
    use parking_lot::Mutex;

    /// Agent context recording every hook call.
    #[derive(Debug, Default)]
    struct Npc {
        log: Vec<String>,
        alarm: bool,
    }

    struct Say(&'static str);

    impl AiAction<Npc> for Say {
        fn perform_action(&mut self, agent: &mut Npc, _status: &BrainStatus) {
            agent.log.push(format!("do {}", self.0));
        }

        fn on_enter_state(&mut self, agent: &mut Npc) {
            agent.log.push(format!("enter {}", self.0));
        }

        fn on_exit_state(&mut self, agent: &mut Npc) {
            agent.log.push(format!("exit {}", self.0));
        }

        fn label(&self) -> &str {
            self.0
        }
    }

    struct Alarm;

    impl AiDecision<Npc> for Alarm {
        fn decide(&mut self, agent: &Npc, _status: &BrainStatus) -> bool {
            agent.alarm
        }
    }

    struct Always(bool);

    impl AiDecision<Npc> for Always {
        fn decide(&mut self, _agent: &Npc, _status: &BrainStatus) -> bool {
            self.0
        }
    }

    fn frame(n: u64) -> FrameTime {
        FrameTime::at(n as f64 * 0.1, 0.1, n)
    }

    fn count(log: &[String], entry: &str) -> usize {
        log.iter().filter(|e| *e == entry).count()
    }

    /// States A and B; A → B when the alarm is raised.
    fn two_state_brain() -> AiBrain<Npc> {
        let mut builder = AiBrainBuilder::new("guard");
        let a = builder.add_action(Say("a"));
        let b = builder.add_action(Say("b"));
        let alarm = builder.add_decision(Alarm);
        builder.state("A").action(a).transition(Some(alarm), "B", "");
        builder.state("B").action(b);
        builder.build().unwrap()
    }

    #[test]
    fn start_enters_first_state() {
        let mut brain = two_state_brain();
        let mut npc = Npc::default();

        assert_eq!(brain.current_state_name(), None);
        brain.start(&mut npc);
        brain.start(&mut npc);

        assert_eq!(brain.current_state_name(), Some("A"));
        assert_eq!(npc.log, vec!["enter a"]);
    }

    #[test]
    fn two_state_transition_runs_hooks_once() {
        let mut brain = two_state_brain();
        let mut npc = Npc::default();
        brain.start(&mut npc);

        brain.tick(&frame(1), &mut npc);
        assert_eq!(brain.current_state_name(), Some("A"));

        npc.alarm = true;
        brain.tick(&frame(2), &mut npc);

        assert_eq!(brain.current_state_name(), Some("B"));
        assert_eq!(brain.previous_state_name(), Some("A"));
        assert_eq!(count(&npc.log, "exit a"), 1);
        assert_eq!(count(&npc.log, "enter b"), 1);
        assert_eq!(brain.time_in_state(), 0.1);
    }

    #[test]
    fn actions_run_before_decisions() {
        let mut brain = two_state_brain();
        let mut npc = Npc { alarm: true, ..Default::default() };
        brain.start(&mut npc);
        brain.tick(&frame(1), &mut npc);

        assert_eq!(npc.log, vec!["enter a", "do a", "exit a", "enter b"]);
    }

    #[test]
    fn frequencies_gate_work() {
        let mut builder = AiBrainBuilder::new("sentry").with_frequencies(0.25, 10.0);
        let a = builder.add_action(Say("a"));
        let never = builder.add_decision(Always(false));
        builder.state("A").action(a).transition(Some(never), "", "");
        let mut brain = builder.build().unwrap();
        let mut npc = Npc::default();
        brain.start(&mut npc);

        // First tick always runs; afterwards every > 0.25 s
        for n in 1..=10 {
            brain.tick(&frame(n), &mut npc);
        }
        assert_eq!(count(&npc.log, "do a"), 4);
    }

    #[test]
    fn last_fired_transition_wins() {
        let mut builder = AiBrainBuilder::new("guard");
        let yes = builder.add_decision(Always(true));
        let no = builder.add_decision(Always(false));
        builder
            .state("Idle")
            .transition(Some(yes), "Chase", "")
            .transition(Some(no), "", "Flee");
        builder.state("Chase");
        builder.state("Flee");
        let mut brain = builder.build().unwrap();
        let mut npc = Npc::default();
        brain.start(&mut npc);

        brain.tick(&frame(1), &mut npc);
        assert_eq!(brain.current_state_name(), Some("Flee"));
        assert_eq!(brain.previous_state_name(), Some("Chase"));
    }

    #[test]
    fn inert_transition_and_empty_target_stay() {
        let mut builder = AiBrainBuilder::new("guard");
        let yes = builder.add_decision(Always(true));
        builder.state("Idle").transition(None, "Other", "").transition(Some(yes), "", "Other");
        builder.state("Other");
        let mut brain = builder.build().unwrap();
        let mut npc = Npc::default();
        brain.start(&mut npc);

        brain.tick(&frame(1), &mut npc);
        assert_eq!(brain.current_state_name(), Some("Idle"));
    }

    #[test]
    fn empty_action_slot_is_skipped() {
        let mut builder = AiBrainBuilder::new("guard");
        let a = builder.add_action(Say("a"));
        let empty = builder.add_empty_action_slot();
        let b = builder.add_action(Say("b"));
        builder.state("A").action(a).action(empty).action(b);
        let mut brain = builder.build().unwrap();
        let mut npc = Npc::default();
        brain.start(&mut npc);

        brain.tick(&frame(1), &mut npc);
        assert_eq!(count(&npc.log, "do a"), 1);
        assert_eq!(count(&npc.log, "do b"), 1);
        assert_eq!(brain.action_label(empty), Some("<empty>"));
    }

    #[test]
    fn unknown_state_name_keeps_current() {
        let mut brain = two_state_brain();
        let mut npc = Npc::default();
        brain.start(&mut npc);

        assert!(!brain.transition_to_state("Nowhere", &mut npc));
        assert_eq!(brain.current_state_name(), Some("A"));
        assert!(brain.transition_to_state("B", &mut npc));
        assert!(!brain.transition_to_state("B", &mut npc));
    }

    #[test]
    fn inactive_brain_does_nothing() {
        let mut brain = two_state_brain();
        let mut npc = Npc { alarm: true, ..Default::default() };
        brain.start(&mut npc);
        brain.set_active(false);

        brain.tick(&frame(1), &mut npc);
        assert_eq!(brain.current_state_name(), Some("A"));
        assert_eq!(brain.time_in_state(), 0.0);
    }

    #[test]
    fn in_progress_flags_follow_current_state() {
        let mut builder = AiBrainBuilder::new("guard");
        let a = builder.add_action(Say("a"));
        let b = builder.add_action(Say("b"));
        let alarm = builder.add_decision(Alarm);
        builder.state("A").action(a).transition(Some(alarm), "B", "");
        builder.state("B").action(b);
        let mut brain = builder.build().unwrap();
        let mut npc = Npc::default();

        brain.start(&mut npc);
        assert!(brain.action_in_progress(a));
        assert!(brain.decision_in_progress(alarm));
        assert!(!brain.action_in_progress(b));

        brain.transition_to_state("B", &mut npc);
        assert!(!brain.action_in_progress(a));
        assert!(!brain.decision_in_progress(alarm));
        assert!(brain.action_in_progress(b));
    }

    #[test]
    fn transitions_publish_events() {
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.subscribe(move |e: &AiStateChangeEvent| {
            sink.lock().push(format!("{}: {} -> {}", e.owner, e.from, e.to));
        });

        let mut builder = AiBrainBuilder::new("guard").with_event_bus(Arc::clone(&bus));
        builder.state("A");
        builder.state("B");
        let mut brain = builder.build().unwrap();
        let mut npc = Npc::default();
        brain.start(&mut npc);
        brain.transition_to_state("B", &mut npc);

        assert_eq!(*seen.lock(), vec!["guard: A -> B"]);
    }

    #[test]
    fn brain_without_states_idles() {
        let mut brain: AiBrain<Npc> = AiBrainBuilder::new("empty").build().unwrap();
        let mut npc = Npc::default();
        brain.start(&mut npc);
        brain.tick(&frame(1), &mut npc);
        assert_eq!(brain.current_state(), None);
        assert!(!brain.transition_to_state("A", &mut npc));
    }
}
