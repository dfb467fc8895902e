//! Hybrid automaton model with validated mutations.
//!
//! An [`Automaton`] is built empty and populated through an ordered sequence
//! of mutation calls. States and variables must exist before the flows,
//! guards, jumps and transitions that reference them. Every mutation checks
//! its preconditions first and fails with a [`ConfigError`] without
//! modifying the automaton.
//!
//! # Example
//!
//! ```rust
//! use hybrid_automata::automaton::{Automaton, TransitionBuilder};
//! use hybrid_automata::core::Flow;
//!
//! let mut a = Automaton::new();
//! a.define_variables(["x"]).unwrap();
//! a.add_state("Q1").add_state("Q2");
//! a.set_initial_state("Q1", vec![72.0]).unwrap();
//! a.set_flow("Q1", Flow::new("flow_Q1", |x: &[f64], _t: f64| vec![-x[0] + 50.0])).unwrap();
//! a.set_flow("Q2", Flow::new("flow_Q2", |x: &[f64], _t: f64| vec![-x[0] + 80.0])).unwrap();
//! a.transition(
//!     TransitionBuilder::new()
//!         .from("Q1")
//!         .to("Q2")
//!         .when("guard_Q1_Q2", |x: &[f64]| x[0] <= 70.0),
//! )
//! .unwrap();
//!
//! assert_eq!(a.states().len(), 2);
//! assert_eq!(a.transitions().len(), 1);
//! assert!(a.validate().is_success());
//! ```

pub mod error;
pub mod transition;
pub mod validate;

pub use error::ConfigError;
pub use transition::{Edge, Transition, TransitionBuilder, TransitionRecord};
pub use validate::ValidationIssue;

use crate::core::{Flow, Guard, Invariant, Jump, StateId};
use indexmap::{IndexMap, IndexSet};

/// In-memory hybrid automaton.
///
/// Holds the static definition (states, variables, events, inputs, flows,
/// invariants, edges, descriptive transitions) and a runtime cursor
/// (current state, continuous vector and event flags) that only the
/// simulation engine moves.
#[derive(Clone, Debug, Default)]
pub struct Automaton {
    states: IndexSet<StateId>,
    variables: Vec<String>,
    events: IndexMap<String, bool>,
    inputs: Vec<String>,
    initial_state: Option<StateId>,
    initial_continuous: Vec<f64>,
    current_state: Option<StateId>,
    current_continuous: Vec<f64>,
    flows: IndexMap<StateId, Flow>,
    invariants: IndexMap<StateId, Invariant>,
    edges: IndexMap<StateId, IndexMap<StateId, Edge>>,
    transitions: Vec<TransitionRecord>,
}

impl Automaton {
    /// Create an empty automaton.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a discrete state. Adding an existing state is a no-op.
    pub fn add_state(&mut self, name: impl Into<StateId>) -> &mut Self {
        self.states.insert(name.into());
        self
    }

    /// Replace the continuous variable names, fixing the vector dimension.
    ///
    /// Fails if an initial vector is already set with a different length.
    pub fn define_variables<I, S>(&mut self, names: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let variables: Vec<String> = names.into_iter().map(Into::into).collect();
        if self.initial_state.is_some() && self.initial_continuous.len() != variables.len() {
            return Err(ConfigError::DimensionMismatch {
                context: "define_variables",
                expected: self.initial_continuous.len(),
                found: variables.len(),
            });
        }
        self.variables = variables;
        Ok(())
    }

    /// Replace the event alphabet; every event starts inactive.
    pub fn define_event_set<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.events = names.into_iter().map(|n| (n.into(), false)).collect();
    }

    /// Replace the input-space labels. Descriptive only.
    pub fn define_inputs<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs = names.into_iter().map(Into::into).collect();
    }

    /// Set the initial discrete state and continuous vector.
    ///
    /// Also moves the runtime cursor to this initial condition.
    pub fn set_initial_state(
        &mut self,
        state: impl Into<StateId>,
        continuous: Vec<f64>,
    ) -> Result<(), ConfigError> {
        let state = self.require_state(state.into(), "set_initial_state")?;
        if continuous.len() != self.variables.len() {
            return Err(ConfigError::DimensionMismatch {
                context: "set_initial_state",
                expected: self.variables.len(),
                found: continuous.len(),
            });
        }

        self.initial_state = Some(state.clone());
        self.current_state = Some(state);
        self.current_continuous = continuous.clone();
        self.initial_continuous = continuous;
        Ok(())
    }

    /// Set the flow of `state`, replacing any previous one.
    pub fn set_flow(&mut self, state: impl Into<StateId>, flow: Flow) -> Result<(), ConfigError> {
        let state = self.require_state(state.into(), "set_flow")?;
        self.flows.insert(state, flow);
        Ok(())
    }

    /// Set the (advisory) invariant of `state`, replacing any previous one.
    pub fn set_invariant(
        &mut self,
        state: impl Into<StateId>,
        invariant: Invariant,
    ) -> Result<(), ConfigError> {
        let state = self.require_state(state.into(), "set_invariant")?;
        self.invariants.insert(state, invariant);
        Ok(())
    }

    /// Set the guard of the `from -> to` edge.
    ///
    /// Guarded edges are evaluated in the order they first received a guard.
    /// Replacing an existing guard keeps the edge's position.
    pub fn set_guard(
        &mut self,
        from: impl Into<StateId>,
        to: impl Into<StateId>,
        guard: Guard,
    ) -> Result<(), ConfigError> {
        let from = self.require_state(from.into(), "set_guard")?;
        let to = self.require_state(to.into(), "set_guard")?;
        let out = self.edges.entry(from).or_default();

        if out.get(&to).is_some_and(|edge| edge.guard.is_some()) {
            if let Some(edge) = out.get_mut(&to) {
                edge.guard = Some(guard);
            }
        } else {
            let mut edge = out.shift_remove(&to).unwrap_or_default();
            edge.guard = Some(guard);
            out.insert(to, edge);
        }
        Ok(())
    }

    /// Set the reset map of the `from -> to` edge.
    pub fn set_jump(
        &mut self,
        from: impl Into<StateId>,
        to: impl Into<StateId>,
        jump: Jump,
    ) -> Result<(), ConfigError> {
        let edge = self.edge_mut(from.into(), to.into(), "set_jump")?;
        edge.jump = Some(jump);
        Ok(())
    }

    /// Associate an event with the `from -> to` edge.
    pub fn set_event(
        &mut self,
        from: impl Into<StateId>,
        to: impl Into<StateId>,
        event: impl Into<String>,
    ) -> Result<(), ConfigError> {
        let edge = self.edge_mut(from.into(), to.into(), "set_event")?;
        edge.event = Some(event.into());
        Ok(())
    }

    /// Append a descriptive transition record.
    ///
    /// The record is independent of the functional guard/jump/event maps;
    /// use [`Automaton::transition`] to register both at once.
    pub fn add_transition(
        &mut self,
        from: impl Into<StateId>,
        to: impl Into<StateId>,
        event: Option<&str>,
        guard: Option<&str>,
        reset: Option<&str>,
    ) -> Result<(), ConfigError> {
        let q_from = self.require_state(from.into(), "add_transition")?;
        let q_to = self.require_state(to.into(), "add_transition")?;
        self.transitions.push(TransitionRecord {
            q_from,
            q_to,
            event: event.map(str::to_string),
            guard: guard.map(str::to_string),
            reset: reset.map(str::to_string),
        });
        Ok(())
    }

    /// Register a transition built with [`TransitionBuilder`].
    ///
    /// Replaces the whole `from -> to` edge and its descriptive record (or
    /// appends a record if none exists for that pair).
    pub fn transition(&mut self, builder: TransitionBuilder) -> Result<(), ConfigError> {
        let transition = builder.build()?;
        self.add(transition)
    }

    /// Register a pre-built transition.
    pub fn add(&mut self, transition: Transition) -> Result<(), ConfigError> {
        let from = self.require_state(transition.from.clone(), "transition")?;
        let to = self.require_state(transition.to.clone(), "transition")?;
        let record = transition.record();

        match self
            .transitions
            .iter_mut()
            .find(|r| r.q_from == from && r.q_to == to)
        {
            Some(existing) => *existing = record,
            None => self.transitions.push(record),
        }
        let out = self.edges.entry(from).or_default();
        let edge = transition.into_edge();
        let gains_guard =
            edge.guard.is_some() && !out.get(&to).is_some_and(|e| e.guard.is_some());
        if gains_guard {
            out.shift_remove(&to);
        }
        out.insert(to, edge);
        Ok(())
    }

    pub fn states(&self) -> &IndexSet<StateId> {
        &self.states
    }

    pub fn has_state(&self, state: &str) -> bool {
        self.states.contains(state)
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Dimension of the continuous vector.
    pub fn dimension(&self) -> usize {
        self.variables.len()
    }

    /// Event alphabet with the current activation flags.
    pub fn events(&self) -> &IndexMap<String, bool> {
        &self.events
    }

    /// Current flag of `event`; unknown events are inactive.
    pub fn event_active(&self, event: &str) -> bool {
        self.events.get(event).copied().unwrap_or(false)
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn initial_state(&self) -> Option<&StateId> {
        self.initial_state.as_ref()
    }

    pub fn initial_continuous(&self) -> &[f64] {
        &self.initial_continuous
    }

    pub fn current_state(&self) -> Option<&StateId> {
        self.current_state.as_ref()
    }

    pub fn current_continuous(&self) -> &[f64] {
        &self.current_continuous
    }

    pub fn flow(&self, state: &str) -> Option<&Flow> {
        self.flows.get(state)
    }

    pub fn flows(&self) -> &IndexMap<StateId, Flow> {
        &self.flows
    }

    pub fn invariant(&self, state: &str) -> Option<&Invariant> {
        self.invariants.get(state)
    }

    pub fn invariants(&self) -> &IndexMap<StateId, Invariant> {
        &self.invariants
    }

    pub fn edge(&self, from: &str, to: &str) -> Option<&Edge> {
        self.edges.get(from).and_then(|out| out.get(to))
    }

    pub fn guard(&self, from: &str, to: &str) -> Option<&Guard> {
        self.edge(from, to).and_then(Edge::guard)
    }

    pub fn jump(&self, from: &str, to: &str) -> Option<&Jump> {
        self.edge(from, to).and_then(Edge::jump)
    }

    pub fn event_of(&self, from: &str, to: &str) -> Option<&str> {
        self.edge(from, to).and_then(Edge::event)
    }

    /// Outgoing edges of `state` in evaluation order.
    ///
    /// An edge takes its place when it is created and moves behind the
    /// already guarded edges when it first receives a guard.
    pub fn outgoing(&self, state: &str) -> impl Iterator<Item = (&StateId, &Edge)> {
        self.edges.get(state).into_iter().flat_map(|out| out.iter())
    }

    /// All edges as `(from, to, edge)` in registration order.
    pub fn edges(&self) -> impl Iterator<Item = (&StateId, &StateId, &Edge)> {
        self.edges
            .iter()
            .flat_map(|(from, out)| out.iter().map(move |(to, edge)| (from, to, edge)))
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    /// Evaluate the invariant of `state` at `x`.
    ///
    /// Returns `None` when the state has no invariant. Purely a query: the
    /// simulation engine never calls it.
    pub fn check_invariant(&self, state: &str, x: &[f64]) -> Option<bool> {
        self.invariant(state).map(|inv| inv.holds(x))
    }

    /// Per-variable flow labels for rendering `state`.
    pub fn flow_labels(&self, state: &str) -> Vec<String> {
        match self.flow(state) {
            Some(flow) => flow.label_lines(&self.variables),
            None => self.variables.iter().map(|v| format!("{v}' = ?")).collect(),
        }
    }

    /// Reset the runtime cursor to the initial condition and deactivate all
    /// events.
    pub(crate) fn reset_runtime(&mut self) {
        self.current_state = self.initial_state.clone();
        self.current_continuous = self.initial_continuous.clone();
        for active in self.events.values_mut() {
            *active = false;
        }
    }

    pub(crate) fn set_cursor(&mut self, state: &StateId, continuous: &[f64]) {
        if self.current_state.as_ref() != Some(state) {
            self.current_state = Some(state.clone());
        }
        self.current_continuous.clear();
        self.current_continuous.extend_from_slice(continuous);
    }

    /// Set the flag of a declared event. Returns `false`, leaving the event
    /// set untouched, if `event` is not declared.
    pub(crate) fn set_event_flag(&mut self, event: &str, active: bool) -> bool {
        match self.events.get_mut(event) {
            Some(flag) => {
                *flag = active;
                true
            }
            None => false,
        }
    }

    fn require_state(&self, state: StateId, context: &'static str) -> Result<StateId, ConfigError> {
        if self.states.contains(&state) {
            Ok(state)
        } else {
            Err(ConfigError::UnknownState {
                state: state.name().to_string(),
                context,
            })
        }
    }

    fn edge_mut(
        &mut self,
        from: StateId,
        to: StateId,
        context: &'static str,
    ) -> Result<&mut Edge, ConfigError> {
        let from = self.require_state(from, context)?;
        let to = self.require_state(to, context)?;
        Ok(self.edges.entry(from).or_default().entry(to).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_state() -> Automaton {
        let mut a = Automaton::new();
        a.define_variables(["x"]).unwrap();
        a.add_state("Q1").add_state("Q2");
        a
    }

    #[test]
    fn new_automaton_is_empty() {
        let a = Automaton::new();
        assert!(a.states().is_empty());
        assert!(a.variables().is_empty());
        assert!(a.events().is_empty());
        assert!(a.inputs().is_empty());
        assert!(a.transitions().is_empty());
        assert!(a.initial_state().is_none());
        assert!(a.initial_continuous().is_empty());
        assert!(a.flows().is_empty());
        assert!(a.invariants().is_empty());
        assert_eq!(a.edges().count(), 0);
    }

    #[test]
    fn add_state_is_idempotent() {
        let mut a = Automaton::new();
        a.add_state("Q1").add_state("Q1");
        assert_eq!(a.states().len(), 1);
    }

    #[test]
    fn states_keep_insertion_order() {
        let mut a = Automaton::new();
        a.add_state("Q3").add_state("Q1").add_state("Q2").add_state("Q1");

        let names: Vec<&str> = a.states().iter().map(StateId::name).collect();
        assert_eq!(names, vec!["Q3", "Q1", "Q2"]);
    }

    #[test]
    fn set_initial_state_sets_cursor() {
        let mut a = two_state();
        a.set_initial_state("Q1", vec![72.0]).unwrap();

        assert_eq!(a.initial_state().unwrap(), "Q1");
        assert_eq!(a.initial_continuous(), &[72.0]);
        assert_eq!(a.current_state().unwrap(), "Q1");
        assert_eq!(a.current_continuous(), &[72.0]);
    }

    #[test]
    fn set_initial_state_rejects_wrong_dimension() {
        let mut a = two_state();
        let err = a.set_initial_state("Q1", vec![72.0, 1.0]).unwrap_err();

        assert_eq!(
            err,
            ConfigError::DimensionMismatch {
                context: "set_initial_state",
                expected: 1,
                found: 2,
            }
        );
        assert!(a.initial_state().is_none());
    }

    #[test]
    fn set_initial_state_rejects_unknown_state() {
        let mut a = two_state();
        let err = a.set_initial_state("Q9", vec![0.0]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownState { ref state, .. } if state == "Q9"));
    }

    #[test]
    fn redefining_variables_keeps_dimension_consistent() {
        let mut a = two_state();
        a.set_initial_state("Q1", vec![1.0]).unwrap();

        assert!(a.define_variables(["x", "tau"]).is_err());
        assert_eq!(a.variables(), &["x".to_string()]);
        assert!(a.define_variables(["temperature"]).is_ok());
        assert_eq!(a.variables(), &["temperature".to_string()]);
    }

    #[test]
    fn event_set_starts_inactive() {
        let mut a = Automaton::new();
        a.define_event_set(["alpha", "beta"]);

        assert_eq!(a.events().len(), 2);
        assert!(!a.event_active("alpha"));
        assert!(!a.event_active("beta"));
        assert!(!a.event_active("unknown"));
    }

    #[test]
    fn mutations_reject_unknown_states() {
        let mut a = two_state();

        assert!(a
            .set_flow("Q3", Flow::new("f", |_: &[f64], _: f64| vec![0.0]))
            .is_err());
        assert!(a.set_invariant("Q3", Invariant::always("inv")).is_err());
        assert!(a
            .set_guard("Q1", "Q3", Guard::new("g", |_: &[f64]| true))
            .is_err());
        assert!(a.set_jump("Q3", "Q1", Jump::identity("j")).is_err());
        assert!(a.set_event("Q3", "Q3", "alpha").is_err());
        assert!(a.add_transition("Q1", "Q3", None, None, None).is_err());

        assert!(a.flows().is_empty());
        assert!(a.invariants().is_empty());
        assert_eq!(a.edges().count(), 0);
        assert!(a.transitions().is_empty());
    }

    #[test]
    fn resetting_guard_overwrites_in_place() {
        let mut a = two_state();
        a.add_state("Q3");
        a.set_guard("Q1", "Q2", Guard::new("first", |_: &[f64]| false))
            .unwrap();
        a.set_guard("Q1", "Q3", Guard::new("other", |_: &[f64]| false))
            .unwrap();
        a.set_guard("Q1", "Q2", Guard::new("second", |_: &[f64]| true))
            .unwrap();

        assert_eq!(a.guard("Q1", "Q2").unwrap().name(), "second");
        let targets: Vec<&str> = a.outgoing("Q1").map(|(to, _)| to.name()).collect();
        assert_eq!(targets, vec!["Q2", "Q3"]);
    }

    #[test]
    fn guard_jump_and_event_share_one_edge() {
        let mut a = two_state();
        a.set_event("Q1", "Q2", "alpha").unwrap();
        a.set_jump("Q1", "Q2", Jump::identity("identity")).unwrap();

        let edge = a.edge("Q1", "Q2").unwrap();
        assert!(edge.guard().is_none());
        assert_eq!(edge.jump().unwrap().name(), "identity");
        assert_eq!(a.event_of("Q1", "Q2"), Some("alpha"));
        assert_eq!(a.outgoing("Q1").count(), 1);
        assert_eq!(a.outgoing("Q2").count(), 0);
    }

    #[test]
    fn add_transition_appends_records() {
        let mut a = two_state();
        a.add_transition("Q1", "Q2", None, Some("guard_Q1_Q2"), Some("reset_none"))
            .unwrap();
        a.add_transition("Q1", "Q2", None, Some("guard_Q1_Q2"), Some("reset_none"))
            .unwrap();

        assert_eq!(a.transitions().len(), 2);
        assert_eq!(a.transitions()[0].guard.as_deref(), Some("guard_Q1_Q2"));
        // descriptive only
        assert!(a.edge("Q1", "Q2").is_none());
    }

    #[test]
    fn unified_transition_sets_edge_and_record() {
        let mut a = two_state();
        a.transition(
            TransitionBuilder::new()
                .from("Q2")
                .to("Q1")
                .when("guard_Q2_Q1", |x: &[f64]| x[0] >= 75.0)
                .jump(Jump::identity("reset_none")),
        )
        .unwrap();
        a.transition(
            TransitionBuilder::new()
                .from("Q2")
                .to("Q1")
                .when("hotter", |x: &[f64]| x[0] >= 78.0),
        )
        .unwrap();

        assert_eq!(a.transitions().len(), 1);
        assert_eq!(a.transitions()[0].guard.as_deref(), Some("hotter"));
        assert!(a.transitions()[0].reset.is_none());
        assert_eq!(a.guard("Q2", "Q1").unwrap().name(), "hotter");
        assert!(a.jump("Q2", "Q1").is_none());
    }

    #[test]
    fn unified_transition_rejects_unknown_state() {
        let mut a = two_state();
        let result = a.transition(TransitionBuilder::new().from("Q1").to("Q7").on_event("go"));

        assert!(matches!(result, Err(ConfigError::UnknownState { .. })));
        assert!(a.transitions().is_empty());
        assert_eq!(a.edges().count(), 0);
    }

    #[test]
    fn check_invariant_is_a_query() {
        let mut a = two_state();
        a.set_invariant("Q1", Invariant::new("inv_Q1", |x: &[f64]| x[0] < 3.0))
            .unwrap();

        assert_eq!(a.check_invariant("Q1", &[2.0]), Some(true));
        assert_eq!(a.check_invariant("Q1", &[4.0]), Some(false));
        assert_eq!(a.check_invariant("Q2", &[4.0]), None);
    }

    #[test]
    fn flow_labels_without_flow_are_placeholders() {
        let mut a = two_state();
        a.set_flow(
            "Q1",
            Flow::new("flow_Q1", |x: &[f64], _: f64| vec![-x[0] + 50.0]).with_display(["-x + 50"]),
        )
        .unwrap();

        assert_eq!(a.flow_labels("Q1"), vec!["x' = -x + 50"]);
        assert_eq!(a.flow_labels("Q2"), vec!["x' = ?"]);
    }

    #[test]
    fn set_event_flag_leaves_event_set_unchanged() {
        let mut a = Automaton::new();
        a.define_event_set(["alpha"]);

        assert!(a.set_event_flag("alpha", true));
        assert!(a.event_active("alpha"));
        assert!(!a.set_event_flag("omega", true));
        assert!(!a.event_active("omega"));
        assert_eq!(a.events().len(), 1);
    }

    #[test]
    fn reset_runtime_restores_initial_condition() {
        let mut a = two_state();
        a.define_event_set(["alpha"]);
        a.set_initial_state("Q1", vec![72.0]).unwrap();
        a.set_cursor(&StateId::from("Q2"), &[80.0]);
        a.set_event_flag("alpha", true);

        a.reset_runtime();

        assert_eq!(a.current_state().unwrap(), "Q1");
        assert_eq!(a.current_continuous(), &[72.0]);
        assert!(!a.event_active("alpha"));
    }
}
