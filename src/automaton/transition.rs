//! Transition edges, descriptive records and the unified transition builder.

use crate::automaton::error::ConfigError;
use crate::core::{Guard, Jump, StateId};
use serde::{Deserialize, Serialize};

/// Functional part of a `(from, to)` transition: what the engine evaluates.
///
/// An edge is enabled when its guard holds on the post-integration vector
/// or when its event is active. An edge with neither never fires.
#[derive(Clone, Debug, Default)]
pub struct Edge {
    pub(crate) guard: Option<Guard>,
    pub(crate) jump: Option<Jump>,
    pub(crate) event: Option<String>,
}

impl Edge {
    pub fn guard(&self) -> Option<&Guard> {
        self.guard.as_ref()
    }

    pub fn jump(&self) -> Option<&Jump> {
        self.jump.as_ref()
    }

    pub fn event(&self) -> Option<&str> {
        self.event.as_deref()
    }

    /// Whether the edge can ever be enabled.
    pub fn is_triggerable(&self) -> bool {
        self.guard.is_some() || self.event.is_some()
    }
}

/// Descriptive transition entry used by export and rendering.
///
/// Holds labels only; the engine never reads it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub q_from: StateId,
    pub q_to: StateId,
    pub event: Option<String>,
    pub guard: Option<String>,
    pub reset: Option<String>,
}

/// A complete transition: endpoints plus guard, jump and event.
///
/// Registering a `Transition` sets the functional edge and its descriptive
/// record together, so the two cannot disagree.
#[derive(Clone, Debug)]
pub struct Transition {
    pub from: StateId,
    pub to: StateId,
    pub guard: Option<Guard>,
    pub jump: Option<Jump>,
    pub event: Option<String>,
}

impl Transition {
    /// Descriptive record derived from the callables' names.
    pub fn record(&self) -> TransitionRecord {
        TransitionRecord {
            q_from: self.from.clone(),
            q_to: self.to.clone(),
            event: self.event.clone(),
            guard: self.guard.as_ref().map(|g| g.name().to_string()),
            reset: self.jump.as_ref().map(|j| j.name().to_string()),
        }
    }

    pub(crate) fn into_edge(self) -> Edge {
        Edge {
            guard: self.guard,
            jump: self.jump,
            event: self.event,
        }
    }
}

/// Builder for constructing transitions with a fluent API.
///
/// # Example
///
/// ```rust
/// use hybrid_automata::automaton::TransitionBuilder;
/// use hybrid_automata::core::Jump;
///
/// let transition = TransitionBuilder::new()
///     .from("Q2")
///     .to("Q1")
///     .when("guard_Q2_Q1", |x: &[f64]| x[0] >= 10.0)
///     .on_event("beta")
///     .jump(Jump::new("reset_all", |x: &[f64]| vec![0.0; x.len()]))
///     .build()
///     .unwrap();
///
/// assert_eq!(transition.record().guard.as_deref(), Some("guard_Q2_Q1"));
/// assert_eq!(transition.record().reset.as_deref(), Some("reset_all"));
/// ```
#[derive(Default)]
pub struct TransitionBuilder {
    from: Option<StateId>,
    to: Option<StateId>,
    guard: Option<Guard>,
    jump: Option<Jump>,
    event: Option<String>,
}

impl TransitionBuilder {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source state (required).
    pub fn from(mut self, state: impl Into<StateId>) -> Self {
        self.from = Some(state.into());
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: impl Into<StateId>) -> Self {
        self.to = Some(state.into());
        self
    }

    /// Add a guard (optional).
    pub fn guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add a guard using a closure (optional).
    pub fn when<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&[f64]) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(name, predicate));
        self
    }

    /// Add a reset map (optional, identity when absent).
    pub fn jump(mut self, jump: Jump) -> Self {
        self.jump = Some(jump);
        self
    }

    /// Enable the transition while `event` is active (optional).
    pub fn on_event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Build the transition.
    pub fn build(self) -> Result<Transition, ConfigError> {
        let from = self.from.ok_or(ConfigError::MissingFromState)?;
        let to = self.to.ok_or(ConfigError::MissingToState)?;

        Ok(Transition {
            from,
            to,
            guard: self.guard,
            jump: self.jump,
            event: self.event,
        })
    }
}
