//! Export of automata and traces for external collaborators.
//!
//! Callables cannot be serialized, so the exported automaton reduces every
//! flow, invariant, guard and jump to its name. A caller-supplied
//! `name -> source text` mapping travels alongside for human-readable
//! labeling. The serialized field names (`Q, X, U, E, q0, x0, flow, Inv,
//! Guard, Jump, T, functions`) form a stable interchange format read by
//! downstream configuration generators.

use crate::automaton::{Automaton, TransitionRecord};
use crate::core::StateId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use tracing::debug;

pub mod error;
pub mod record;

pub use error::ExportError;
pub use record::{TraceRecord, TRACE_RECORD_VERSION};

/// Name-level snapshot of an automaton.
///
/// Does NOT include function bodies (not serializable).
///
/// # Example
///
/// ```rust
/// use hybrid_automata::automaton::{Automaton, TransitionBuilder};
/// use hybrid_automata::core::Flow;
/// use hybrid_automata::export::AutomatonSnapshot;
///
/// let mut a = Automaton::new();
/// a.define_variables(["x"]).unwrap();
/// a.add_state("Q1").add_state("Q2");
/// a.set_initial_state("Q1", vec![72.0]).unwrap();
/// a.set_flow("Q1", Flow::new("flow_Q1", |x: &[f64], _t: f64| vec![-x[0] + 50.0])).unwrap();
/// a.transition(TransitionBuilder::new().from("Q1").to("Q2").when("guard_Q1_Q2", |x: &[f64]| x[0] <= 70.0))
///     .unwrap();
///
/// let snapshot = AutomatonSnapshot::capture(&a, [("guard_Q1_Q2", "x[0] <= 70")]);
/// let json = snapshot.to_json().unwrap();
/// let restored = AutomatonSnapshot::from_json(&json).unwrap();
///
/// assert_eq!(restored, snapshot);
/// assert_eq!(restored.guard_name("Q1", "Q2"), Some("guard_Q1_Q2"));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AutomatonSnapshot {
    /// Discrete states
    #[serde(rename = "Q")]
    pub states: Vec<StateId>,

    /// Continuous variables
    #[serde(rename = "X")]
    pub variables: Vec<String>,

    /// Input space
    #[serde(rename = "U", default)]
    pub inputs: Vec<String>,

    /// Event set with activation flags
    #[serde(rename = "E", default)]
    pub events: IndexMap<String, bool>,

    /// Initial discrete state
    #[serde(rename = "q0")]
    pub initial_state: Option<StateId>,

    /// Initial continuous state
    #[serde(rename = "x0")]
    pub initial_continuous: Vec<f64>,

    /// Flow name per state
    #[serde(rename = "flow", default)]
    pub flows: IndexMap<StateId, String>,

    /// Invariant name per state
    #[serde(rename = "Inv", default)]
    pub invariants: IndexMap<StateId, String>,

    /// Guard name per `from -> to` edge, `null` for unguarded edges
    #[serde(rename = "Guard", default)]
    pub guards: IndexMap<StateId, IndexMap<StateId, Option<String>>>,

    /// Jump name per `from -> to` edge, `null` for identity resets
    #[serde(rename = "Jump", default)]
    pub jumps: IndexMap<StateId, IndexMap<StateId, Option<String>>>,

    /// Descriptive transitions
    #[serde(rename = "T", default)]
    pub transitions: Vec<TransitionRecord>,

    /// Function name to source or display text
    #[serde(default)]
    pub functions: IndexMap<String, String>,
}

impl AutomatonSnapshot {
    /// Capture the names of `automaton` together with a function text map.
    pub fn capture<I, K, V>(automaton: &Automaton, functions: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut guards: IndexMap<StateId, IndexMap<StateId, Option<String>>> = IndexMap::new();
        let mut jumps: IndexMap<StateId, IndexMap<StateId, Option<String>>> = IndexMap::new();
        for (from, to, edge) in automaton.edges() {
            guards
                .entry(from.clone())
                .or_default()
                .insert(to.clone(), edge.guard().map(|g| g.name().to_string()));
            jumps
                .entry(from.clone())
                .or_default()
                .insert(to.clone(), edge.jump().map(|j| j.name().to_string()));
        }

        Self {
            states: automaton.states().iter().cloned().collect(),
            variables: automaton.variables().to_vec(),
            inputs: automaton.inputs().to_vec(),
            events: automaton.events().clone(),
            initial_state: automaton.initial_state().cloned(),
            initial_continuous: automaton.initial_continuous().to_vec(),
            flows: automaton
                .flows()
                .iter()
                .map(|(state, flow)| (state.clone(), flow.name().to_string()))
                .collect(),
            invariants: automaton
                .invariants()
                .iter()
                .map(|(state, inv)| (state.clone(), inv.name().to_string()))
                .collect(),
            guards,
            jumps,
            transitions: automaton.transitions().to_vec(),
            functions: functions
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn flow_name(&self, state: &str) -> Option<&str> {
        self.flows.get(state).map(String::as_str)
    }

    pub fn invariant_name(&self, state: &str) -> Option<&str> {
        self.invariants.get(state).map(String::as_str)
    }

    pub fn guard_name(&self, from: &str, to: &str) -> Option<&str> {
        self.guards
            .get(from)
            .and_then(|out| out.get(to))
            .and_then(|name| name.as_deref())
    }

    pub fn jump_name(&self, from: &str, to: &str) -> Option<&str> {
        self.jumps
            .get(from)
            .and_then(|out| out.get(to))
            .and_then(|name| name.as_deref())
    }

    /// Source text registered for `name`, if any.
    pub fn function_text(&self, name: &str) -> Option<&str> {
        self.functions.get(name).map(String::as_str)
    }

    /// Check referential integrity of a (possibly hand-edited) snapshot,
    /// accumulating every problem.
    pub fn check(&self) -> Validation<(), NonEmptyVec<String>> {
        let known = |state: &StateId| self.states.contains(state);
        let mut checks: Vec<Validation<(), NonEmptyVec<String>>> = Vec::new();
        let mut require = |ok: bool, message: String| {
            checks.push(if ok {
                Validation::success(())
            } else {
                Validation::fail(message)
            });
        };

        if let Some(q0) = &self.initial_state {
            require(known(q0), format!("q0 '{q0}' is not in Q"));
        }
        require(
            self.initial_continuous.len() == self.variables.len(),
            format!(
                "x0 has {} values but X has {} variables",
                self.initial_continuous.len(),
                self.variables.len()
            ),
        );
        for state in self.flows.keys() {
            require(known(state), format!("flow references unknown state '{state}'"));
        }
        for state in self.invariants.keys() {
            require(known(state), format!("Inv references unknown state '{state}'"));
        }
        for (key, map) in [("Guard", &self.guards), ("Jump", &self.jumps)] {
            for (from, out) in map {
                for to in out.keys() {
                    require(
                        known(from) && known(to),
                        format!("{key} references unknown edge {from} -> {to}"),
                    );
                }
            }
        }
        for record in &self.transitions {
            require(
                known(&record.q_from) && known(&record.q_to),
                format!(
                    "T references unknown edge {} -> {}",
                    record.q_from, record.q_to
                ),
            );
        }

        Validation::all_vec(checks).map(|_| ())
    }

    /// Like [`check`](Self::check), folded into an [`ExportError`].
    pub fn validate(&self) -> Result<(), ExportError> {
        match self.check() {
            Validation::Success(()) => Ok(()),
            Validation::Failure(errors) => Err(ExportError::ValidationFailed(
                errors.iter().cloned().collect::<Vec<_>>().join("; "),
            )),
        }
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ExportError::SerializationFailed(e.to_string()))
    }

    /// Parse and validate a snapshot.
    pub fn from_json(json: &str) -> Result<Self, ExportError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| ExportError::DeserializationFailed(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Write the snapshot as JSON, atomically replacing `path`.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        let path = path.as_ref();
        write_atomic(path, self.to_json()?.as_bytes())?;
        debug!(path = %path.display(), states = self.states.len(), "Exported automaton");
        Ok(())
    }

    pub fn read_json(path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

/// Write through a temporary sibling file, then rename over `path`.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = Path::new(&temp);

    fs::write(temp, bytes).map_err(|source| ExportError::Io {
        path: temp.to_path_buf(),
        source,
    })?;
    fs::rename(temp, path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
