//! Whole-model validation that accumulates every problem.
//!
//! Mutations already reject invalid references one at a time. This pass
//! looks at the finished automaton and reports ALL structural issues at
//! once using Stillwater's `Validation`, e.g. before exporting or running a
//! long simulation.

use crate::automaton::Automaton;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// A structural problem found by [`Automaton::validate`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationIssue {
    #[error("Initial state not specified. Call set_initial_state")]
    MissingInitialState,

    #[error("State '{state}' has no flow")]
    MissingFlow { state: String },

    #[error("Edge {from} -> {to} uses event '{event}' outside the event set")]
    UndeclaredEvent {
        from: String,
        to: String,
        event: String,
    },

    #[error("Edge {from} -> {to} has neither guard nor event and can never fire")]
    UntriggerableEdge { from: String, to: String },

    #[error("Transition record {from} -> {to} has no registered edge")]
    RecordWithoutEdge { from: String, to: String },

    #[error("Edge {from} -> {to} has no transition record")]
    EdgeWithoutRecord { from: String, to: String },

    #[error(
        "Transition record {from} -> {to} labels {field} as {recorded:?} but the edge has {registered:?}"
    )]
    LabelMismatch {
        from: String,
        to: String,
        field: &'static str,
        recorded: Option<String>,
        registered: Option<String>,
    },
}

type Check = Validation<(), NonEmptyVec<ValidationIssue>>;

fn check(ok: bool, issue: impl FnOnce() -> ValidationIssue) -> Check {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(issue())
    }
}

impl Automaton {
    /// Validate the whole automaton, accumulating ALL issues.
    ///
    /// Returns `Validation::Success(())` if the automaton is complete and its
    /// descriptive transition list agrees with the functional edges.
    pub fn validate(&self) -> Check {
        let mut checks: Vec<Check> = Vec::new();

        checks.push(check(self.initial_state().is_some(), || {
            ValidationIssue::MissingInitialState
        }));

        for state in self.states() {
            checks.push(check(self.flow(state.name()).is_some(), || {
                ValidationIssue::MissingFlow {
                    state: state.name().to_string(),
                }
            }));
        }

        for (from, to, edge) in self.edges() {
            checks.push(check(edge.is_triggerable(), || {
                ValidationIssue::UntriggerableEdge {
                    from: from.name().to_string(),
                    to: to.name().to_string(),
                }
            }));

            if let Some(event) = edge.event() {
                checks.push(check(self.events().contains_key(event), || {
                    ValidationIssue::UndeclaredEvent {
                        from: from.name().to_string(),
                        to: to.name().to_string(),
                        event: event.to_string(),
                    }
                }));
            }

            let recorded = self
                .transitions()
                .iter()
                .any(|r| &r.q_from == from && &r.q_to == to);
            checks.push(check(recorded, || ValidationIssue::EdgeWithoutRecord {
                from: from.name().to_string(),
                to: to.name().to_string(),
            }));
        }

        for record in self.transitions() {
            let from = record.q_from.name();
            let to = record.q_to.name();
            let Some(edge) = self.edge(from, to) else {
                checks.push(Validation::fail(ValidationIssue::RecordWithoutEdge {
                    from: from.to_string(),
                    to: to.to_string(),
                }));
                continue;
            };

            let labels = [
                ("guard", &record.guard, edge.guard().map(|g| g.name())),
                ("reset", &record.reset, edge.jump().map(|j| j.name())),
                ("event", &record.event, edge.event()),
            ];
            for (field, recorded, registered) in labels {
                checks.push(check(recorded.as_deref() == registered, || {
                    ValidationIssue::LabelMismatch {
                        from: from.to_string(),
                        to: to.to_string(),
                        field,
                        recorded: recorded.clone(),
                        registered: registered.map(str::to_string),
                    }
                }));
            }
        }

        Validation::all_vec(checks).map(|_| ())
    }
}
