//! Configuration errors raised by automaton mutations.

use thiserror::Error;

/// Errors that can occur when configuring an automaton.
///
/// Every mutation checks its preconditions first and returns one of these
/// without touching the automaton.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Unknown state '{state}' referenced by {context}. Call add_state first")]
    UnknownState {
        state: String,
        context: &'static str,
    },

    #[error("Dimension mismatch in {context}: expected {expected} values, got {found}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Transition source state not specified. Call .from(state)")]
    MissingFromState,

    #[error("Transition target state not specified. Call .to(state)")]
    MissingToState,
}
