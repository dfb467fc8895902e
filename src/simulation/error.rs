//! Simulation-time errors.

use thiserror::Error;

/// Errors that terminate a simulation run.
///
/// A run either produces the full trace up to the horizon or fails with one
/// of these; there is no partial result.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SimulationError {
    #[error("Invalid simulation config: {reason}")]
    InvalidConfig { reason: String },

    #[error("Initial state not specified. Call set_initial_state before simulating")]
    MissingInitialState,

    #[error("No flow defined for state '{state}' at t = {time}")]
    MissingFlow { state: String, time: f64 },

    #[error("Flow of state '{state}' returned {found} values, expected {expected}")]
    FlowDimension {
        state: String,
        expected: usize,
        found: usize,
    },

    #[error("Jump {from} -> {to} returned {found} values, expected {expected}")]
    JumpDimension {
        from: String,
        to: String,
        expected: usize,
        found: usize,
    },

    #[error("Simulation cancelled at t = {time}")]
    Cancelled { time: f64 },
}
