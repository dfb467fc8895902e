//! Fixed-step simulation of hybrid automata.
//!
//! This module drives an [`Automaton`](crate::automaton::Automaton) forward
//! in hybrid time and produces a [`Trace`](crate::core::Trace).
//!
//! # Key Concepts
//!
//! - **Config**: step size and horizon of a run
//! - **Schedule**: timed external event toggles, merged at tick boundaries
//! - **Simulator**: step-wise driver, also usable as a lazy sample iterator
//! - **simulate**: run to the horizon and return the full trace
//!
//! Runs are single-threaded and deterministic: identical automaton, config
//! and schedule give identical traces.

mod config;
mod engine;
mod error;
mod schedule;

pub use config::SimulationConfig;
pub use engine::{simulate, FiredTransition, Simulator, StepResult, TransitionCause};
pub use error::SimulationError;
pub use schedule::{EventSchedule, ScheduledEvent};
