//! Core hybrid automaton values.
//!
//! This module contains the building blocks shared by the model and the
//! engine:
//! - Discrete-state identifiers via `StateId`
//! - Named capability objects for flows, invariants, guards and jumps
//! - The simulation `Trace`
//!
//! Everything here is pure data or pure functions over the continuous
//! vector.

mod dynamics;
mod guard;
mod state;
mod trace;

pub use dynamics::{Flow, Invariant, Jump};
pub use guard::Guard;
pub use state::StateId;
pub use trace::{Sample, Trace};
