//! Hybrid automata: modeling and fixed-step simulation
//!
//! A hybrid automaton couples a finite set of discrete states with a vector
//! of real-valued variables. Inside each discrete state the variables evolve
//! according to a state-specific flow. Directed edges between states carry
//! guards (predicates over the continuous state), optional event triggers and
//! optional jump (reset) maps.
//!
//! # Core Concepts
//!
//! - **Automaton**: mutable model holding states, variables, events, flows,
//!   invariants and edges
//! - **Simulation**: explicit Euler integration with at most one discrete
//!   transition per tick and timed external event injection
//! - **Trace**: ordered `(time, state, continuous)` samples for plotting
//! - **Export**: name-level JSON snapshot of a model and persisted trace records
//!
//! # Example
//!
//! ```rust
//! use hybrid_automata::automaton::{Automaton, TransitionBuilder};
//! use hybrid_automata::core::Flow;
//! use hybrid_automata::simulation::{simulate, EventSchedule, SimulationConfig};
//!
//! let mut thermostat = Automaton::new();
//! thermostat.define_variables(["x"]).unwrap();
//! thermostat.add_state("Q1").add_state("Q2");
//! thermostat.set_initial_state("Q1", vec![72.0]).unwrap();
//! thermostat
//!     .set_flow("Q1", Flow::new("flow_Q1", |x: &[f64], _t: f64| vec![-x[0] + 50.0]))
//!     .unwrap();
//! thermostat
//!     .set_flow("Q2", Flow::new("flow_Q2", |x: &[f64], _t: f64| vec![-x[0] + 80.0]))
//!     .unwrap();
//! thermostat
//!     .transition(TransitionBuilder::new().from("Q1").to("Q2").when("guard_Q1_Q2", |x: &[f64]| x[0] <= 70.0))
//!     .unwrap();
//! thermostat
//!     .transition(TransitionBuilder::new().from("Q2").to("Q1").when("guard_Q2_Q1", |x: &[f64]| x[0] >= 75.0))
//!     .unwrap();
//!
//! let config = SimulationConfig::new(0.01, 5.0);
//! let trace = simulate(&mut thermostat, &config, &EventSchedule::new()).unwrap();
//!
//! assert_eq!(trace.first().unwrap().continuous, vec![72.0]);
//! assert!(trace.switch_times().len() >= 4);
//! ```

pub mod automaton;
pub mod core;
pub mod export;
pub mod simulation;

// Re-export commonly used types
pub use automaton::{Automaton, ConfigError, TransitionBuilder};
pub use crate::core::{Flow, Guard, Invariant, Jump, Sample, StateId, Trace};
pub use export::{AutomatonSnapshot, ExportError, TraceRecord};
pub use simulation::{simulate, EventSchedule, SimulationConfig, SimulationError, Simulator};
