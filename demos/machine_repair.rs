//! Machine Repair
//!
//! This example models a machine that is idle, busy or down.
//!
//! Key concepts:
//! - Two continuous variables: produced work `x` and busy timer `tau`
//! - Event-triggered transitions (alpha: start, beta: stop, gamma: repaired)
//! - A timeout guard on `tau` sending the machine down
//! - Reset maps zeroing the vector
//! - A timed event schedule with short pulses
//!
//! Run with: cargo run --example machine_repair

use hybrid_automata::automaton::{Automaton, TransitionBuilder};
use hybrid_automata::core::{Flow, Invariant, Jump};
use hybrid_automata::export::{AutomatonSnapshot, TraceRecord};
use hybrid_automata::simulation::{EventSchedule, SimulationConfig, Simulator};
use hybrid_automata::Trace;
use std::env;
use std::error::Error;
use stillwater::validation::Validation;

fn reset_all() -> Jump {
    Jump::new("reset_all", |x: &[f64]| vec![0.0; x.len()]).with_display("[0, 0]")
}

fn build() -> Result<Automaton, Box<dyn Error>> {
    let mut a = Automaton::new();
    a.define_variables(["x", "tau"])?;

    // Q1: IDLE, Q2: BUSY, Q3: DOWN
    for q in ["Q1", "Q2", "Q3"] {
        a.add_state(q);
    }
    a.define_event_set(["alpha", "beta", "gamma"]);
    a.set_initial_state("Q1", vec![0.0, 0.0])?;

    a.set_flow(
        "Q1",
        Flow::new("flow_Q1", |_x: &[f64], _t: f64| vec![0.0, 0.0]).with_display(["0", "0"]),
    )?;
    a.set_flow(
        "Q2",
        Flow::new("flow_Q2", |_x: &[f64], _t: f64| vec![2.5, 1.0]).with_display(["2.5", "1"]),
    )?;
    a.set_flow(
        "Q3",
        Flow::new("flow_Q3", |_x: &[f64], _t: f64| vec![0.0, 0.0]).with_display(["0", "0"]),
    )?;

    a.set_invariant("Q1", Invariant::always("inv_Q1"))?;
    a.set_invariant(
        "Q2",
        Invariant::new("inv_Q2", |x: &[f64]| x[1] < 3.0).with_display("tau < 3"),
    )?;
    a.set_invariant("Q3", Invariant::always("inv_Q3"))?;

    a.transition(
        TransitionBuilder::new()
            .from("Q1")
            .to("Q2")
            .on_event("alpha")
            .jump(Jump::identity("identity")),
    )?;
    a.transition(
        TransitionBuilder::new()
            .from("Q2")
            .to("Q1")
            .when("guard_Q2_Q1", |x: &[f64]| x[0] >= 10.0)
            .on_event("beta")
            .jump(reset_all()),
    )?;
    a.transition(
        TransitionBuilder::new()
            .from("Q2")
            .to("Q3")
            .when("guard_Q2_Q3", |x: &[f64]| x[1] >= 3.0)
            .jump(reset_all()),
    )?;
    a.transition(
        TransitionBuilder::new()
            .from("Q3")
            .to("Q1")
            .on_event("gamma")
            .jump(Jump::identity("identity")),
    )?;
    Ok(a)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    println!("=== Machine Repair Example ===\n");

    let mut automaton = build()?;
    if let Validation::Failure(errors) = automaton.validate() {
        for issue in errors.iter() {
            println!("  [Invalid] {issue}");
        }
        return Err("automaton failed validation".into());
    }

    let snapshot = AutomatonSnapshot::capture(
        &automaton,
        [
            ("flow_Q2", "[2.5, 1.0]"),
            ("inv_Q2", "x[1] < 3.0"),
            ("guard_Q2_Q1", "x[0] >= 10.0"),
            ("guard_Q2_Q3", "x[1] >= 3.0"),
            ("reset_all", "[0.0, 0.0]"),
        ],
    );
    let out_dir = env::temp_dir();
    let model_path = out_dir.join("automate_machine.json");
    snapshot.write_json(&model_path)?;
    println!("Model exported to {}\n", model_path.display());

    // Events are pulses: a flag left active would keep its edge enabled
    let schedule = EventSchedule::new()
        .pulse(1.0, 0.01, "alpha")
        .at(2.0, "beta", true)
        .at(2.1, "beta", false)
        .pulse(5.0, 0.01, "alpha")
        .pulse(11.0, 0.01, "gamma");

    let config = SimulationConfig::new(0.001, 20.0);
    let mut simulator = Simulator::new(&mut automaton, config, &schedule)?;
    let mut trace = Trace::with_capacity(config.expected_samples());
    trace.push(simulator.sample());

    println!("Transitions:");
    while !simulator.is_finished() {
        let result = simulator.step()?;
        if let Some(fired) = &result.transition {
            println!(
                "  t = {:>6.3}  {} -> {}  ({:?})",
                result.sample.time, fired.from, fired.to, fired.cause
            );
        }
        trace.push(result.sample);
    }

    let invariant_breaks = trace
        .iter()
        .filter(|s| automaton.check_invariant(s.state.name(), &s.continuous) == Some(false))
        .count();
    println!("\nSimulated {} samples", trace.len());
    println!("Samples outside their invariant: {invariant_breaks}");

    let record = TraceRecord::new(automaton.variables().to_vec(), config, trace);
    let trace_path = out_dir.join("trace_machine.json");
    record.write_json(&trace_path)?;
    println!("Trace {} saved to {}", record.id, trace_path.display());

    Ok(())
}
