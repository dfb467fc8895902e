//! Thermostat
//!
//! This example models a two-mode thermostat with a hysteresis band.
//!
//! Key concepts:
//! - One continuous variable `x` (room temperature)
//! - Heater off (Q1) cools toward 50, heater on (Q2) warms toward 80
//! - Guards switch modes at 70 and 75
//! - Exporting the model and the trace as JSON
//!
//! Run with: cargo run --example thermostat

use hybrid_automata::automaton::{Automaton, TransitionBuilder};
use hybrid_automata::core::{Flow, Invariant, Jump};
use hybrid_automata::export::{AutomatonSnapshot, TraceRecord};
use hybrid_automata::simulation::{simulate, EventSchedule, SimulationConfig};
use std::env;
use std::error::Error;
use stillwater::validation::Validation;

fn build() -> Result<Automaton, Box<dyn Error>> {
    let mut a = Automaton::new();
    a.define_variables(["x"])?;
    a.add_state("Q1").add_state("Q2");
    a.set_initial_state("Q1", vec![72.0])?;

    a.set_flow(
        "Q1",
        Flow::new("flow_Q1", |x: &[f64], _t: f64| vec![-x[0] + 50.0]).with_display(["-x + 50"]),
    )?;
    a.set_flow(
        "Q2",
        Flow::new("flow_Q2", |x: &[f64], _t: f64| vec![-x[0] + 80.0]).with_display(["-x + 80"]),
    )?;
    a.set_invariant("Q1", Invariant::always("inv_Q1"))?;
    a.set_invariant("Q2", Invariant::always("inv_Q2"))?;

    a.transition(
        TransitionBuilder::new()
            .from("Q1")
            .to("Q2")
            .when("guard_Q1_Q2", |x: &[f64]| x[0] <= 70.0)
            .jump(Jump::identity("reset_none")),
    )?;
    a.transition(
        TransitionBuilder::new()
            .from("Q2")
            .to("Q1")
            .when("guard_Q2_Q1", |x: &[f64]| x[0] >= 75.0)
            .jump(Jump::identity("reset_none")),
    )?;
    Ok(a)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    println!("=== Thermostat Example ===\n");

    let mut automaton = build()?;
    if let Validation::Failure(errors) = automaton.validate() {
        for issue in errors.iter() {
            println!("  [Invalid] {issue}");
        }
        return Err("automaton failed validation".into());
    }

    for state in automaton.states() {
        println!("{state}:");
        for line in automaton.flow_labels(state.name()) {
            println!("  {line}");
        }
    }
    println!();

    let out_dir = env::temp_dir();
    let snapshot = AutomatonSnapshot::capture(
        &automaton,
        [
            ("flow_Q1", "[-x[0] + 50]"),
            ("flow_Q2", "[-x[0] + 80]"),
            ("guard_Q1_Q2", "x[0] <= 70"),
            ("guard_Q2_Q1", "x[0] >= 75"),
        ],
    );
    let model_path = out_dir.join("automate_thermostat.json");
    snapshot.write_json(&model_path)?;
    println!("Model exported to {}", model_path.display());

    let config = SimulationConfig::new(0.01, 5.0);
    let trace = simulate(&mut automaton, &config, &EventSchedule::new())?;

    println!("\nSimulated {} samples", trace.len());
    println!("Mode sequence:");
    let switches = trace.switch_times();
    for (state, time) in trace.state_path().into_iter().zip(
        std::iter::once(0.0).chain(switches.iter().copied()),
    ) {
        println!("  t = {time:>6.2}  {state}");
    }

    if let Some(last) = trace.last() {
        println!(
            "\nFinal: t = {:.2}, {} with x = {:.3}",
            last.time, last.state, last.continuous[0]
        );
    }

    let record = TraceRecord::new(automaton.variables().to_vec(), config, trace);
    let trace_path = out_dir.join("trace_thermostat.json");
    record.write_json(&trace_path)?;
    println!("Trace {} saved to {}", record.id, trace_path.display());

    Ok(())
}
