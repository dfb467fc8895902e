//! End-to-end scenarios: building, simulating and exporting whole automata.

use hybrid_automata::automaton::{Automaton, TransitionBuilder};
use hybrid_automata::core::{Flow, Invariant, Jump, StateId};
use hybrid_automata::export::{AutomatonSnapshot, TraceRecord};
use hybrid_automata::simulation::{
    simulate, EventSchedule, SimulationConfig, Simulator, TransitionCause,
};

fn thermostat() -> Automaton {
    let mut a = Automaton::new();
    a.define_variables(["x"]).unwrap();
    a.add_state("Q1").add_state("Q2");
    a.set_initial_state("Q1", vec![72.0]).unwrap();
    a.set_flow(
        "Q1",
        Flow::new("flow_Q1", |x: &[f64], _: f64| vec![-x[0] + 50.0]).with_display(["-x + 50"]),
    )
    .unwrap();
    a.set_flow(
        "Q2",
        Flow::new("flow_Q2", |x: &[f64], _: f64| vec![-x[0] + 80.0]).with_display(["-x + 80"]),
    )
    .unwrap();
    a.set_invariant("Q1", Invariant::always("inv_Q1")).unwrap();
    a.set_invariant("Q2", Invariant::always("inv_Q2")).unwrap();
    a.transition(
        TransitionBuilder::new()
            .from("Q1")
            .to("Q2")
            .when("guard_Q1_Q2", |x: &[f64]| x[0] <= 70.0)
            .jump(Jump::identity("reset_none")),
    )
    .unwrap();
    a.transition(
        TransitionBuilder::new()
            .from("Q2")
            .to("Q1")
            .when("guard_Q2_Q1", |x: &[f64]| x[0] >= 75.0)
            .jump(Jump::identity("reset_none")),
    )
    .unwrap();
    a
}

fn machine_repair() -> Automaton {
    let reset_all = || Jump::new("reset_all", |_: &[f64]| vec![0.0, 0.0]);

    let mut a = Automaton::new();
    a.define_variables(["x", "tau"]).unwrap();
    for q in ["Q1", "Q2", "Q3"] {
        a.add_state(q);
    }
    a.define_event_set(["alpha", "beta", "gamma"]);
    a.set_initial_state("Q1", vec![0.0, 0.0]).unwrap();
    a.set_flow("Q1", Flow::new("flow_Q1", |_: &[f64], _: f64| vec![0.0, 0.0]))
        .unwrap();
    a.set_flow("Q2", Flow::new("flow_Q2", |_: &[f64], _: f64| vec![2.5, 1.0]))
        .unwrap();
    a.set_flow("Q3", Flow::new("flow_Q3", |_: &[f64], _: f64| vec![0.0, 0.0]))
        .unwrap();
    a.set_invariant("Q2", Invariant::new("inv_Q2", |x: &[f64]| x[1] < 3.0))
        .unwrap();

    a.transition(
        TransitionBuilder::new()
            .from("Q1")
            .to("Q2")
            .on_event("alpha")
            .jump(Jump::identity("identity")),
    )
    .unwrap();
    a.transition(
        TransitionBuilder::new()
            .from("Q2")
            .to("Q1")
            .when("guard_Q2_Q1", |x: &[f64]| x[0] >= 10.0)
            .on_event("beta")
            .jump(reset_all()),
    )
    .unwrap();
    a.transition(
        TransitionBuilder::new()
            .from("Q2")
            .to("Q3")
            .when("guard_Q2_Q3", |x: &[f64]| x[1] >= 3.0)
            .jump(reset_all()),
    )
    .unwrap();
    a.transition(
        TransitionBuilder::new()
            .from("Q3")
            .to("Q1")
            .on_event("gamma")
            .jump(Jump::identity("identity")),
    )
    .unwrap();
    a
}

fn repair_schedule() -> EventSchedule {
    EventSchedule::new()
        .pulse(1.0, 0.01, "alpha")
        .at(2.0, "beta", true)
        .at(2.1, "beta", false)
        .pulse(5.0, 0.01, "alpha")
        .pulse(11.0, 0.01, "gamma")
}

#[test]
fn thermostat_oscillates_inside_hysteresis_band() {
    let mut a = thermostat();
    assert!(a.validate().is_success());

    let trace = simulate(&mut a, &SimulationConfig::new(0.01, 5.0), &EventSchedule::new()).unwrap();

    let first = trace.first().unwrap();
    assert_eq!(first.time, 0.0);
    assert_eq!(first.state, "Q1");
    assert_eq!(first.continuous, vec![72.0]);
    assert!(trace.len() >= 500 && trace.len() <= 502);

    let path: Vec<&str> = trace.state_path().into_iter().map(|s| s.name()).collect();
    assert!(path.len() >= 5, "expected oscillation, got {path:?}");
    for (i, state) in path.iter().enumerate() {
        assert_eq!(*state, if i % 2 == 0 { "Q1" } else { "Q2" });
    }

    // Euler overshoot is bounded by one tick of the flow
    let first_switch = trace.switch_times()[0];
    for sample in trace.iter().filter(|s| s.time >= first_switch) {
        let x = sample.continuous[0];
        assert!((69.7..=75.1).contains(&x), "x = {x} at t = {}", sample.time);
    }

    // every switch happens on the first sample past its threshold
    for pair in trace.samples().windows(2) {
        let (before, after) = (&pair[0], &pair[1]);
        let x = after.continuous[0];
        let switched = before.state != after.state;
        match (after.state.name(), switched) {
            ("Q2", true) => {
                assert!(x <= 70.0, "entered Q2 at x = {x}");
                assert!(before.continuous[0] > 70.0);
            }
            ("Q1", true) => {
                assert!(x >= 75.0, "entered Q1 at x = {x}");
                assert!(before.continuous[0] < 75.0);
            }
            ("Q1", false) => assert!(x > 70.0, "stayed in Q1 at x = {x}"),
            ("Q2", false) => assert!(x < 75.0, "stayed in Q2 at x = {x}"),
            (other, _) => panic!("unexpected state {other}"),
        }
    }

    // decay from 72 toward 50 crosses 70 after roughly ln(22/20) seconds
    assert!((first_switch - 0.1).abs() < 0.03, "first switch at {first_switch}");
}

#[test]
fn machine_repair_follows_the_event_schedule() {
    let mut a = machine_repair();
    assert!(a.validate().is_success());

    let trace = simulate(&mut a, &SimulationConfig::new(0.001, 20.0), &repair_schedule()).unwrap();

    let path: Vec<&str> = trace.state_path().into_iter().map(|s| s.name()).collect();
    assert_eq!(path, vec!["Q1", "Q2", "Q1", "Q2", "Q3", "Q1"]);

    let switches = trace.switch_times();
    let expected = [1.0, 2.0, 5.0, 8.0, 11.0];
    assert_eq!(switches.len(), expected.len());
    for (actual, expected) in switches.iter().zip(expected) {
        assert!(
            (actual - expected).abs() < 0.01,
            "switch at {actual}, expected near {expected}"
        );
    }

    // resets zero the vector when leaving Q2
    let after_timeout = trace
        .iter()
        .find(|s| s.state == "Q3")
        .map(|s| s.continuous.clone())
        .unwrap();
    assert_eq!(after_timeout, vec![0.0, 0.0]);

    let last = trace.last().unwrap();
    assert_eq!(last.state, "Q1");
    assert_eq!(last.continuous, vec![0.0, 0.0]);
}

#[test]
fn machine_repair_reports_transition_causes() {
    let mut a = machine_repair();
    let schedule = repair_schedule();
    let mut sim = Simulator::new(&mut a, SimulationConfig::new(0.001, 20.0), &schedule).unwrap();

    let mut causes = Vec::new();
    while !sim.is_finished() {
        if let Some(fired) = sim.step().unwrap().transition {
            causes.push(fired.cause);
        }
    }

    assert_eq!(
        causes,
        vec![
            TransitionCause::Event("alpha".to_string()),
            TransitionCause::Event("beta".to_string()),
            TransitionCause::Event("alpha".to_string()),
            TransitionCause::Guard("guard_Q2_Q3".to_string()),
            TransitionCause::Event("gamma".to_string()),
        ]
    );
}

#[test]
fn scheduled_pulse_is_seen_exactly_on_its_window() {
    for step in [0.001, 0.01, 0.003, 0.05] {
        let mut a = Automaton::new();
        a.define_variables(["x"]).unwrap();
        a.define_event_set(["alpha"]);
        a.add_state("Q1");
        a.set_initial_state("Q1", vec![0.0]).unwrap();
        a.set_flow("Q1", Flow::new("hold", |_: &[f64], _: f64| vec![0.0]))
            .unwrap();

        let schedule = EventSchedule::new().at(1.01, "alpha", false).at(1.0, "alpha", true);
        let mut sim = Simulator::new(&mut a, SimulationConfig::new(step, 2.0), &schedule).unwrap();

        let mut seen_active = false;
        while !sim.is_finished() {
            let tick_start = sim.time();
            sim.step().unwrap();
            let expected = (1.0..1.01).contains(&tick_start);
            assert_eq!(
                sim.event_active("alpha"),
                expected,
                "step {step}, tick starting at {tick_start}"
            );
            seen_active |= expected;
        }
        assert!(!sim.event_active("alpha"));
        if step < 0.01 {
            assert!(seen_active, "step {step} never observed the pulse");
        }
    }
}

#[test]
fn single_tick_pulse_enables_event_edge_once() {
    let mut a = machine_repair();
    let schedule = EventSchedule::new().pulse(1.0, 0.01, "alpha");
    let trace = simulate(&mut a, &SimulationConfig::new(0.01, 1.5), &schedule).unwrap();

    let path: Vec<&str> = trace.state_path().into_iter().map(|s| s.name()).collect();
    assert_eq!(path, vec!["Q1", "Q2"]);
}

#[test]
fn export_round_trip_preserves_names() {
    let a = machine_repair();
    let snapshot = AutomatonSnapshot::capture(
        &a,
        [
            ("flow_Q2", "[2.5, 1.0]"),
            ("guard_Q2_Q3", "x[1] >= 3.0"),
            ("reset_all", "[0.0, 0.0]"),
        ],
    );

    let restored = AutomatonSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();

    assert_eq!(restored.states.len(), 3);
    assert_eq!(restored.transitions.len(), 4);
    assert_eq!(restored.initial_state, Some(StateId::from("Q1")));
    assert_eq!(restored.initial_continuous, vec![0.0, 0.0]);
    assert_eq!(restored.flow_name("Q3"), Some("flow_Q3"));
    assert_eq!(restored.invariant_name("Q2"), Some("inv_Q2"));
    assert_eq!(restored.guard_name("Q2", "Q1"), Some("guard_Q2_Q1"));
    assert_eq!(restored.guard_name("Q3", "Q1"), None);
    assert_eq!(restored.jump_name("Q2", "Q3"), Some("reset_all"));
    assert_eq!(restored.jump_name("Q1", "Q2"), Some("identity"));
    assert_eq!(restored.function_text("guard_Q2_Q3"), Some("x[1] >= 3.0"));
    assert_eq!(restored.transitions[1].event.as_deref(), Some("beta"));
}

#[test]
fn trace_record_keeps_run_context() {
    let mut a = thermostat();
    let config = SimulationConfig::new(0.05, 1.0);
    let trace = simulate(&mut a, &config, &EventSchedule::new()).unwrap();

    let record = TraceRecord::new(a.variables().to_vec(), config, trace.clone());
    let restored = TraceRecord::from_bytes(&record.to_bytes().unwrap()).unwrap();

    assert_eq!(restored.trace, trace);
    assert_eq!(restored.config, config);
    assert_eq!(restored.series("x").unwrap().len(), trace.len());
}
