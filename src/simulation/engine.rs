//! Fixed-step hybrid-time simulation.
//!
//! Each tick of size `step` runs, in order:
//! 1. event merge: every schedule entry with `time <= t` is applied
//! 2. flow integration: explicit Euler, `x[i] += dx[i] * step`
//! 3. transition evaluation: the first enabled outgoing edge fires
//! 4. time advance: `t += step`, then the sample is recorded
//!
//! At most one transition fires per tick.

use crate::automaton::Automaton;
use crate::core::{Sample, StateId, Trace};
use crate::simulation::config::SimulationConfig;
use crate::simulation::error::SimulationError;
use crate::simulation::schedule::{EventSchedule, ScheduledEvent};
use indexmap::IndexMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// What enabled a fired transition.
#[derive(Clone, Debug, PartialEq)]
pub enum TransitionCause {
    /// The guard held on the post-integration vector
    Guard(String),
    /// The associated event was active
    Event(String),
}

/// A transition taken during one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct FiredTransition {
    pub from: StateId,
    pub to: StateId,
    pub cause: TransitionCause,
}

/// Result of executing a single tick.
#[derive(Clone, Debug, PartialEq)]
pub struct StepResult {
    /// Sample recorded at the end of the tick
    pub sample: Sample,
    /// Transition taken during the tick, if any
    pub transition: Option<FiredTransition>,
}

/// Step-wise simulation driver.
///
/// Borrows the automaton mutably for the whole run: the runtime cursor and
/// event flags move with every tick, the static definition is only read.
///
/// As an [`Iterator`] it yields the initial sample followed by one sample
/// per tick until the horizon, so long traces can be consumed lazily.
pub struct Simulator<'a> {
    automaton: &'a mut Automaton,
    config: SimulationConfig,
    schedule: Vec<ScheduledEvent>,
    next_event: usize,
    time: f64,
    state: StateId,
    continuous: Vec<f64>,
    initial_emitted: bool,
    failed: bool,
    cancel: Option<Arc<AtomicBool>>,
    /// Flags of scheduled events outside the event set, local to this run
    undeclared: IndexMap<String, bool>,
}

impl<'a> Simulator<'a> {
    /// Prepare a run from the automaton's initial condition.
    ///
    /// Event flags are reset to inactive so that identical inputs always
    /// produce identical traces.
    pub fn new(
        automaton: &'a mut Automaton,
        config: SimulationConfig,
        schedule: &EventSchedule,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        let state = automaton
            .initial_state()
            .cloned()
            .ok_or(SimulationError::MissingInitialState)?;
        let continuous = automaton.initial_continuous().to_vec();
        automaton.reset_runtime();

        Ok(Self {
            automaton,
            config,
            schedule: schedule.sorted(),
            next_event: 0,
            time: 0.0,
            state,
            continuous,
            initial_emitted: false,
            failed: false,
            cancel: None,
            undeclared: IndexMap::new(),
        })
    }

    /// Poll `flag` once per tick and stop with
    /// [`SimulationError::Cancelled`] when it is set.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn state(&self) -> &StateId {
        &self.state
    }

    pub fn continuous(&self) -> &[f64] {
        &self.continuous
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Current flag of `event`, including scheduled events that are not
    /// in the automaton's event set.
    pub fn event_active(&self, event: &str) -> bool {
        self.automaton.event_active(event)
            || self.undeclared.get(event).copied().unwrap_or(false)
    }

    pub fn automaton(&self) -> &Automaton {
        self.automaton
    }

    /// Whether time has reached the horizon.
    pub fn is_finished(&self) -> bool {
        self.time >= self.config.horizon
    }

    /// Sample of the current `(t, q, x)`.
    pub fn sample(&self) -> Sample {
        Sample {
            time: self.time,
            state: self.state.clone(),
            continuous: self.continuous.clone(),
        }
    }

    /// Execute one tick.
    pub fn step(&mut self) -> Result<StepResult, SimulationError> {
        if let Some(flag) = &self.cancel {
            if flag.load(Ordering::Relaxed) {
                return Err(SimulationError::Cancelled { time: self.time });
            }
        }

        self.merge_events();
        self.integrate()?;
        let transition = self.fire_transition()?;

        self.time += self.config.step;
        self.automaton.set_cursor(&self.state, &self.continuous);

        Ok(StepResult {
            sample: self.sample(),
            transition,
        })
    }

    /// Run to the horizon and collect the full trace.
    pub fn run(mut self) -> Result<Trace, SimulationError> {
        let mut trace = Trace::with_capacity(self.config.expected_samples());
        trace.push(self.sample());
        self.initial_emitted = true;

        while !self.is_finished() {
            let result = self.step()?;
            trace.push(result.sample);
        }
        Ok(trace)
    }

    fn merge_events(&mut self) {
        while let Some(entry) = self.schedule.get(self.next_event) {
            if entry.time > self.time {
                break;
            }
            let declared = self.automaton.set_event_flag(&entry.event, entry.active);
            if !declared {
                self.undeclared.insert(entry.event.clone(), entry.active);
                warn!(
                    event = %entry.event,
                    time = entry.time,
                    "Scheduled event is not in the event set"
                );
            }
            trace!(
                event = %entry.event,
                active = entry.active,
                scheduled = entry.time,
                time = self.time,
                "Applied scheduled event"
            );
            self.next_event += 1;
        }
    }

    fn integrate(&mut self) -> Result<(), SimulationError> {
        let flow = self
            .automaton
            .flow(self.state.name())
            .ok_or_else(|| SimulationError::MissingFlow {
                state: self.state.name().to_string(),
                time: self.time,
            })?;

        let dx = flow.evaluate(&self.continuous, self.time);
        if dx.len() != self.continuous.len() {
            return Err(SimulationError::FlowDimension {
                state: self.state.name().to_string(),
                expected: self.continuous.len(),
                found: dx.len(),
            });
        }

        let step = self.config.step;
        for (x, d) in self.continuous.iter_mut().zip(&dx) {
            *x += d * step;
        }
        Ok(())
    }

    fn fire_transition(&mut self) -> Result<Option<FiredTransition>, SimulationError> {
        let mut fired = None;

        for (to, edge) in self.automaton.outgoing(self.state.name()) {
            let guard_true = edge.guard().is_some_and(|g| g.check(&self.continuous));
            let event_true = edge.event().is_some_and(|e| self.event_active(e));
            if !(guard_true || event_true) {
                continue;
            }

            let cause = match edge.guard() {
                Some(guard) if guard_true => TransitionCause::Guard(guard.name().to_string()),
                _ => TransitionCause::Event(edge.event().unwrap_or_default().to_string()),
            };
            let next = match edge.jump() {
                Some(jump) => {
                    let reset = jump.apply(&self.continuous);
                    if reset.len() != self.continuous.len() {
                        return Err(SimulationError::JumpDimension {
                            from: self.state.name().to_string(),
                            to: to.name().to_string(),
                            expected: self.continuous.len(),
                            found: reset.len(),
                        });
                    }
                    Some(reset)
                }
                None => None,
            };
            fired = Some((to.clone(), next, cause));
            break;
        }

        let Some((to, next, cause)) = fired else {
            return Ok(None);
        };

        debug!(
            time = self.time,
            from = %self.state,
            to = %to,
            cause = ?cause,
            "Transition fired"
        );
        if let Some(next) = next {
            self.continuous = next;
        }
        let from = std::mem::replace(&mut self.state, to.clone());
        Ok(Some(FiredTransition { from, to, cause }))
    }
}

impl Iterator for Simulator<'_> {
    type Item = Result<Sample, SimulationError>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.initial_emitted {
            self.initial_emitted = true;
            return Some(Ok(self.sample()));
        }
        if self.failed || self.is_finished() {
            return None;
        }
        match self.step() {
            Ok(result) => Some(Ok(result.sample)),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

/// Simulate `automaton` from its initial condition up to `config.horizon`.
///
/// # Example
///
/// ```rust
/// use hybrid_automata::automaton::Automaton;
/// use hybrid_automata::core::Flow;
/// use hybrid_automata::simulation::{simulate, EventSchedule, SimulationConfig};
///
/// let mut a = Automaton::new();
/// a.define_variables(["x"]).unwrap();
/// a.add_state("Q1");
/// a.set_initial_state("Q1", vec![1.0]).unwrap();
/// a.set_flow("Q1", Flow::new("grow", |_x: &[f64], _t: f64| vec![2.0])).unwrap();
///
/// let trace = simulate(&mut a, &SimulationConfig::new(0.5, 1.0), &EventSchedule::new()).unwrap();
///
/// assert_eq!(trace.len(), 3);
/// assert_eq!(trace.first().unwrap().continuous, vec![1.0]);
/// assert_eq!(trace.last().unwrap().continuous, vec![3.0]);
/// ```
pub fn simulate(
    automaton: &mut Automaton,
    config: &SimulationConfig,
    schedule: &EventSchedule,
) -> Result<Trace, SimulationError> {
    info!(
        step = config.step,
        horizon = config.horizon,
        scheduled_events = schedule.len(),
        "Starting simulation"
    );
    let trace = Simulator::new(automaton, *config, schedule)?.run()?;
    info!(
        samples = trace.len(),
        switches = trace.switch_times().len(),
        "Simulation complete"
    );
    Ok(trace)
}
