//! Simulation trace recording.
//!
//! A trace is the time-ordered record of `(time, discrete state, continuous
//! vector)` samples produced by the engine. It is append-only and is the
//! only artifact handed to plotting collaborators.

use super::state::StateId;
use serde::{Deserialize, Serialize};

/// One sample of hybrid time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Simulation time of the sample
    pub time: f64,
    /// Discrete state resident at `time`
    pub state: StateId,
    /// Copy of the continuous vector at `time`
    pub continuous: Vec<f64>,
}

/// Ordered record of simulation samples.
///
/// # Example
///
/// ```rust
/// use hybrid_automata::core::{Sample, StateId, Trace};
///
/// let mut trace = Trace::new();
/// trace.push(Sample { time: 0.0, state: StateId::from("Q1"), continuous: vec![72.0] });
/// trace.push(Sample { time: 0.01, state: StateId::from("Q1"), continuous: vec![71.78] });
/// trace.push(Sample { time: 0.02, state: StateId::from("Q2"), continuous: vec![69.9] });
///
/// assert_eq!(trace.len(), 3);
/// assert_eq!(trace.state_path(), vec![&StateId::from("Q1"), &StateId::from("Q2")]);
/// assert_eq!(trace.switch_times(), vec![0.02]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    samples: Vec<Sample>,
}

impl Trace {
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Create an empty trace with room for `capacity` samples.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    /// Append a sample.
    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Sequence of discrete states visited, with consecutive repeats collapsed.
    pub fn state_path(&self) -> Vec<&StateId> {
        let mut path: Vec<&StateId> = Vec::new();
        for sample in &self.samples {
            if path.last() != Some(&&sample.state) {
                path.push(&sample.state);
            }
        }
        path
    }

    /// Times of the samples at which the discrete state differs from the
    /// previous sample.
    pub fn switch_times(&self) -> Vec<f64> {
        self.samples
            .windows(2)
            .filter(|pair| pair[0].state != pair[1].state)
            .map(|pair| pair[1].time)
            .collect()
    }
}

impl IntoIterator for Trace {
    type Item = Sample;
    type IntoIter = std::vec::IntoIter<Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.into_iter()
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

impl FromIterator<Sample> for Trace {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}
