//! Simulation run configuration.

use crate::simulation::error::SimulationError;
use serde::{Deserialize, Serialize};

/// Upper bound on the number of samples preallocated for a trace.
const MAX_PREALLOCATED_SAMPLES: usize = 1 << 20;

/// Fixed-step run parameters.
///
/// Missing fields fall back to the defaults (`step = 0.01`,
/// `horizon = 10.0`) when deserialized.
///
/// # Example
///
/// ```rust
/// use hybrid_automata::simulation::SimulationConfig;
///
/// let config: SimulationConfig = serde_json::from_str(r#"{ "horizon": 5.0 }"#).unwrap();
/// assert_eq!(config.step, 0.01);
/// assert_eq!(config.horizon, 5.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Size of one tick
    pub step: f64,
    /// Time at which the run stops
    pub horizon: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            step: 0.01,
            horizon: 10.0,
        }
    }
}

impl SimulationConfig {
    pub fn new(step: f64, horizon: f64) -> Self {
        Self { step, horizon }
    }

    /// Check `step > 0` and `horizon >= 0`, both finite.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(SimulationError::InvalidConfig {
                reason: format!("step must be finite and > 0, got {}", self.step),
            });
        }
        if !self.horizon.is_finite() || self.horizon < 0.0 {
            return Err(SimulationError::InvalidConfig {
                reason: format!("horizon must be finite and >= 0, got {}", self.horizon),
            });
        }
        Ok(())
    }

    /// Expected trace length, capped for preallocation.
    pub fn expected_samples(&self) -> usize {
        let ticks = (self.horizon / self.step).ceil();
        if ticks.is_finite() && ticks >= 0.0 {
            (ticks as usize)
                .saturating_add(2)
                .min(MAX_PREALLOCATED_SAMPLES)
        } else {
            1
        }
    }
}
