//! Timed external event injection.

use serde::{Deserialize, Serialize};

/// Set `event` to `active` once simulation time reaches `time`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub time: f64,
    pub event: String,
    pub active: bool,
}

/// List of timed event toggles, accepted in any order.
///
/// The engine stable-sorts entries by time before use, so entries with equal
/// times are applied in insertion order.
///
/// # Example
///
/// ```rust
/// use hybrid_automata::simulation::EventSchedule;
///
/// let schedule = EventSchedule::new()
///     .at(2.0, "beta", true)
///     .at(1.0, "alpha", true)
///     .at(1.01, "alpha", false);
///
/// let times: Vec<f64> = schedule.sorted().iter().map(|e| e.time).collect();
/// assert_eq!(times, vec![1.0, 1.01, 2.0]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventSchedule {
    entries: Vec<ScheduledEvent>,
}

impl EventSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, builder style.
    pub fn at(mut self, time: f64, event: impl Into<String>, active: bool) -> Self {
        self.push(time, event, active);
        self
    }

    /// Activate `event` at `start` and deactivate it at `start + width`.
    pub fn pulse(self, start: f64, width: f64, event: impl Into<String>) -> Self {
        let event = event.into();
        self.at(start, event.clone(), true).at(start + width, event, false)
    }

    pub fn push(&mut self, time: f64, event: impl Into<String>, active: bool) {
        self.entries.push(ScheduledEvent {
            time,
            event: event.into(),
            active,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[ScheduledEvent] {
        &self.entries
    }

    /// Entries stable-sorted ascending by time.
    pub fn sorted(&self) -> Vec<ScheduledEvent> {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| a.time.total_cmp(&b.time));
        entries
    }
}

impl<S: Into<String>> FromIterator<(f64, S, bool)> for EventSchedule {
    fn from_iter<I: IntoIterator<Item = (f64, S, bool)>>(iter: I) -> Self {
        let mut schedule = Self::new();
        for (time, event, active) in iter {
            schedule.push(time, event, active);
        }
        schedule
    }
}
