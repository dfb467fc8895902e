//! Guard predicates for controlling discrete transitions.
//!
//! Guards are pure boolean functions over the continuous vector. They are
//! evaluated on the post-integration vector of every tick and enable the
//! transition they are attached to.

use std::fmt;
use std::sync::Arc;

type Predicate = Arc<dyn Fn(&[f64]) -> bool + Send + Sync>;

/// Named pure predicate that determines if a transition is enabled.
///
/// The name is the stable key under which the guard is exported; the
/// optional display expression is used by renderers instead of the name.
///
/// # Example
///
/// ```rust
/// use hybrid_automata::core::Guard;
///
/// let cold = Guard::new("guard_Q1_Q2", |x: &[f64]| x[0] <= 70.0).with_display("x <= 70");
///
/// assert!(cold.check(&[69.5]));
/// assert!(!cold.check(&[71.0]));
/// assert_eq!(cold.name(), "guard_Q1_Q2");
/// assert_eq!(cold.label(), "x <= 70");
/// ```
#[derive(Clone)]
pub struct Guard {
    name: String,
    display: Option<String>,
    predicate: Predicate,
}

impl Guard {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be pure (deterministic, no side effects) and
    /// thread-safe (Send + Sync).
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&[f64]) -> bool + Send + Sync + 'static,
    {
        Guard {
            name: name.into(),
            display: None,
            predicate: Arc::new(predicate),
        }
    }

    /// Attach a human-readable expression used for labeling.
    pub fn with_display(mut self, expression: impl Into<String>) -> Self {
        self.display = Some(expression.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }

    /// Display expression if one was attached, otherwise the name.
    pub fn label(&self) -> &str {
        self.display.as_deref().unwrap_or(&self.name)
    }

    /// Check if the guard holds for this continuous vector.
    pub fn check(&self, x: &[f64]) -> bool {
        (self.predicate)(x)
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard")
            .field("name", &self.name)
            .field("display", &self.display)
            .finish_non_exhaustive()
    }
}
