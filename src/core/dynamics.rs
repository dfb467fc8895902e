//! Continuous dynamics attached to discrete states and transitions.
//!
//! - [`Flow`]: time derivative of the continuous vector inside a state
//! - [`Invariant`]: advisory predicate describing where a state is valid
//! - [`Jump`]: reset map applied when a transition fires
//!
//! Each is a named capability object. The engine only calls `evaluate`,
//! `holds` and `apply`; names and display expressions exist for export and
//! rendering.

use std::fmt;
use std::sync::Arc;

type Derivative = Arc<dyn Fn(&[f64], f64) -> Vec<f64> + Send + Sync>;
type Predicate = Arc<dyn Fn(&[f64]) -> bool + Send + Sync>;
type Reset = Arc<dyn Fn(&[f64]) -> Vec<f64> + Send + Sync>;

/// Differential law `dx/dt = f(x, t)` of a discrete state.
///
/// # Example
///
/// ```rust
/// use hybrid_automata::core::Flow;
///
/// let cooling = Flow::new("flow_Q1", |x: &[f64], _t: f64| vec![-x[0] + 50.0])
///     .with_display(["-x + 50"]);
///
/// assert_eq!(cooling.evaluate(&[72.0], 0.0), vec![-22.0]);
/// assert_eq!(cooling.label_lines(&["x".to_string()]), vec!["x' = -x + 50"]);
/// ```
#[derive(Clone)]
pub struct Flow {
    name: String,
    display: Option<Vec<String>>,
    derivative: Derivative,
}

impl Flow {
    pub fn new<F>(name: impl Into<String>, derivative: F) -> Self
    where
        F: Fn(&[f64], f64) -> Vec<f64> + Send + Sync + 'static,
    {
        Flow {
            name: name.into(),
            display: None,
            derivative: Arc::new(derivative),
        }
    }

    /// Attach one display expression per continuous variable.
    pub fn with_display<I, S>(mut self, expressions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.display = Some(expressions.into_iter().map(Into::into).collect());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display(&self) -> Option<&[String]> {
        self.display.as_deref()
    }

    /// Evaluate the time derivative at `(x, t)`.
    pub fn evaluate(&self, x: &[f64], t: f64) -> Vec<f64> {
        (self.derivative)(x, t)
    }

    /// Render one `var' = expr` line per variable.
    ///
    /// Uses the display expressions when they cover every variable. Otherwise
    /// the flow is sampled numerically at `x = 0, t = 0`; a sample of the
    /// wrong dimension yields `?` placeholders.
    pub fn label_lines(&self, variables: &[String]) -> Vec<String> {
        if let Some(exprs) = self.display.as_ref().filter(|e| e.len() == variables.len()) {
            return variables
                .iter()
                .zip(exprs)
                .map(|(var, expr)| format!("{var}' = {expr}"))
                .collect();
        }

        let origin = vec![0.0; variables.len()];
        let sample = self.evaluate(&origin, 0.0);
        if sample.len() == variables.len() {
            variables
                .iter()
                .zip(sample)
                .map(|(var, value)| format!("{var}' = {value}"))
                .collect()
        } else {
            variables.iter().map(|var| format!("{var}' = ?")).collect()
        }
    }
}

impl fmt::Debug for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flow")
            .field("name", &self.name)
            .field("display", &self.display)
            .finish_non_exhaustive()
    }
}

/// Predicate describing the region in which a state may be resident.
///
/// Invariants are recorded for export and can be queried, but the
/// simulation loop never evaluates them.
#[derive(Clone)]
pub struct Invariant {
    name: String,
    display: Option<String>,
    predicate: Predicate,
}

impl Invariant {
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&[f64]) -> bool + Send + Sync + 'static,
    {
        Invariant {
            name: name.into(),
            display: None,
            predicate: Arc::new(predicate),
        }
    }

    /// Invariant that holds everywhere.
    pub fn always(name: impl Into<String>) -> Self {
        Self::new(name, |_: &[f64]| true)
    }

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

    pub fn holds(&self, x: &[f64]) -> bool {
        (self.predicate)(x)
    }
}

impl fmt::Debug for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invariant")
            .field("name", &self.name)
            .field("display", &self.display)
            .finish_non_exhaustive()
    }
}

/// Reset map applied to the continuous vector when a transition fires.
///
/// # Example
///
/// ```rust
/// use hybrid_automata::core::Jump;
///
/// let reset_all = Jump::new("reset_all", |x: &[f64]| vec![0.0; x.len()]);
/// assert_eq!(reset_all.apply(&[4.5, 1.8]), vec![0.0, 0.0]);
///
/// let keep = Jump::identity("reset_none");
/// assert_eq!(keep.apply(&[4.5, 1.8]), vec![4.5, 1.8]);
/// ```
#[derive(Clone)]
pub struct Jump {
    name: String,
    display: Option<String>,
    reset: Reset,
}

impl Jump {
    pub fn new<F>(name: impl Into<String>, reset: F) -> Self
    where
        F: Fn(&[f64]) -> Vec<f64> + Send + Sync + 'static,
    {
        Jump {
            name: name.into(),
            display: None,
            reset: Arc::new(reset),
        }
    }

    /// Named reset that leaves the vector unchanged.
    pub fn identity(name: impl Into<String>) -> Self {
        Self::new(name, |x: &[f64]| x.to_vec())
    }

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

    pub fn apply(&self, x: &[f64]) -> Vec<f64> {
        (self.reset)(x)
    }
}

impl fmt::Debug for Jump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Jump")
            .field("name", &self.name)
            .field("display", &self.display)
            .finish_non_exhaustive()
    }
}
