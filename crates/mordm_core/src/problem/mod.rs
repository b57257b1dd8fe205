//! Problem definitions.
//!
//! A [`Problem`] describes the decision variables, objectives and constraints
//! of a simulation model along with how to evaluate it. Problems are built
//! through [`ProblemBuilder`] and are immutable afterwards.
//!
//! ```ignore
//! use mordm_core::problem::ProblemBuilder;
//!
//! let problem = ProblemBuilder::new(2, 2)
//!     .bounds(vec![(0.0, 1.0), (0.0, 5.0)])
//!     .maximize(1)
//!     .function(|x: &[f64]| vec![x[0] + x[1], x[0] * x[1]])
//!     .build()?;
//! ```

mod builder;

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use builder::ProblemBuilder;

/// In-process evaluation function.
///
/// Receives one row of decision variables and returns `n_objs + n_constrs`
/// values, objectives first.
pub type ProblemFunction = Arc<dyn Fn(&[f64]) -> Vec<f64> + Send + Sync>;

/// External program speaking the line-oriented evaluation protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Program followed by its arguments
    pub fn command_line(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

/// How a problem is evaluated
#[derive(Clone)]
pub enum EvaluationTarget {
    InProcess(ProblemFunction),
    External(CommandSpec),
}

impl fmt::Debug for EvaluationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationTarget::InProcess(_) => f.write_str("InProcess(<function>)"),
            EvaluationTarget::External(cmd) => f.debug_tuple("External").field(cmd).finish(),
        }
    }
}

/// Default precision threshold for each objective
pub const DEFAULT_EPSILON: f64 = 0.01;

/// Immutable description of a simulation/optimization problem
#[derive(Debug, Clone)]
pub struct Problem {
    target: EvaluationTarget,
    n_vars: usize,
    n_objs: usize,
    n_constrs: usize,
    lower: Vec<f64>,
    upper: Vec<f64>,
    names: Vec<String>,
    epsilons: Vec<f64>,
    maximize: BTreeSet<usize>,
}

impl Problem {
    pub fn target(&self) -> &EvaluationTarget {
        &self.target
    }

    pub fn n_vars(&self) -> usize {
        self.n_vars
    }

    pub fn n_objs(&self) -> usize {
        self.n_objs
    }

    pub fn n_constrs(&self) -> usize {
        self.n_constrs
    }

    /// Number of values each evaluation returns
    pub fn n_outputs(&self) -> usize {
        self.n_objs + self.n_constrs
    }

    pub fn lower_bounds(&self) -> &[f64] {
        &self.lower
    }

    pub fn upper_bounds(&self) -> &[f64] {
        &self.upper
    }

    /// `(lower, upper)` pair for variable `j`
    pub fn bounds(&self, j: usize) -> (f64, f64) {
        (self.lower[j], self.upper[j])
    }

    /// Width of the range of variable `j`
    pub fn range(&self, j: usize) -> f64 {
        self.upper[j] - self.lower[j]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn variable_names(&self) -> &[String] {
        &self.names[..self.n_vars]
    }

    pub fn objective_names(&self) -> &[String] {
        &self.names[self.n_vars..self.n_vars + self.n_objs]
    }

    pub fn constraint_names(&self) -> &[String] {
        &self.names[self.n_vars + self.n_objs..]
    }

    pub fn epsilons(&self) -> &[f64] {
        &self.epsilons
    }

    pub fn maximize(&self) -> &BTreeSet<usize> {
        &self.maximize
    }

    pub fn is_maximized(&self, objective: usize) -> bool {
        self.maximize.contains(&objective)
    }

    pub fn is_external(&self) -> bool {
        matches!(self.target, EvaluationTarget::External(_))
    }
}

/// Generate `prefix1..prefixN` names
pub(crate) fn numbered_names(prefix: &str, count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("{prefix}{i}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line() {
        let cmd = CommandSpec::new("python").arg("model.py").arg("--stdio");
        assert_eq!(cmd.command_line(), vec!["python", "model.py", "--stdio"]);
    }

    #[test]
    fn test_numbered_names() {
        assert_eq!(numbered_names("x", 3), vec!["x1", "x2", "x3"]);
        assert!(numbered_names("c", 0).is_empty());
    }

    #[test]
    fn test_name_slices() {
        let problem = ProblemBuilder::new(2, 1)
            .constraints(1)
            .function(|x: &[f64]| vec![x[0], 0.0])
            .build()
            .unwrap();
        assert_eq!(problem.variable_names(), &["x1", "x2"]);
        assert_eq!(problem.objective_names(), &["f1"]);
        assert_eq!(problem.constraint_names(), &["c1"]);
        assert_eq!(problem.n_outputs(), 2);
        assert!(!problem.is_external());
    }
}
