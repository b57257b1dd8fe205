//! Fluent construction and validation of [`Problem`]s.

use std::collections::BTreeSet;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use super::{CommandSpec, DEFAULT_EPSILON, EvaluationTarget, Problem, numbered_names};
use crate::error::ProblemError;

/// Builder for [`Problem`]
#[derive(Debug, Clone)]
pub struct ProblemBuilder {
    n_vars: usize,
    n_objs: usize,
    n_constrs: usize,
    bounds: Option<Vec<(f64, f64)>>,
    names: Option<Vec<String>>,
    epsilons: Option<Vec<f64>>,
    maximize: BTreeSet<usize>,
    target: Option<EvaluationTarget>,
}

impl ProblemBuilder {
    /// Start a problem with `n_vars` variables and `n_objs` objectives.
    ///
    /// Bounds default to `[0, 1]` per variable, names to `x1.., f1.., c1..`
    /// and epsilons to [`DEFAULT_EPSILON`].
    #[must_use]
    pub fn new(n_vars: usize, n_objs: usize) -> Self {
        Self {
            n_vars,
            n_objs,
            n_constrs: 0,
            bounds: None,
            names: None,
            epsilons: None,
            maximize: BTreeSet::new(),
            target: None,
        }
    }

    #[must_use]
    pub fn constraints(mut self, n_constrs: usize) -> Self {
        self.n_constrs = n_constrs;
        self
    }

    /// `(lower, upper)` per variable
    #[must_use]
    pub fn bounds(mut self, bounds: Vec<(f64, f64)>) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Names for variables, objectives and constraints, in that order
    #[must_use]
    pub fn names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn epsilons(mut self, epsilons: Vec<f64>) -> Self {
        self.epsilons = Some(epsilons);
        self
    }

    /// Mark an objective (0-based) as maximized
    #[must_use]
    pub fn maximize(mut self, objective: usize) -> Self {
        self.maximize.insert(objective);
        self
    }

    #[must_use]
    pub fn maximize_all(mut self, objectives: impl IntoIterator<Item = usize>) -> Self {
        self.maximize.extend(objectives);
        self
    }

    /// Evaluate in-process with a function returning objectives then constraints
    #[must_use]
    pub fn function<F>(mut self, f: F) -> Self
    where
        F: Fn(&[f64]) -> Vec<f64> + Send + Sync + 'static,
    {
        self.target = Some(EvaluationTarget::InProcess(Arc::new(f)));
        self
    }

    /// Evaluate through an external program
    #[must_use]
    pub fn command(mut self, command: CommandSpec) -> Self {
        self.target = Some(EvaluationTarget::External(command));
        self
    }

    #[must_use]
    pub fn target(mut self, target: EvaluationTarget) -> Self {
        self.target = Some(target);
        self
    }

    pub fn build(self) -> Result<Problem, ProblemError> {
        if self.n_vars == 0 {
            return Err(ProblemError::NoVariables);
        }
        if self.n_objs == 0 {
            return Err(ProblemError::NoObjectives);
        }
        let target = self.target.ok_or(ProblemError::MissingTarget)?;

        let bounds = self.bounds.unwrap_or_else(|| vec![(0.0, 1.0); self.n_vars]);
        if bounds.len() != self.n_vars {
            return Err(ProblemError::BoundsLength {
                expected: self.n_vars,
                actual: bounds.len(),
            });
        }
        for (index, &(lower, upper)) in bounds.iter().enumerate() {
            // NaN bounds fail here too
            if !(lower <= upper) {
                return Err(ProblemError::InvertedBounds {
                    index,
                    lower,
                    upper,
                });
            }
        }

        let n_names = self.n_vars + self.n_objs + self.n_constrs;
        let names = self.names.unwrap_or_else(|| {
            let mut names = numbered_names("x", self.n_vars);
            names.extend(numbered_names("f", self.n_objs));
            names.extend(numbered_names("c", self.n_constrs));
            names
        });
        if names.len() != n_names {
            return Err(ProblemError::NamesLength {
                expected: n_names,
                actual: names.len(),
            });
        }
        let mut seen = FxHashSet::default();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(ProblemError::DuplicateName(name.clone()));
            }
        }

        let epsilons = self
            .epsilons
            .unwrap_or_else(|| vec![DEFAULT_EPSILON; self.n_objs]);
        if epsilons.len() != self.n_objs {
            return Err(ProblemError::EpsilonsLength {
                expected: self.n_objs,
                actual: epsilons.len(),
            });
        }
        if let Some((index, &value)) = epsilons.iter().enumerate().find(|(_, e)| !(**e > 0.0)) {
            return Err(ProblemError::NonPositiveEpsilon { index, value });
        }

        if let Some(&index) = self.maximize.iter().find(|&&i| i >= self.n_objs) {
            return Err(ProblemError::MaximizeOutOfRange {
                index,
                n_objs: self.n_objs,
            });
        }

        let (lower, upper) = bounds.into_iter().unzip();
        Ok(Problem {
            target,
            n_vars: self.n_vars,
            n_objs: self.n_objs,
            n_constrs: self.n_constrs,
            lower,
            upper,
            names,
            epsilons,
            maximize: self.maximize,
        })
    }
}
