//! Optimizer boundary
//!
//! An [`Optimizer`] turns a [`Problem`] and an evaluation budget into an
//! approximate Pareto set, returned as a [`SampleSet`] in the same
//! row/column convention as [`evaluate`](crate::evaluate::evaluate).
//!
//! Two implementations ship with the crate:
//! - [`ExternalOptimizer`] delegates the search to an external executable that
//!   drives the problem's external model command
//! - [`EpsilonArchiveSearch`] is a simple in-process search that keeps an
//!   epsilon-box non-dominated archive
//!
//! # Example
//!
//! ```ignore
//! use mordm_core::optimization::{EpsilonArchiveSearch, OptimizerSettings};
//!
//! let settings = OptimizerSettings { max_evaluations: 5_000, ..Default::default() };
//! let pareto = problem.optimize(&EpsilonArchiveSearch::default(), &settings)?;
//! println!("{} non-dominated solutions", pareto.len());
//! ```

mod epsilon_archive;
mod external;

pub use epsilon_archive::{EpsilonArchive, EpsilonArchiveSearch};
pub use external::{ExternalOptimizer, parse_result_file};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::SampleSet;
use crate::problem::Problem;

/// Run budget shared by all optimizers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerSettings {
    /// Maximum number of model evaluations
    #[serde(default = "default_max_evaluations")]
    pub max_evaluations: usize,

    /// Evaluations between progress snapshots, when the optimizer supports them
    #[serde(default)]
    pub frequency: Option<usize>,

    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_max_evaluations() -> usize {
    10_000
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            max_evaluations: default_max_evaluations(),
            frequency: None,
            seed: None,
        }
    }
}

/// A multi-objective search over a problem's decision space
pub trait Optimizer {
    fn optimize(&self, problem: &Problem, settings: &OptimizerSettings) -> Result<SampleSet>;
}

impl Problem {
    /// Run `optimizer` against this problem
    pub fn optimize<O: Optimizer + ?Sized>(
        &self,
        optimizer: &O,
        settings: &OptimizerSettings,
    ) -> Result<SampleSet> {
        tracing::info!(
            max_evaluations = settings.max_evaluations,
            n_vars = self.n_vars(),
            n_objs = self.n_objs(),
            "starting optimization"
        );
        let result = optimizer.optimize(self, settings)?;
        tracing::info!(solutions = result.len(), "optimization finished");
        Ok(result)
    }
}
