//! Sensitivity analysis
//!
//! [`compute_sensitivity`] runs one method from the static [`registry`]
//! end to end: it sizes and builds the method's unit-cube design, scales and
//! evaluates it, extracts the selected response, runs the method's estimator
//! and normalizes the estimator output into a [`StandardResult`].
//!
//! # Example
//!
//! ```ignore
//! use mordm_core::problem::ProblemBuilder;
//! use mordm_core::sensitivity::{compute_sensitivity, SensitivityOptions, SensitivityOutput};
//!
//! let problem = ProblemBuilder::new(2, 1)
//!     .function(|x: &[f64]| vec![x[0] + x[1]])
//!     .build()?;
//!
//! let output = compute_sensitivity(&problem, "f1", 100, "regression", &SensitivityOptions::default())?;
//! if let SensitivityOutput::Standard(result) = output {
//!     println!("{:?}", result.ranked_first_order());
//! }
//! ```

mod designs;
pub mod estimators;
pub mod registry;
mod result;
mod selector;

pub use designs::DesignPlan;
pub use registry::{METHODS, MethodFamily, MethodSpec, NormalizedIndices, lookup, method_ids};
pub use result::{IndexSummary, NativeOutput, StandardResult, rank_descending};
pub use selector::{ObjectiveSelector, ResponseFn};

use serde::{Deserialize, Serialize};

use crate::design::{SamplingScheme, rng_from_seed, scale};
use crate::error::{MordmError, Result};
use crate::evaluate::evaluate;
use crate::model::Matrix;
use crate::problem::Problem;
use crate::stats::bootstrap;

/// Elementary effects design settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MorrisOptions {
    /// Number of grid levels per variable
    #[serde(default = "default_morris_levels")]
    pub levels: usize,
    /// Step size in grid levels
    #[serde(default = "default_grid_jump")]
    pub grid_jump: usize,
}

fn default_morris_levels() -> usize {
    4
}

fn default_grid_jump() -> usize {
    2
}

impl Default for MorrisOptions {
    fn default() -> Self {
        Self {
            levels: default_morris_levels(),
            grid_jump: default_grid_jump(),
        }
    }
}

/// Caller overrides for a sensitivity run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityOptions {
    /// RNG seed; a random seed is drawn when absent
    #[serde(default)]
    pub seed: Option<u64>,

    /// Return the estimator output untouched instead of a [`StandardResult`]
    #[serde(default)]
    pub raw: bool,

    /// Bootstrap resamples for methods that support confidence intervals
    #[serde(default)]
    pub nboot: usize,

    /// Confidence level for intervals
    #[serde(default = "default_conf")]
    pub conf: f64,

    /// Use rank-transformed data for regression methods (SRRC, PRCC)
    #[serde(default)]
    pub rank: bool,

    #[serde(default)]
    pub morris: MorrisOptions,

    /// FAST interference factor
    #[serde(default = "default_interference")]
    pub interference: usize,

    /// Scheme for the random base designs of the variance and regression methods
    #[serde(default)]
    pub scheme: SamplingScheme,
}

fn default_conf() -> f64 {
    0.95
}

fn default_interference() -> usize {
    4
}

impl Default for SensitivityOptions {
    fn default() -> Self {
        Self {
            seed: None,
            raw: false,
            nboot: 0,
            conf: default_conf(),
            rank: false,
            morris: MorrisOptions::default(),
            interference: default_interference(),
            scheme: SamplingScheme::default(),
        }
    }
}

/// Result of [`compute_sensitivity`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "output", rename_all = "snake_case")]
pub enum SensitivityOutput {
    Standard(StandardResult),
    Raw(NativeOutput),
}

impl SensitivityOutput {
    pub fn standard(&self) -> Option<&StandardResult> {
        match self {
            SensitivityOutput::Standard(result) => Some(result),
            SensitivityOutput::Raw(_) => None,
        }
    }

    pub fn into_standard(self) -> Option<StandardResult> {
        match self {
            SensitivityOutput::Standard(result) => Some(result),
            SensitivityOutput::Raw(_) => None,
        }
    }
}

/// Run sensitivity method `method` on `problem` with roughly `n_samples`
/// model evaluations.
///
/// The actual evaluation count follows the method's level formula and is
/// reported in [`StandardResult::evaluations`].
pub fn compute_sensitivity(
    problem: &Problem,
    selector: impl Into<ObjectiveSelector>,
    n_samples: usize,
    method: &str,
    options: &SensitivityOptions,
) -> Result<SensitivityOutput> {
    let selector = selector.into();
    let spec = lookup(method)?;
    if !(options.conf > 0.0 && options.conf < 1.0) {
        return Err(MordmError::UnsupportedInput(format!(
            "confidence level must lie in (0, 1), got {}",
            options.conf
        )));
    }

    let n_vars = problem.n_vars();
    let levels = (spec.level_count)(n_samples, n_vars);
    if levels == 0 {
        return Err(MordmError::InvalidDesign {
            method: spec.id.to_string(),
            reason: format!("{n_samples} samples yield an empty design; increase the sample count"),
        });
    }

    let mut rng = rng_from_seed(options.seed);
    let plan = (spec.build_design)(levels, n_vars, options, &mut rng)?;
    validate_design(spec.id, &plan.unit)?;

    let evaluations = plan.unit.rows();
    tracing::info!(method = spec.id, levels, evaluations, "computing sensitivity");

    let scaled = scale(&plan.unit, problem)?;
    let samples = evaluate(&scaled, problem)?;
    let response = selector.resolve(&samples)?;

    let mut native = (spec.estimate)(&plan, &response, options, &mut rng)?;
    if let Some(statistic) = spec.resample
        && options.nboot > 0
    {
        let summary = bootstrap(plan.base_size, options.nboot, options.conf, &mut rng, |idx| {
            statistic(&plan, &response, idx, options)
        });
        if let NativeOutput::Regression { bootstrap, .. } = &mut native {
            *bootstrap = Some(summary);
        }
    }

    if options.raw {
        return Ok(SensitivityOutput::Raw(native));
    }

    tracing::debug!(method = spec.id, "normalizing estimator output");
    let indices = (spec.normalize)(&native)?;
    Ok(SensitivityOutput::Standard(StandardResult {
        method: spec.id.to_string(),
        variable_names: problem.variable_names().to_vec(),
        evaluations,
        first_order: indices.first_order,
        total_order: indices.total_order,
    }))
}

/// Reject designs holding non-finite cells
fn validate_design(method: &str, unit: &Matrix) -> Result<()> {
    if unit.is_finite() {
        Ok(())
    } else {
        Err(MordmError::InvalidDesign {
            method: method.to_string(),
            reason: "design contains non-numeric values; change the method or the sample count"
                .into(),
        })
    }
}
