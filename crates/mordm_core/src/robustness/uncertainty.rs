//! Sampling around candidate solutions and scoring them.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{RobustnessMethod, RobustnessOptions, robustness};
use crate::error::{MordmError, Result};
use crate::evaluate::evaluate;
use crate::model::Matrix;
use crate::problem::Problem;

/// Perturbation applied to each variable, relative to its bound range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Uncertainty {
    /// Gaussian noise with standard deviation `relative_sd * range`
    Normal { relative_sd: f64 },
    /// Uniform noise within `± relative_radius * range`
    Uniform { relative_radius: f64 },
}

impl Default for Uncertainty {
    fn default() -> Self {
        Uncertainty::Normal { relative_sd: 0.05 }
    }
}

/// Draw `n_samples` points around `center`, clamped to the problem bounds
pub fn perturb<R: Rng>(
    problem: &Problem,
    center: &[f64],
    n_samples: usize,
    uncertainty: Uncertainty,
    rng: &mut R,
) -> Result<Matrix> {
    if center.len() != problem.n_vars() {
        return Err(MordmError::DimensionMismatch {
            context: "candidate",
            expected: problem.n_vars(),
            actual: center.len(),
        });
    }

    let scale = match uncertainty {
        Uncertainty::Normal { relative_sd: s } | Uncertainty::Uniform { relative_radius: s } => s,
    };
    if !(scale.is_finite() && scale >= 0.0) {
        return Err(MordmError::UnsupportedInput(format!(
            "perturbation scale must be a non-negative number, got {scale}"
        )));
    }

    let mut design = Matrix::zeros(n_samples, center.len());
    for i in 0..n_samples {
        for (j, v) in design.row_mut(i).iter_mut().enumerate() {
            let (lower, upper) = problem.bounds(j);
            let width = scale * (upper - lower);
            let noise = match uncertainty {
                Uncertainty::Normal { .. } => Normal::new(0.0, width)
                    .map_err(|e| MordmError::UnsupportedInput(e.to_string()))?
                    .sample(rng),
                Uncertainty::Uniform { .. } => (2.0 * rng.random::<f64>() - 1.0) * width,
            };
            *v = (center[j] + noise).clamp(lower, upper);
        }
    }
    Ok(design)
}

/// Score every candidate row under `uncertainty`.
///
/// Each candidate gets `n_samples` perturbed evaluations and is scored with
/// itself as the info-gap reference point. Candidate `i` draws from a stream
/// seeded with `seed + i`, so results do not depend on scheduling.
pub fn check_robustness(
    problem: &Problem,
    candidates: &Matrix,
    n_samples: usize,
    uncertainty: Uncertainty,
    method: &RobustnessMethod,
    options: &RobustnessOptions,
) -> Result<Vec<f64>> {
    if candidates.cols() != problem.n_vars() {
        return Err(MordmError::DimensionMismatch {
            context: "candidate columns",
            expected: problem.n_vars(),
            actual: candidates.cols(),
        });
    }
    let seed = options.seed.unwrap_or_else(rand::random);
    tracing::info!(
        candidates = candidates.rows(),
        n_samples,
        method = %method,
        "checking robustness"
    );

    let score = |i: usize| -> Result<f64> {
        let center = candidates.row(i);
        let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(i as u64));
        let design = perturb(problem, center, n_samples, uncertainty, &mut rng)?;
        let samples = evaluate(&design, problem)?;
        let mut local = options.clone();
        local.original_point = Some(center.to_vec());
        robustness(&samples, problem, method, &local)
    };

    #[cfg(feature = "parallel")]
    let scores: Vec<f64> = (0..candidates.rows())
        .into_par_iter()
        .map(score)
        .collect::<Result<_>>()?;
    #[cfg(not(feature = "parallel"))]
    let scores: Vec<f64> = (0..candidates.rows()).map(score).collect::<Result<_>>()?;

    Ok(scores)
}
