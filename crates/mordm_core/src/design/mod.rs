//! Design generation.
//!
//! Unit-cube designs are produced first (every cell in `[0, 1)`) and then
//! scaled into the problem bounds with [`scale`]. Two schemes are supported:
//! independent uniform draws and Latin hypercube sampling, where each of the
//! `n` equal-width strata of every dimension is hit exactly once.

use std::fmt;
use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{MordmError, Result};
use crate::evaluate::evaluate;
use crate::model::{Matrix, SampleSet};
use crate::problem::Problem;

/// How unit-cube points are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingScheme {
    Uniform,
    #[default]
    LatinHypercube,
}

impl SamplingScheme {
    pub const ALL: [&'static str; 2] = ["uniform", "lhs"];
}

impl fmt::Display for SamplingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplingScheme::Uniform => f.write_str("uniform"),
            SamplingScheme::LatinHypercube => f.write_str("lhs"),
        }
    }
}

impl FromStr for SamplingScheme {
    type Err = MordmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "uniform" => Ok(SamplingScheme::Uniform),
            "lhs" | "latin" | "latin_hypercube" => Ok(SamplingScheme::LatinHypercube),
            _ => Err(MordmError::UnknownMethod {
                name: s.to_string(),
                available: Self::ALL.to_vec(),
            }),
        }
    }
}

/// Seeded RNG; a missing seed is drawn from the thread RNG
pub fn rng_from_seed(seed: Option<u64>) -> SmallRng {
    SmallRng::seed_from_u64(seed.unwrap_or_else(rand::random))
}

/// `n_samples x n_vars` design in `[0, 1)`
pub fn unit_design<R: Rng>(
    n_samples: usize,
    n_vars: usize,
    scheme: SamplingScheme,
    rng: &mut R,
) -> Matrix {
    match scheme {
        SamplingScheme::Uniform => uniform_design(n_samples, n_vars, rng),
        SamplingScheme::LatinHypercube => latin_hypercube(n_samples, n_vars, rng),
    }
}

/// Two independent designs of the same shape
pub fn unit_design_pair<R: Rng>(
    n_samples: usize,
    n_vars: usize,
    scheme: SamplingScheme,
    rng: &mut R,
) -> (Matrix, Matrix) {
    let first = unit_design(n_samples, n_vars, scheme, rng);
    let second = unit_design(n_samples, n_vars, scheme, rng);
    (first, second)
}

fn uniform_design<R: Rng>(n_samples: usize, n_vars: usize, rng: &mut R) -> Matrix {
    let data = (0..n_samples * n_vars).map(|_| rng.random::<f64>()).collect();
    Matrix::from_data(n_samples, n_vars, data).unwrap_or_else(|| Matrix::zeros(0, n_vars))
}

fn latin_hypercube<R: Rng>(n_samples: usize, n_vars: usize, rng: &mut R) -> Matrix {
    let mut design = Matrix::zeros(n_samples, n_vars);
    let mut strata: Vec<usize> = (0..n_samples).collect();
    let width = 1.0 / n_samples as f64;

    for j in 0..n_vars {
        strata.shuffle(rng);
        for (i, &stratum) in strata.iter().enumerate() {
            let value = (stratum as f64 + rng.random::<f64>()) * width;
            // Rounding can land exactly on the upper stratum edge
            let upper = (stratum + 1) as f64 * width;
            let value = if value >= upper {
                upper - f64::EPSILON
            } else {
                value
            };
            design.set(i, j, value);
        }
    }
    design
}

/// Scale a unit-cube design into the problem bounds:
/// `lower[j] + unit[i, j] * (upper[j] - lower[j])`
pub fn scale(unit: &Matrix, problem: &Problem) -> Result<Matrix> {
    if unit.cols() != problem.n_vars() {
        return Err(MordmError::DimensionMismatch {
            context: "design columns",
            expected: problem.n_vars(),
            actual: unit.cols(),
        });
    }
    let mut scaled = unit.clone();
    for i in 0..scaled.rows() {
        for (j, v) in scaled.row_mut(i).iter_mut().enumerate() {
            let (lower, upper) = problem.bounds(j);
            *v = *v * (upper - lower) + lower;
        }
    }
    Ok(scaled)
}

/// Unit design drawn with `scheme` and scaled into the problem bounds
pub fn scaled_design(
    problem: &Problem,
    n_samples: usize,
    scheme: SamplingScheme,
    seed: Option<u64>,
) -> Result<Matrix> {
    let mut rng = rng_from_seed(seed);
    let unit = unit_design(n_samples, problem.n_vars(), scheme, &mut rng);
    scale(&unit, problem)
}

/// Draw a Latin hypercube over the bounds and evaluate it
pub fn sample_lhs(problem: &Problem, n_samples: usize, seed: Option<u64>) -> Result<SampleSet> {
    let design = scaled_design(problem, n_samples, SamplingScheme::LatinHypercube, seed)?;
    evaluate(&design, problem)
}

/// Draw uniformly over the bounds and evaluate
pub fn sample_uniform(problem: &Problem, n_samples: usize, seed: Option<u64>) -> Result<SampleSet> {
    let design = scaled_design(problem, n_samples, SamplingScheme::Uniform, seed)?;
    evaluate(&design, problem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::ProblemBuilder;

    #[test]
    fn test_lhs_hits_every_stratum_once() {
        let mut rng = SmallRng::seed_from_u64(11);
        for &(n, d) in &[(1, 3), (7, 2), (50, 5), (128, 1)] {
            let design = unit_design(n, d, SamplingScheme::LatinHypercube, &mut rng);
            assert_eq!(design.shape(), (n, d));
            let width = 1.0 / n as f64;
            for j in 0..d {
                let mut hits = vec![0usize; n];
                for v in design.column(j) {
                    let k = (0..n)
                        .find(|&k| v >= k as f64 * width && v < (k + 1) as f64 * width)
                        .unwrap();
                    hits[k] += 1;
                }
                assert!(hits.iter().all(|&h| h == 1), "dimension {j}: {hits:?}");
            }
        }
    }

    #[test]
    fn test_uniform_in_unit_cube() {
        let mut rng = SmallRng::seed_from_u64(5);
        let design = unit_design(100, 4, SamplingScheme::Uniform, &mut rng);
        assert_eq!(design.shape(), (100, 4));
        assert!(design.data().iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn test_pair_is_independent() {
        let mut rng = SmallRng::seed_from_u64(9);
        let (a, b) = unit_design_pair(20, 3, SamplingScheme::LatinHypercube, &mut rng);
        assert_eq!(a.shape(), b.shape());
        assert_ne!(a, b);
    }

    #[test]
    fn test_scale_into_bounds() {
        let problem = ProblemBuilder::new(2, 1)
            .bounds(vec![(-1.0, 1.0), (10.0, 20.0)])
            .function(|x: &[f64]| vec![x[0]])
            .build()
            .unwrap();
        let unit = Matrix::from_rows(&[vec![0.0, 0.0], vec![0.5, 0.25]]).unwrap();
        let scaled = scale(&unit, &problem).unwrap();
        assert_eq!(scaled.to_rows(), vec![vec![-1.0, 10.0], vec![0.0, 12.5]]);

        assert!(scale(&Matrix::zeros(1, 3), &problem).is_err());
    }

    #[test]
    fn test_sample_lhs_is_seeded() {
        let problem = ProblemBuilder::new(3, 1)
            .function(|x: &[f64]| vec![x.iter().sum()])
            .build()
            .unwrap();
        let a = sample_lhs(&problem, 10, Some(42)).unwrap();
        let b = sample_lhs(&problem, 10, Some(42)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 10);
        let u = sample_uniform(&problem, 4, Some(1)).unwrap();
        assert_eq!(u.len(), 4);
    }

    #[test]
    fn test_scheme_parsing() {
        assert_eq!(
            "LHS".parse::<SamplingScheme>().unwrap(),
            SamplingScheme::LatinHypercube
        );
        assert_eq!(
            "uniform".parse::<SamplingScheme>().unwrap(),
            SamplingScheme::Uniform
        );
        assert!(matches!(
            "sobol".parse::<SamplingScheme>(),
            Err(MordmError::UnknownMethod { .. })
        ));
    }
}
