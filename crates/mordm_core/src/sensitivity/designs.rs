//! Unit-cube designs for each sensitivity method family.
//!
//! Every builder receives the level count produced by the method's level
//! formula and returns a [`DesignPlan`] whose rows are evaluated in order.
//! The block layout of the rows is what the matching estimator expects.

use std::f64::consts::PI;

use rand::Rng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::SensitivityOptions;
use super::estimators::fast::frequencies;
use crate::design::{SamplingScheme, unit_design, unit_design_pair};
use crate::error::{MordmError, Result};
use crate::model::Matrix;

/// A method's design together with the metadata its estimator needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignPlan {
    /// Full design in evaluation order
    pub unit: Matrix,
    /// Rows per block (levels, replicates or trajectories)
    pub base_size: usize,
    /// Column permutations linking the two replicates of a replicated
    /// Latin hypercube: replicate 2 row `k` holds replicate 1 row
    /// `permutations[j][k]` in column `j`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permutations: Option<Vec<Vec<usize>>>,
}

impl DesignPlan {
    fn new(unit: Matrix, base_size: usize) -> Self {
        Self {
            unit,
            base_size,
            permutations: None,
        }
    }

    /// Column count of the design
    pub fn n_vars(&self) -> usize {
        self.unit.cols()
    }
}

fn invalid(method: &str, reason: impl Into<String>) -> MordmError {
    MordmError::InvalidDesign {
        method: method.to_string(),
        reason: reason.into(),
    }
}

/// eFAST search curves: one block of `n` points per variable, the block's
/// variable driven at the maximum frequency
pub(crate) fn fast_design(
    n: usize,
    n_vars: usize,
    options: &SensitivityOptions,
    rng: &mut SmallRng,
) -> Result<DesignPlan> {
    let m = options.interference;
    let Some((omega_max, others)) = frequencies(n, n_vars, m) else {
        return Err(invalid(
            "fast99",
            format!("{n} points per curve must exceed 4 * interference^2 = {}", 4 * m * m),
        ));
    };

    let mut design = Matrix::with_cols(n_vars);
    let mut omega = vec![0usize; n_vars];
    let mut row = vec![0.0; n_vars];
    for i in 0..n_vars {
        let mut rest = others.iter();
        for (j, w) in omega.iter_mut().enumerate() {
            *w = if j == i {
                omega_max
            } else {
                rest.next().copied().unwrap_or(1)
            };
        }
        let phase: Vec<f64> = (0..n_vars).map(|_| 2.0 * PI * rng.random::<f64>()).collect();

        for k in 0..n {
            let s = 2.0 * PI * k as f64 / n as f64;
            for j in 0..n_vars {
                row[j] = 0.5 + (omega[j] as f64 * s + phase[j]).sin().asin() / PI;
            }
            design.push_row(&row);
        }
    }
    Ok(DesignPlan::new(design, n))
}

/// Base design followed by one block per variable resampled from a second
/// design except in that variable's column
pub(crate) fn sobol_design(
    n: usize,
    n_vars: usize,
    options: &SensitivityOptions,
    rng: &mut SmallRng,
) -> Result<DesignPlan> {
    let (x1, x2) = unit_design_pair(n, n_vars, options.scheme, rng);
    let mut design = x1.clone();
    for i in 0..n_vars {
        design = stack(&design, &swap_column(&x2, &x1, i))?;
    }
    Ok(DesignPlan::new(design, n))
}

/// `A`, `B` and one block per variable holding `A` with that variable's
/// column taken from `B`
pub(crate) fn saltelli_design(
    n: usize,
    n_vars: usize,
    options: &SensitivityOptions,
    rng: &mut SmallRng,
) -> Result<DesignPlan> {
    let (a, b) = unit_design_pair(n, n_vars, options.scheme, rng);
    let mut design = stack(&a, &b)?;
    for i in 0..n_vars {
        design = stack(&design, &swap_column(&a, &b, i))?;
    }
    Ok(DesignPlan::new(design, n))
}

/// Latin hypercube followed by a replicate whose columns are independent
/// permutations of the first
pub(crate) fn replicated_lhs_design(
    n: usize,
    n_vars: usize,
    _options: &SensitivityOptions,
    rng: &mut SmallRng,
) -> Result<DesignPlan> {
    let first = unit_design(n, n_vars, SamplingScheme::LatinHypercube, rng);
    let mut replicate = Matrix::zeros(n, n_vars);
    let mut permutations = Vec::with_capacity(n_vars);
    for j in 0..n_vars {
        let mut perm: Vec<usize> = (0..n).collect();
        perm.shuffle(rng);
        for (k, &src) in perm.iter().enumerate() {
            replicate.set(k, j, first.row(src)[j]);
        }
        permutations.push(perm);
    }

    let mut plan = DesignPlan::new(stack(&first, &replicate)?, n);
    plan.permutations = Some(permutations);
    Ok(plan)
}

/// One-at-a-time trajectories on a `levels`-point grid.
///
/// Each trajectory starts at a random grid point and moves every variable
/// once, in random order, by `grid_jump / (levels - 1)`.
pub(crate) fn morris_design(
    r: usize,
    n_vars: usize,
    options: &SensitivityOptions,
    rng: &mut SmallRng,
) -> Result<DesignPlan> {
    let levels = options.morris.levels;
    let jump = options.morris.grid_jump;
    if levels == 0 || jump == 0 {
        return Err(invalid("morris", "levels and grid jump must be positive"));
    }
    if levels >= 2 && jump >= levels {
        return Err(invalid(
            "morris",
            format!("grid jump {jump} does not fit a {levels}-level grid"),
        ));
    }

    // A single level leaves the grid spacing undefined
    let span = levels as f64 - 1.0;
    let delta = jump as f64 / span;
    let top = levels.saturating_sub(1 + jump);

    let mut design = Matrix::with_cols(n_vars);
    let mut point = vec![0.0; n_vars];
    let mut steps = vec![0.0; n_vars];
    let mut order: Vec<usize> = (0..n_vars).collect();
    for _ in 0..r {
        for (x, step) in point.iter_mut().zip(steps.iter_mut()) {
            let k = rng.random_range(0..=top);
            if rng.random_bool(0.5) {
                *x = k as f64 / span;
                *step = delta;
            } else {
                *x = (k + jump) as f64 / span;
                *step = -delta;
            }
        }
        order.shuffle(rng);

        design.push_row(&point);
        for &j in &order {
            point[j] += steps[j];
            design.push_row(&point);
        }
    }
    Ok(DesignPlan::new(design, r))
}

/// Plain random design for the regression methods
pub(crate) fn regression_design(
    n: usize,
    n_vars: usize,
    options: &SensitivityOptions,
    rng: &mut SmallRng,
) -> Result<DesignPlan> {
    Ok(DesignPlan::new(unit_design(n, n_vars, options.scheme, rng), n))
}

/// `base` with column `j` replaced by the same column of `from`
fn swap_column(base: &Matrix, from: &Matrix, j: usize) -> Matrix {
    let mut out = base.clone();
    for i in 0..out.rows() {
        out.row_mut(i)[j] = from.row(i)[j];
    }
    out
}

fn stack(top: &Matrix, bottom: &Matrix) -> Result<Matrix> {
    top.vstack(bottom).ok_or(MordmError::DimensionMismatch {
        context: "design blocks",
        expected: top.cols(),
        actual: bottom.cols(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(2024)
    }

    #[test]
    fn test_saltelli_layout() {
        let plan = saltelli_design(5, 3, &SensitivityOptions::default(), &mut rng()).unwrap();
        assert_eq!(plan.unit.shape(), (25, 3));
        let (a, b) = (0, 5);
        for block in 0..3 {
            let start = 10 + block * 5;
            for k in 0..5 {
                for j in 0..3 {
                    let expected = if j == block {
                        plan.unit.row(b + k)[j]
                    } else {
                        plan.unit.row(a + k)[j]
                    };
                    assert_eq!(plan.unit.row(start + k)[j], expected);
                }
            }
        }
    }

    #[test]
    fn test_sobol_layout() {
        let plan = sobol_design(4, 2, &SensitivityOptions::default(), &mut rng()).unwrap();
        assert_eq!(plan.unit.shape(), (12, 2));
        for k in 0..4 {
            assert_eq!(plan.unit.row(4 + k)[0], plan.unit.row(k)[0]);
            assert_ne!(plan.unit.row(4 + k)[1], plan.unit.row(k)[1]);
            assert_eq!(plan.unit.row(8 + k)[1], plan.unit.row(k)[1]);
        }
    }

    #[test]
    fn test_replicated_lhs_permutations() {
        let plan = replicated_lhs_design(6, 2, &SensitivityOptions::default(), &mut rng()).unwrap();
        let perms = plan.permutations.as_ref().unwrap();
        for (j, perm) in perms.iter().enumerate() {
            for (k, &src) in perm.iter().enumerate() {
                assert_eq!(plan.unit.row(6 + k)[j], plan.unit.row(src)[j]);
            }
        }
    }

    #[test]
    fn test_morris_trajectories_move_one_variable() {
        let options = SensitivityOptions::default();
        let plan = morris_design(5, 3, &options, &mut rng()).unwrap();
        assert_eq!(plan.unit.shape(), (20, 3));
        let delta = 2.0 / 3.0;
        for t in 0..5 {
            for s in 0..3 {
                let a = plan.unit.row(t * 4 + s);
                let b = plan.unit.row(t * 4 + s + 1);
                let moved: Vec<f64> = a.iter().zip(b).map(|(x, y)| (y - x).abs()).collect();
                assert_eq!(moved.iter().filter(|d| **d > 1e-12).count(), 1);
                assert!(moved.iter().any(|d| (d - delta).abs() < 1e-12));
            }
        }
        assert!(plan.unit.data().iter().all(|v| (-1e-12..=1.0 + 1e-12).contains(v)));
    }

    #[test]
    fn test_morris_single_level_is_not_finite() {
        let mut options = SensitivityOptions::default();
        options.morris.levels = 1;
        options.morris.grid_jump = 1;
        let plan = morris_design(2, 2, &options, &mut rng()).unwrap();
        assert!(!plan.unit.is_finite());

        options.morris.levels = 3;
        options.morris.grid_jump = 3;
        assert!(morris_design(2, 2, &options, &mut rng()).is_err());
    }

    #[test]
    fn test_fast_curves_in_unit_interval() {
        let plan = fast_design(70, 3, &SensitivityOptions::default(), &mut rng()).unwrap();
        assert_eq!(plan.unit.shape(), (210, 3));
        assert!(plan.unit.data().iter().all(|v| (0.0..=1.0).contains(v)));

        assert!(matches!(
            fast_design(64, 3, &SensitivityOptions::default(), &mut rng()),
            Err(MordmError::InvalidDesign { .. })
        ));
    }
}
