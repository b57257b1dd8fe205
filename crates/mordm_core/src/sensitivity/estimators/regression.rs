//! Regression-based sensitivity measures: standardized regression
//! coefficients (SRC), partial correlation coefficients (PCC), their rank
//! variants (SRRC, PRCC) and the linear variance share `SRC^2`.
//!
//! Every statistic is a function of a list of row indices so the same code
//! serves the original sample and bootstrap resamples.

use rand::rngs::SmallRng;

use super::check_response;
use crate::error::{MordmError, Result};
use crate::sensitivity::{DesignPlan, NativeOutput, SensitivityOptions};
use crate::stats::linear::{least_squares, residuals};
use crate::stats::{bootstrap, correlation, ranks, std_dev};

/// Design columns and response restricted to `idx`, rank transformed on request
fn gather(plan: &DesignPlan, y: &[f64], idx: &[usize], rank: bool) -> (Vec<Vec<f64>>, Vec<f64>) {
    let mut columns: Vec<Vec<f64>> = (0..plan.n_vars())
        .map(|j| idx.iter().map(|&i| plan.unit.row(i)[j]).collect())
        .collect();
    let mut response: Vec<f64> = idx.iter().map(|&i| y[i]).collect();
    if rank {
        for col in columns.iter_mut() {
            *col = ranks(col);
        }
        response = ranks(&response);
    }
    (columns, response)
}

/// Standardized regression coefficients `b_j * sd(x_j) / sd(y)`
pub(crate) fn src_values(plan: &DesignPlan, y: &[f64], idx: &[usize], rank: bool) -> Vec<f64> {
    let (columns, response) = gather(plan, y, idx, rank);
    let refs: Vec<&[f64]> = columns.iter().map(Vec::as_slice).collect();
    let Some(coef) = least_squares(&refs, &response) else {
        return vec![f64::NAN; columns.len()];
    };
    let sd_y = std_dev(&response);
    columns
        .iter()
        .zip(&coef[1..])
        .map(|(col, b)| b * std_dev(col) / sd_y)
        .collect()
}

/// Partial correlation of each variable with the response, controlling for
/// the other variables
pub(crate) fn pcc_values(plan: &DesignPlan, y: &[f64], idx: &[usize], rank: bool) -> Vec<f64> {
    let (columns, response) = gather(plan, y, idx, rank);
    (0..columns.len())
        .map(|j| {
            let others: Vec<&[f64]> = columns
                .iter()
                .enumerate()
                .filter(|(k, _)| *k != j)
                .map(|(_, c)| c.as_slice())
                .collect();
            match (residuals(&others, &columns[j]), residuals(&others, &response)) {
                (Some(rx), Some(ry)) => correlation(&rx, &ry),
                _ => f64::NAN,
            }
        })
        .collect()
}

/// Share of response variance explained linearly by each variable
pub(crate) fn variance_share(
    plan: &DesignPlan,
    y: &[f64],
    idx: &[usize],
    options: &SensitivityOptions,
) -> Vec<f64> {
    src_values(plan, y, idx, options.rank)
        .into_iter()
        .map(|v| v * v)
        .collect()
}

type Statistic = fn(&DesignPlan, &[f64], &[usize], bool) -> Vec<f64>;

fn estimate_with(
    (name, rank_name): (&str, &str),
    statistic: Statistic,
    plan: &DesignPlan,
    y: &[f64],
    options: &SensitivityOptions,
    rng: &mut SmallRng,
) -> Result<NativeOutput> {
    check_response(plan, y)?;
    let n = plan.base_size;
    let identity: Vec<usize> = (0..n).collect();
    let values = statistic(plan, y, &identity, options.rank);
    ensure_fitted(name, &values)?;

    let bootstrap = (options.nboot > 0).then(|| {
        bootstrap(n, options.nboot, options.conf, rng, |idx| {
            statistic(plan, y, idx, options.rank)
        })
    });

    let label = if options.rank { rank_name } else { name };
    Ok(NativeOutput::Regression {
        statistic: label.to_string(),
        values,
        bootstrap,
    })
}

fn ensure_fitted(name: &str, values: &[f64]) -> Result<()> {
    if !values.is_empty() && values.iter().all(|v| v.is_nan()) {
        return Err(MordmError::InvalidDesign {
            method: name.to_ascii_lowercase(),
            reason: "regression is singular; increase the sample count".into(),
        });
    }
    Ok(())
}

pub(crate) fn estimate_src(
    plan: &DesignPlan,
    y: &[f64],
    options: &SensitivityOptions,
    rng: &mut SmallRng,
) -> Result<NativeOutput> {
    estimate_with(("SRC", "SRRC"), src_values, plan, y, options, rng)
}

pub(crate) fn estimate_pcc(
    plan: &DesignPlan,
    y: &[f64],
    options: &SensitivityOptions,
    rng: &mut SmallRng,
) -> Result<NativeOutput> {
    estimate_with(("PCC", "PRCC"), pcc_values, plan, y, options, rng)
}

/// `SRC^2` without intervals; resampling for this method is driven by the
/// registry through [`variance_share`]
pub(crate) fn estimate_variance_share(
    plan: &DesignPlan,
    y: &[f64],
    options: &SensitivityOptions,
    _rng: &mut SmallRng,
) -> Result<NativeOutput> {
    check_response(plan, y)?;
    let identity: Vec<usize> = (0..plan.base_size).collect();
    let values = variance_share(plan, y, &identity, options);
    ensure_fitted("regression", &values)?;
    Ok(NativeOutput::Regression {
        statistic: "SRC2".into(),
        values,
        bootstrap: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::rng_from_seed;
    use crate::sensitivity::designs::regression_design;

    fn linear_plan(n: usize, seed: u64) -> (DesignPlan, Vec<f64>) {
        let options = SensitivityOptions::default();
        let plan = regression_design(n, 3, &options, &mut rng_from_seed(Some(seed))).unwrap();
        let y = plan
            .unit
            .iter_rows()
            .map(|x| 1.0 * x[0] + 3.0 * x[1] - 2.0 * x[2])
            .collect();
        (plan, y)
    }

    #[test]
    fn test_src_recovers_linear_weights() {
        let (plan, y) = linear_plan(300, 1);
        let idx: Vec<usize> = (0..300).collect();
        let src = src_values(&plan, &y, &idx, false);
        // Equal input variances: SRC proportional to the coefficients
        let norm = (1.0f64 + 9.0 + 4.0).sqrt();
        assert!((src[0] - 1.0 / norm).abs() < 0.08);
        assert!((src[1] - 3.0 / norm).abs() < 0.08);
        assert!((src[2] + 2.0 / norm).abs() < 0.08);

        let share: f64 = variance_share(&plan, &y, &idx, &SensitivityOptions::default())
            .iter()
            .sum();
        assert!((share - 1.0).abs() < 0.15);
    }

    #[test]
    fn test_pcc_of_exact_linear_model_is_unit() {
        let (plan, y) = linear_plan(100, 2);
        let idx: Vec<usize> = (0..100).collect();
        let pcc = pcc_values(&plan, &y, &idx, false);
        assert!((pcc[0] - 1.0).abs() < 1e-6);
        assert!((pcc[1] - 1.0).abs() < 1e-6);
        assert!((pcc[2] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_bootstrap_intervals_and_rank_label() {
        let (plan, y) = linear_plan(200, 3);
        let options = SensitivityOptions {
            nboot: 50,
            rank: true,
            ..Default::default()
        };
        let mut rng = rng_from_seed(Some(4));
        let NativeOutput::Regression {
            statistic,
            values,
            bootstrap,
        } = estimate_src(&plan, &y, &options, &mut rng).unwrap()
        else {
            panic!("expected regression output");
        };
        assert_eq!(statistic, "SRRC");
        let summary = bootstrap.unwrap();
        assert_eq!(summary.original, values);
        for (lo, hi) in summary.intervals() {
            assert!(lo <= hi);
        }
    }

    #[test]
    fn test_singular_design() {
        let options = SensitivityOptions::default();
        let plan = regression_design(2, 3, &options, &mut rng_from_seed(Some(5))).unwrap();
        let err = estimate_pcc(&plan, &[1.0, 2.0], &options, &mut rng_from_seed(Some(5)));
        assert!(matches!(err, Err(MordmError::InvalidDesign { .. })));
    }
}
