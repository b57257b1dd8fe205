//! Variance decomposition (Sobol') estimators.
//!
//! The two-design estimators read the response in blocks of `n` rows: for
//! `sobol` the blocks are `y0, y_1 .. y_d`; for the Saltelli layout used by
//! `sobol2002`, `sobol2007`, `soboljansen` and `sobolmartinez` they are
//! `yA, yB, y_1 .. y_d`, where `y_i` evaluates `A` with column `i` from `B`.

use rand::rngs::SmallRng;
use statrs::distribution::{ContinuousCDF, Normal};

use super::check_response;
use crate::error::{MordmError, Result};
use crate::sensitivity::{DesignPlan, NativeOutput, SensitivityOptions};
use crate::stats::{correlation, covariance, mean, mean_product, variance};

/// Split the response into its `n`-row blocks
fn blocks(plan: &DesignPlan, y: &[f64]) -> Result<Vec<Vec<f64>>> {
    check_response(plan, y)?;
    Ok(y.chunks(plan.base_size.max(1)).map(<[f64]>::to_vec).collect())
}

fn sobol_output(first_order: Vec<f64>, total_order: Option<Vec<f64>>) -> NativeOutput {
    NativeOutput::Sobol {
        first_order,
        total_order,
        first_order_ci: None,
        total_order_ci: None,
    }
}

/// Sobol' (1993): `S_i = cov(y0, y_i) / var(y0)`
pub(crate) fn sobol(
    plan: &DesignPlan,
    y: &[f64],
    _options: &SensitivityOptions,
    _rng: &mut SmallRng,
) -> Result<NativeOutput> {
    let blocks = blocks(plan, y)?;
    let y0 = &blocks[0];
    let v = variance(y0);
    let first = blocks[1..].iter().map(|yi| covariance(y0, yi) / v).collect();
    Ok(sobol_output(first, None))
}

/// Saltelli (2002)
pub(crate) fn sobol2002(
    plan: &DesignPlan,
    y: &[f64],
    _options: &SensitivityOptions,
    _rng: &mut SmallRng,
) -> Result<NativeOutput> {
    let blocks = blocks(plan, y)?;
    let (ya, yb) = (&blocks[0], &blocks[1]);
    let n1 = (ya.len() as f64 - 1.0).max(1.0);
    let (ma, mb) = (mean(ya), mean(yb));
    let v = variance(ya);

    let mut first = Vec::new();
    let mut total = Vec::new();
    for yi in &blocks[2..] {
        let vce = yb.iter().zip(yi).map(|(b, c)| b * c).sum::<f64>() / n1 - ma * mb;
        let vce_compl = ya.iter().zip(yi).map(|(a, c)| a * c).sum::<f64>() / n1 - ma * ma;
        first.push(vce / v);
        total.push(1.0 - vce_compl / v);
    }
    Ok(sobol_output(first, Some(total)))
}

/// Saltelli (2007)
pub(crate) fn sobol2007(
    plan: &DesignPlan,
    y: &[f64],
    _options: &SensitivityOptions,
    _rng: &mut SmallRng,
) -> Result<NativeOutput> {
    let blocks = blocks(plan, y)?;
    let (ya, yb) = (&blocks[0], &blocks[1]);
    let v = variance(ya);

    let mut first = Vec::new();
    let mut total = Vec::new();
    for yi in &blocks[2..] {
        let diff_a: Vec<f64> = yi.iter().zip(ya).map(|(c, a)| c - a).collect();
        let vce = mean_product(yb, &diff_a);
        let vce_compl = v + mean_product(ya, &diff_a);
        first.push(vce / v);
        total.push(1.0 - vce_compl / v);
    }
    Ok(sobol_output(first, Some(total)))
}

/// Jansen (1999)
pub(crate) fn jansen(
    plan: &DesignPlan,
    y: &[f64],
    _options: &SensitivityOptions,
    _rng: &mut SmallRng,
) -> Result<NativeOutput> {
    let blocks = blocks(plan, y)?;
    let (ya, yb) = (&blocks[0], &blocks[1]);
    let pooled: Vec<f64> = ya.iter().chain(yb).copied().collect();
    let v = variance(&pooled);

    let half_sq = |p: &[f64], q: &[f64]| {
        mean(&p.iter().zip(q).map(|(a, b)| (a - b).powi(2)).collect::<Vec<_>>()) / 2.0
    };

    let mut first = Vec::new();
    let mut total = Vec::new();
    for yi in &blocks[2..] {
        first.push((v - half_sq(yb, yi)) / v);
        total.push(half_sq(ya, yi) / v);
    }
    Ok(sobol_output(first, Some(total)))
}

/// Martinez (2011): correlation estimators with Fisher-z intervals
pub(crate) fn martinez(
    plan: &DesignPlan,
    y: &[f64],
    options: &SensitivityOptions,
    _rng: &mut SmallRng,
) -> Result<NativeOutput> {
    let blocks = blocks(plan, y)?;
    let (ya, yb) = (&blocks[0], &blocks[1]);
    let n = ya.len() as f64;
    let z_crit = Normal::new(0.0, 1.0)
        .map_err(|e| MordmError::UnsupportedInput(e.to_string()))?
        .inverse_cdf((1.0 + options.conf) / 2.0);
    let half_width = z_crit / (n - 3.0).sqrt();
    let interval = |rho: f64| {
        let z = rho.atanh();
        ((z - half_width).tanh(), (z + half_width).tanh())
    };

    let mut first = Vec::new();
    let mut total = Vec::new();
    let mut first_ci = Vec::new();
    let mut total_ci = Vec::new();
    for yi in &blocks[2..] {
        let s = correlation(yb, yi);
        let rho = correlation(ya, yi);
        first.push(s);
        first_ci.push(interval(s));
        total.push(1.0 - rho);
        let (lo, hi) = interval(rho);
        total_ci.push((1.0 - hi, 1.0 - lo));
    }

    Ok(NativeOutput::Sobol {
        first_order: first,
        total_order: Some(total),
        first_order_ci: Some(first_ci),
        total_order_ci: Some(total_ci),
    })
}

/// First-order indices from a replicated Latin hypercube (Tissot and Prieur).
///
/// For variable `j` the replicate rows are re-paired with the base rows that
/// share their `x_j` value, and the index follows the Janon-Monod estimator.
pub(crate) fn replicated_lhs(
    plan: &DesignPlan,
    y: &[f64],
    _options: &SensitivityOptions,
    _rng: &mut SmallRng,
) -> Result<NativeOutput> {
    let blocks = blocks(plan, y)?;
    let (y1, y2) = (&blocks[0], &blocks[1]);
    let perms = plan.permutations.as_deref().unwrap_or_default();

    let first = perms
        .iter()
        .map(|perm| {
            let paired: Vec<f64> = perm.iter().map(|&src| y1[src]).collect();
            janon_monod(&paired, y2)
        })
        .collect();
    Ok(sobol_output(first, None))
}

fn janon_monod(y: &[f64], y_prime: &[f64]) -> f64 {
    let m = (mean(y) + mean(y_prime)) / 2.0;
    let squares: Vec<f64> = y
        .iter()
        .zip(y_prime)
        .map(|(a, b)| (a * a + b * b) / 2.0)
        .collect();
    (mean_product(y, y_prime) - m * m) / (mean(&squares) - m * m)
}
