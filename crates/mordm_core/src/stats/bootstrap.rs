//! Nonparametric bootstrap with percentile confidence intervals.
//!
//! [`bootstrap`] is a pure function: the caller supplies the number of
//! observations, a random source and a statistic closure that recomputes a
//! vector of indices from a list of resampled row indices. Nothing is cached
//! between calls.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::quantile_sorted;

/// Per-index bootstrap output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapSummary {
    /// Statistic on the original (identity) sample
    pub original: Vec<f64>,
    /// Mean of replicates minus the original value
    pub bias: Vec<f64>,
    pub std_error: Vec<f64>,
    pub min_ci: Vec<f64>,
    pub max_ci: Vec<f64>,
}

impl BootstrapSummary {
    /// `(min, max)` interval per index
    pub fn intervals(&self) -> Vec<(f64, f64)> {
        self.min_ci
            .iter()
            .zip(&self.max_ci)
            .map(|(&lo, &hi)| (lo, hi))
            .collect()
    }
}

/// Draw `nboot` resamples of `0..n` with replacement and summarize `statistic`.
///
/// The interval bounds are the `(1 - conf) / 2` and `(1 + conf) / 2`
/// percentiles of the replicates. Non-finite replicate values are ignored
/// per index; an index without any finite replicate gets NaN bounds.
pub fn bootstrap<R, F>(
    n: usize,
    nboot: usize,
    conf: f64,
    rng: &mut R,
    statistic: F,
) -> BootstrapSummary
where
    R: Rng,
    F: Fn(&[usize]) -> Vec<f64>,
{
    let identity: Vec<usize> = (0..n).collect();
    let original = statistic(&identity);
    let k = original.len();

    let mut replicates: Vec<Vec<f64>> = vec![Vec::with_capacity(nboot); k];
    let mut indices = vec![0usize; n];
    let rounds = if n == 0 { 0 } else { nboot };
    for _ in 0..rounds {
        for idx in indices.iter_mut() {
            *idx = rng.random_range(0..n);
        }
        let values = statistic(&indices);
        for (rep, v) in replicates.iter_mut().zip(values) {
            if v.is_finite() {
                rep.push(v);
            }
        }
    }

    let lower_p = (1.0 - conf) / 2.0;
    let upper_p = (1.0 + conf) / 2.0;

    let mut summary = BootstrapSummary {
        original,
        bias: Vec::with_capacity(k),
        std_error: Vec::with_capacity(k),
        min_ci: Vec::with_capacity(k),
        max_ci: Vec::with_capacity(k),
    };
    for (i, rep) in replicates.iter_mut().enumerate() {
        rep.sort_by(f64::total_cmp);
        summary.bias.push(super::mean(rep) - summary.original[i]);
        summary.std_error.push(super::std_dev(rep));
        summary.min_ci.push(quantile_sorted(rep, lower_p));
        summary.max_ci.push(quantile_sorted(rep, upper_p));
    }
    summary
}
