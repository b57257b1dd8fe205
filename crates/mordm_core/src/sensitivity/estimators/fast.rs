//! Extended Fourier amplitude sensitivity test (eFAST).
//!
//! Each variable owns one search curve of `n` points on which it oscillates
//! at the maximum frequency `omega_max` while every other variable uses a low
//! complementary frequency. The share of the response spectrum at
//! `omega_max` and its first `M` harmonics estimates the first-order index;
//! the share below `omega_max / 2` belongs to the complementary set and
//! yields the total-order index.

use rand::rngs::SmallRng;

use super::check_response;
use crate::error::Result;
use crate::sensitivity::{DesignPlan, NativeOutput, SensitivityOptions};

/// Driving and complementary frequencies for `n` points per curve.
///
/// Returns `None` unless `n > 4 M^2`, which keeps `omega_max >= 2M`.
pub fn frequencies(n: usize, n_vars: usize, m: usize) -> Option<(usize, Vec<usize>)> {
    if m == 0 || n <= 4 * m * m {
        return None;
    }
    let omega_max = (n - 1) / (2 * m);
    let top = omega_max / (2 * m);
    let count = n_vars.saturating_sub(1);

    let others = if top >= count {
        match count {
            0 => Vec::new(),
            1 => vec![1],
            _ => (0..count)
                .map(|k| (1.0 + (top - 1) as f64 * k as f64 / (count - 1) as f64).floor() as usize)
                .collect(),
        }
    } else {
        (0..count).map(|k| k % top + 1).collect()
    };
    Some((omega_max, others))
}

/// Power spectrum `(|F_k| / n)^2` for `k = 1 .. n/2 - 1`; entry `k - 1`
/// holds frequency `k`
fn power_spectrum(y: &[f64]) -> Vec<f64> {
    let n = y.len();
    let half = n / 2;
    (1..half)
        .map(|k| {
            let (mut re, mut im) = (0.0, 0.0);
            for (t, v) in y.iter().enumerate() {
                let angle = 2.0 * std::f64::consts::PI * (k * t % n) as f64 / n as f64;
                re += v * angle.cos();
                im -= v * angle.sin();
            }
            (re * re + im * im) / (n * n) as f64
        })
        .collect()
}

pub(crate) fn estimate(
    plan: &DesignPlan,
    y: &[f64],
    options: &SensitivityOptions,
    _rng: &mut SmallRng,
) -> Result<NativeOutput> {
    check_response(plan, y)?;
    let n = plan.base_size;
    let m = options.interference;
    let omega_max = frequencies(n, plan.n_vars(), m).map_or(0, |(w, _)| w);

    let mut variance = Vec::with_capacity(plan.n_vars());
    let mut first_order_variance = Vec::with_capacity(plan.n_vars());
    let mut complementary_variance = Vec::with_capacity(plan.n_vars());
    for curve in y.chunks(n) {
        let sp = power_spectrum(curve);
        let at = |freq: usize| sp.get(freq.wrapping_sub(1)).copied().unwrap_or(0.0);

        variance.push(2.0 * sp.iter().sum::<f64>());
        first_order_variance.push(2.0 * (1..=m).map(|p| at(p * omega_max)).sum::<f64>());
        complementary_variance.push(2.0 * (1..=omega_max / 2).map(at).sum::<f64>());
    }

    Ok(NativeOutput::Fast {
        variance,
        first_order_variance,
        complementary_variance,
    })
}
