//! Statistical helpers shared by the estimators and the robustness engine

pub mod bootstrap;
pub mod linear;

pub use bootstrap::{BootstrapSummary, bootstrap};

/// Arithmetic mean; NaN for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (divisor `n - 1`); NaN for fewer than two values
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

/// Sample standard deviation (divisor `n - 1`)
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Sample covariance (divisor `n - 1`) of two equally long slices
pub fn covariance(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    if a.len() < 2 {
        return f64::NAN;
    }
    let (ma, mb) = (mean(a), mean(b));
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - ma) * (y - mb))
        .sum::<f64>()
        / (a.len() - 1) as f64
}

/// Pearson correlation coefficient
pub fn correlation(a: &[f64], b: &[f64]) -> f64 {
    covariance(a, b) / (std_dev(a) * std_dev(b))
}

/// Mean of the element-wise product
pub fn mean_product(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    mean(&a.iter().zip(b).map(|(x, y)| x * y).collect::<Vec<_>>())
}

/// Ranks starting at 1, averaging ties
pub fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &k in &order[i..=j] {
            ranks[k] = rank;
        }
        i = j + 1;
    }
    ranks
}

/// Quantile of already sorted data using linear interpolation between order
/// statistics (Hyndman & Fan type 7)
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let h = (n - 1) as f64 * p.clamp(0.0, 1.0);
            let lo = h.floor() as usize;
            let hi = h.ceil() as usize;
            sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
        }
    }
}

/// Column-wise means of a row-major set of points
pub fn column_means<'a>(rows: impl Iterator<Item = &'a [f64]>, cols: usize) -> Vec<f64> {
    let mut sums = vec![0.0; cols];
    let mut count = 0usize;
    for row in rows {
        for (s, v) in sums.iter_mut().zip(row) {
            *s += v;
        }
        count += 1;
    }
    sums.iter().map(|s| s / count as f64).collect()
}

/// Euclidean distance between two points
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
