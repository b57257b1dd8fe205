//! Ordinary least squares through an SVD of the design matrix.

use nalgebra::{DMatrix, DVector};

/// Singular values below this share of the largest one count as zero
const RANK_TOLERANCE: f64 = 1e-10;

/// Fit `y = b0 + b1 x1 + ... + bd xd`.
///
/// `columns` holds one slice per predictor, each as long as `y`. Returns the
/// coefficient vector `[b0, b1, .., bd]`, or `None` when the design matrix is
/// rank deficient.
pub fn least_squares(columns: &[&[f64]], y: &[f64]) -> Option<Vec<f64>> {
    let p = columns.len() + 1;
    let n = y.len();
    if n < p {
        return None;
    }

    let x = DMatrix::from_fn(n, p, |i, k| if k == 0 { 1.0 } else { columns[k - 1][i] });
    let svd = x.svd(true, true);
    let tolerance = RANK_TOLERANCE * svd.singular_values.max();
    if svd.rank(tolerance) < p {
        return None;
    }
    let coef = svd.solve(&DVector::from_column_slice(y), tolerance).ok()?;
    Some(coef.iter().copied().collect())
}

/// Residuals of `y` after regressing it on `columns` (with intercept)
pub fn residuals(columns: &[&[f64]], y: &[f64]) -> Option<Vec<f64>> {
    let coef = least_squares(columns, y)?;
    Some(
        (0..y.len())
            .map(|i| {
                let fitted = coef[0]
                    + columns
                        .iter()
                        .zip(&coef[1..])
                        .map(|(col, b)| col[i] * b)
                        .sum::<f64>();
                y[i] - fitted
            })
            .collect(),
    )
}
