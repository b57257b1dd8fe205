//! Sensitivity results: the uniform [`StandardResult`] and the per-method
//! [`NativeOutput`] it is normalized from.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::Matrix;
use crate::stats::BootstrapSummary;

/// One set of indices (first or total order) with its ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSummary {
    /// One value per variable, in variable order
    pub values: Vec<f64>,
    /// Variable indices sorted by descending value
    pub rank: Vec<usize>,
    /// `(min, max)` interval per variable when the method provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Vec<(f64, f64)>>,
}

impl IndexSummary {
    pub fn new(values: Vec<f64>) -> Self {
        let rank = rank_descending(&values);
        Self {
            values,
            rank,
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: Vec<(f64, f64)>) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Index of the most influential variable
    pub fn top(&self) -> Option<usize> {
        self.rank.first().copied()
    }
}

/// Method-independent sensitivity result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardResult {
    pub method: String,
    pub variable_names: Vec<String>,
    /// Number of model evaluations the design consumed
    pub evaluations: usize,
    pub first_order: Option<IndexSummary>,
    pub total_order: Option<IndexSummary>,
}

impl StandardResult {
    /// Pair each variable name with its first-order value, most influential first
    pub fn ranked_first_order(&self) -> Vec<(&str, f64)> {
        self.first_order
            .as_ref()
            .map(|s| {
                s.rank
                    .iter()
                    .map(|&i| (self.variable_names[i].as_str(), s.values[i]))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Permutation of `0..values.len()` sorting `values` in descending order.
///
/// Ties keep their original order and NaN values sort last.
pub fn rank_descending(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| match (values[a].is_nan(), values[b].is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => values[b].partial_cmp(&values[a]).unwrap_or(Ordering::Equal),
    });
    order
}

/// Raw estimator output, shaped per method family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NativeOutput {
    /// Extended Fourier amplitude sensitivity test
    Fast {
        /// Total variance per curve
        variance: Vec<f64>,
        /// Variance at the driving frequency and its harmonics
        first_order_variance: Vec<f64>,
        /// Variance at the low frequencies of the complementary set
        complementary_variance: Vec<f64>,
    },
    /// Variance decomposition estimators
    Sobol {
        first_order: Vec<f64>,
        total_order: Option<Vec<f64>>,
        first_order_ci: Option<Vec<(f64, f64)>>,
        total_order_ci: Option<Vec<(f64, f64)>>,
    },
    /// Elementary effects screening
    Morris {
        /// One row per trajectory, one column per variable
        ee: Matrix,
        mu: Vec<f64>,
        mu_star: Vec<f64>,
        sigma: Vec<f64>,
    },
    /// Regression-based coefficients
    Regression {
        statistic: String,
        values: Vec<f64>,
        bootstrap: Option<BootstrapSummary>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_descending() {
        assert_eq!(rank_descending(&[0.1, 0.7, 0.3]), vec![1, 2, 0]);
        assert!(rank_descending(&[]).is_empty());
    }

    #[test]
    fn test_rank_ties_keep_order_nan_last() {
        assert_eq!(
            rank_descending(&[0.5, f64::NAN, 0.5, 0.9]),
            vec![3, 0, 2, 1]
        );
        assert_eq!(rank_descending(&[f64::NAN, f64::NAN]), vec![0, 1]);
        assert_eq!(rank_descending(&[-0.0, 0.0]), vec![0, 1]);
    }

    #[test]
    fn test_ranked_first_order() {
        let result = StandardResult {
            method: "src".into(),
            variable_names: vec!["a".into(), "b".into()],
            evaluations: 10,
            first_order: Some(IndexSummary::new(vec![0.2, 0.8])),
            total_order: None,
        };
        assert_eq!(result.ranked_first_order(), vec![("b", 0.8), ("a", 0.2)]);
        assert_eq!(result.first_order.unwrap().top(), Some(1));
    }
}
