//! Static table of supported sensitivity methods.
//!
//! Each [`MethodSpec`] bundles the strategies for one method: how many
//! levels a sample target buys, how many evaluations those levels cost, how
//! the design is built, which estimator reads it and how the estimator
//! output is normalized. Dispatch happens once, through [`lookup`].

use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use super::designs::{
    fast_design, morris_design, regression_design, replicated_lhs_design, saltelli_design,
    sobol_design,
};
use super::estimators::{fast, morris, regression, variance};
use super::{DesignPlan, IndexSummary, NativeOutput, SensitivityOptions};
use crate::error::{MordmError, Result};

pub type DesignBuilder =
    fn(usize, usize, &SensitivityOptions, &mut SmallRng) -> Result<DesignPlan>;
pub type Estimator =
    fn(&DesignPlan, &[f64], &SensitivityOptions, &mut SmallRng) -> Result<NativeOutput>;
pub type Normalizer = fn(&NativeOutput) -> Result<NormalizedIndices>;
/// Index statistic over a list of resampled rows
pub type ResampleStatistic = fn(&DesignPlan, &[f64], &[usize], &SensitivityOptions) -> Vec<f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodFamily {
    Fourier,
    /// Variance decomposition over two independent designs
    VarianceTwoDesign,
    /// Variance decomposition over one replicated design
    VarianceOneDesign,
    Screening,
    Regression,
}

/// Index sets extracted from an estimator output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedIndices {
    pub first_order: Option<IndexSummary>,
    pub total_order: Option<IndexSummary>,
}

pub struct MethodSpec {
    pub id: &'static str,
    pub family: MethodFamily,
    /// `(n_samples, n_vars) -> levels`
    pub level_count: fn(usize, usize) -> usize,
    /// `(levels, n_vars) -> evaluations`
    pub evaluations: fn(usize, usize) -> usize,
    pub build_design: DesignBuilder,
    pub estimate: Estimator,
    pub normalize: Normalizer,
    /// Statistic the registry bootstraps itself when `nboot > 0`
    pub resample: Option<ResampleStatistic>,
}

impl MethodSpec {
    /// Evaluations a run with `n_samples` requested samples consumes
    pub fn evaluation_count(&self, n_samples: usize, n_vars: usize) -> usize {
        (self.evaluations)((self.level_count)(n_samples, n_vars), n_vars)
    }
}

impl std::fmt::Debug for MethodSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodSpec")
            .field("id", &self.id)
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Level formulas
// ============================================================================

fn per_variable(s: usize, d: usize) -> usize {
    s.div_ceil(d.max(1))
}

fn per_variable_plus_one(s: usize, d: usize) -> usize {
    s.div_ceil(d + 1)
}

fn per_variable_plus_two(s: usize, d: usize) -> usize {
    s.div_ceil(d + 2)
}

fn halved(s: usize, _d: usize) -> usize {
    s.div_ceil(2)
}

fn direct(s: usize, _d: usize) -> usize {
    s
}

fn times_variables(n: usize, d: usize) -> usize {
    n * d
}

fn times_variables_plus_one(n: usize, d: usize) -> usize {
    n * (d + 1)
}

fn times_variables_plus_two(n: usize, d: usize) -> usize {
    n * (d + 2)
}

fn doubled(n: usize, _d: usize) -> usize {
    2 * n
}

// ============================================================================
// Normalizers
// ============================================================================

fn mismatch(output: &NativeOutput) -> MordmError {
    MordmError::UnsupportedInput(format!(
        "estimator output {output:?} does not match the method's normalizer"
    ))
}

fn normalize_fast(output: &NativeOutput) -> Result<NormalizedIndices> {
    let NativeOutput::Fast {
        variance,
        first_order_variance,
        complementary_variance,
    } = output
    else {
        return Err(mismatch(output));
    };
    let first = first_order_variance
        .iter()
        .zip(variance)
        .map(|(d1, v)| d1 / v)
        .collect();
    let total = complementary_variance
        .iter()
        .zip(variance)
        .map(|(dt, v)| 1.0 - dt / v)
        .collect();
    Ok(NormalizedIndices {
        first_order: Some(IndexSummary::new(first)),
        total_order: Some(IndexSummary::new(total)),
    })
}

fn normalize_sobol(output: &NativeOutput) -> Result<NormalizedIndices> {
    let NativeOutput::Sobol {
        first_order,
        total_order,
        first_order_ci,
        total_order_ci,
    } = output
    else {
        return Err(mismatch(output));
    };

    let with_ci = |values: &Vec<f64>, ci: &Option<Vec<(f64, f64)>>| {
        let summary = IndexSummary::new(values.clone());
        match ci {
            Some(ci) => summary.with_confidence(ci.clone()),
            None => summary,
        }
    };
    Ok(NormalizedIndices {
        first_order: Some(with_ci(first_order, first_order_ci)),
        total_order: total_order.as_ref().map(|t| with_ci(t, total_order_ci)),
    })
}

/// Mean absolute elementary effect stands in for the first-order index
fn normalize_morris(output: &NativeOutput) -> Result<NormalizedIndices> {
    let NativeOutput::Morris { mu_star, .. } = output else {
        return Err(mismatch(output));
    };
    Ok(NormalizedIndices {
        first_order: Some(IndexSummary::new(mu_star.clone())),
        total_order: None,
    })
}

fn normalize_regression(output: &NativeOutput) -> Result<NormalizedIndices> {
    let NativeOutput::Regression {
        values, bootstrap, ..
    } = output
    else {
        return Err(mismatch(output));
    };
    let mut summary = IndexSummary::new(values.clone());
    if let Some(boot) = bootstrap {
        summary = summary.with_confidence(boot.intervals());
    }
    Ok(NormalizedIndices {
        first_order: Some(summary),
        total_order: None,
    })
}

// ============================================================================
// Registry
// ============================================================================

pub static METHODS: &[MethodSpec] = &[
    MethodSpec {
        id: "fast99",
        family: MethodFamily::Fourier,
        level_count: per_variable,
        evaluations: times_variables,
        build_design: fast_design,
        estimate: fast::estimate,
        normalize: normalize_fast,
        resample: None,
    },
    MethodSpec {
        id: "sobol",
        family: MethodFamily::VarianceTwoDesign,
        level_count: per_variable_plus_one,
        evaluations: times_variables_plus_one,
        build_design: sobol_design,
        estimate: variance::sobol,
        normalize: normalize_sobol,
        resample: None,
    },
    MethodSpec {
        id: "sobol2002",
        family: MethodFamily::VarianceTwoDesign,
        level_count: per_variable_plus_two,
        evaluations: times_variables_plus_two,
        build_design: saltelli_design,
        estimate: variance::sobol2002,
        normalize: normalize_sobol,
        resample: None,
    },
    MethodSpec {
        id: "sobol2007",
        family: MethodFamily::VarianceTwoDesign,
        level_count: per_variable_plus_two,
        evaluations: times_variables_plus_two,
        build_design: saltelli_design,
        estimate: variance::sobol2007,
        normalize: normalize_sobol,
        resample: None,
    },
    MethodSpec {
        id: "soboljansen",
        family: MethodFamily::VarianceTwoDesign,
        level_count: per_variable_plus_two,
        evaluations: times_variables_plus_two,
        build_design: saltelli_design,
        estimate: variance::jansen,
        normalize: normalize_sobol,
        resample: None,
    },
    MethodSpec {
        id: "sobolmartinez",
        family: MethodFamily::VarianceTwoDesign,
        level_count: per_variable_plus_two,
        evaluations: times_variables_plus_two,
        build_design: saltelli_design,
        estimate: variance::martinez,
        normalize: normalize_sobol,
        resample: None,
    },
    MethodSpec {
        id: "sobolroalhs",
        family: MethodFamily::VarianceOneDesign,
        level_count: halved,
        evaluations: doubled,
        build_design: replicated_lhs_design,
        estimate: variance::replicated_lhs,
        normalize: normalize_sobol,
        resample: None,
    },
    MethodSpec {
        id: "morris",
        family: MethodFamily::Screening,
        level_count: per_variable_plus_one,
        evaluations: times_variables_plus_one,
        build_design: morris_design,
        estimate: morris::estimate,
        normalize: normalize_morris,
        resample: None,
    },
    MethodSpec {
        id: "src",
        family: MethodFamily::Regression,
        level_count: direct,
        evaluations: direct,
        build_design: regression_design,
        estimate: regression::estimate_src,
        normalize: normalize_regression,
        resample: None,
    },
    MethodSpec {
        id: "pcc",
        family: MethodFamily::Regression,
        level_count: direct,
        evaluations: direct,
        build_design: regression_design,
        estimate: regression::estimate_pcc,
        normalize: normalize_regression,
        resample: None,
    },
    MethodSpec {
        id: "regression",
        family: MethodFamily::Regression,
        level_count: direct,
        evaluations: direct,
        build_design: regression_design,
        estimate: regression::estimate_variance_share,
        normalize: normalize_regression,
        resample: Some(regression::variance_share),
    },
];

/// Identifiers of every registered method
pub fn method_ids() -> Vec<&'static str> {
    METHODS.iter().map(|m| m.id).collect()
}

/// Find a method by identifier
pub fn lookup(id: &str) -> Result<&'static MethodSpec> {
    METHODS
        .iter()
        .find(|m| m.id == id)
        .ok_or_else(|| MordmError::UnknownMethod {
            name: id.to_string(),
            available: method_ids(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::BootstrapSummary;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("sobol2007").unwrap().id, "sobol2007");
        match lookup("sobol2099") {
            Err(MordmError::UnknownMethod { name, available }) => {
                assert_eq!(name, "sobol2099");
                assert_eq!(available.len(), 11);
                assert!(available.contains(&"fast99"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_ids_unique() {
        let mut ids = method_ids();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), METHODS.len());
    }

    #[test]
    fn test_level_formulas() {
        let count = |id: &str, s, d| (lookup(id).unwrap().level_count)(s, d);
        assert_eq!(count("fast99", 1000, 3), 334);
        assert_eq!(count("sobol", 1000, 3), 250);
        assert_eq!(count("sobol2002", 1000, 3), 200);
        assert_eq!(count("sobolmartinez", 1001, 3), 201);
        assert_eq!(count("sobolroalhs", 1001, 3), 501);
        assert_eq!(count("morris", 100, 4), 20);
        assert_eq!(count("pcc", 77, 4), 77);
    }

    #[test]
    fn test_evaluation_count_covers_target_and_is_monotone() {
        for spec in METHODS {
            for d in 1..6 {
                let mut previous = 0;
                for s in 1..300 {
                    let evals = spec.evaluation_count(s, d);
                    assert!(evals >= s, "{} s={s} d={d}", spec.id);
                    assert!(evals >= previous, "{} not monotone at s={s}", spec.id);
                    previous = evals;
                }
            }
        }
    }

    #[test]
    fn test_normalize_sobol_with_intervals() {
        let output = NativeOutput::Sobol {
            first_order: vec![0.1, 0.6],
            total_order: Some(vec![0.2, 0.7]),
            first_order_ci: Some(vec![(0.0, 0.2), (0.5, 0.7)]),
            total_order_ci: None,
        };
        let indices = normalize_sobol(&output).unwrap();
        let first = indices.first_order.unwrap();
        assert_eq!(first.rank, vec![1, 0]);
        assert_eq!(first.confidence.unwrap().len(), 2);
        let total = indices.total_order.unwrap();
        assert_eq!(total.rank, vec![1, 0]);
        assert!(total.confidence.is_none());
    }

    #[test]
    fn test_normalize_fast() {
        let output = NativeOutput::Fast {
            variance: vec![2.0, 4.0],
            first_order_variance: vec![1.0, 1.0],
            complementary_variance: vec![0.5, 2.0],
        };
        let indices = normalize_fast(&output).unwrap();
        assert_eq!(indices.first_order.unwrap().values, vec![0.5, 0.25]);
        assert_eq!(indices.total_order.unwrap().values, vec![0.75, 0.5]);
    }

    #[test]
    fn test_normalize_regression_and_mismatch() {
        let output = NativeOutput::Regression {
            statistic: "SRC2".into(),
            values: vec![0.3, 0.4],
            bootstrap: Some(BootstrapSummary {
                original: vec![0.3, 0.4],
                bias: vec![0.0, 0.0],
                std_error: vec![0.01, 0.01],
                min_ci: vec![0.25, 0.35],
                max_ci: vec![0.35, 0.45],
            }),
        };
        let first = normalize_regression(&output).unwrap().first_order.unwrap();
        assert_eq!(first.rank, vec![1, 0]);
        assert_eq!(first.confidence, Some(vec![(0.25, 0.35), (0.35, 0.45)]));

        assert!(normalize_morris(&output).is_err());
    }
}
