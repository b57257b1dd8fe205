//! Robustness scores for a candidate solution.
//!
//! Every method reduces an evaluated [`SampleSet`] drawn around a candidate
//! to one number where larger means more robust.

mod uncertainty;

pub use uncertainty::{Uncertainty, check_robustness, perturb};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{MordmError, Result};
use crate::model::SampleSet;
use crate::problem::Problem;
use crate::stats::{column_means, euclidean, std_dev};

/// Caller-supplied robustness score
pub type RobustnessFn = Arc<dyn Fn(&SampleSet, &Problem) -> f64 + Send + Sync>;

#[derive(Clone, Default)]
pub enum RobustnessMethod {
    /// Negative weighted sum of per-objective standard deviations
    Variance,
    /// Fraction of rows satisfying every constraint
    Constraints,
    /// Negative RMS distance to a reference point in objective space
    Distance,
    /// Distance in variable space to the nearest infeasible sample
    Infogap,
    /// `variance * (2 - constraints)`
    #[default]
    Default,
    Custom(RobustnessFn),
}

impl RobustnessMethod {
    pub const ALL: [&'static str; 5] = ["variance", "constraints", "distance", "infogap", "default"];

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&SampleSet, &Problem) -> f64 + Send + Sync + 'static,
    {
        RobustnessMethod::Custom(Arc::new(f))
    }
}

impl fmt::Debug for RobustnessMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for RobustnessMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RobustnessMethod::Variance => "variance",
            RobustnessMethod::Constraints => "constraints",
            RobustnessMethod::Distance => "distance",
            RobustnessMethod::Infogap => "infogap",
            RobustnessMethod::Default => "default",
            RobustnessMethod::Custom(_) => "custom",
        };
        f.write_str(name)
    }
}

impl FromStr for RobustnessMethod {
    type Err = MordmError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "variance" => Ok(RobustnessMethod::Variance),
            "constraints" => Ok(RobustnessMethod::Constraints),
            "distance" => Ok(RobustnessMethod::Distance),
            "infogap" => Ok(RobustnessMethod::Infogap),
            "default" => Ok(RobustnessMethod::Default),
            _ => Err(MordmError::UnknownMethod {
                name: s.to_string(),
                available: Self::ALL.to_vec(),
            }),
        }
    }
}

/// Optional inputs to the robustness methods
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RobustnessOptions {
    /// Per-objective weights for `variance`; 1 each when absent
    #[serde(default)]
    pub weights: Option<Vec<f64>>,

    /// Objective-space reference for `distance`
    #[serde(default)]
    pub reference_point: Option<Vec<f64>>,

    /// Variable-space reference for `infogap`; the sample mean when absent
    #[serde(default)]
    pub original_point: Option<Vec<f64>>,

    /// Seed for the perturbation draws of [`check_robustness`]
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Score `samples` with `method`
pub fn robustness(
    samples: &SampleSet,
    problem: &Problem,
    method: &RobustnessMethod,
    options: &RobustnessOptions,
) -> Result<f64> {
    if samples.is_empty() {
        return Err(MordmError::UnsupportedInput(
            "robustness needs at least one sample".into(),
        ));
    }

    match method {
        RobustnessMethod::Variance => variance_score(samples, problem, options),
        RobustnessMethod::Constraints => Ok(constraints_score(samples)),
        RobustnessMethod::Distance => distance_score(samples, problem, options),
        RobustnessMethod::Infogap => infogap_score(samples, problem, options),
        RobustnessMethod::Default => {
            let variance = variance_score(samples, problem, options)?;
            Ok(variance * (2.0 - constraints_score(samples)))
        }
        RobustnessMethod::Custom(f) => Ok(f(samples, problem)),
    }
}

fn check_len(context: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(MordmError::DimensionMismatch {
            context,
            expected,
            actual,
        });
    }
    Ok(())
}

fn variance_score(
    samples: &SampleSet,
    problem: &Problem,
    options: &RobustnessOptions,
) -> Result<f64> {
    let n_objs = problem.n_objs();
    if let Some(weights) = &options.weights {
        check_len("weights", n_objs, weights.len())?;
    }
    check_len("objective columns", n_objs, samples.objectives.cols())?;
    if samples.len() < 2 {
        return Err(MordmError::UnsupportedInput(
            "variance needs at least two samples".into(),
        ));
    }

    let spread: f64 = (0..n_objs)
        .map(|j| {
            let w = options.weights.as_ref().map_or(1.0, |w| w[j]);
            w * std_dev(&samples.objectives.column(j))
        })
        .sum();
    Ok(-spread)
}

fn constraints_score(samples: &SampleSet) -> f64 {
    1.0 - samples.violation_count() as f64 / samples.len() as f64
}

fn distance_score(
    samples: &SampleSet,
    problem: &Problem,
    options: &RobustnessOptions,
) -> Result<f64> {
    let Some(reference) = &options.reference_point else {
        return Ok(0.0);
    };
    check_len("reference point", problem.n_objs(), reference.len())?;

    let mean_sq = samples
        .objectives
        .iter_rows()
        .map(|row| euclidean(row, reference).powi(2))
        .sum::<f64>()
        / samples.len() as f64;
    Ok(-mean_sq.sqrt())
}

/// Approximate info-gap radius.
///
/// Without an original point the sample mean stands in for it, which only
/// approximates the radius around the candidate.
fn infogap_score(
    samples: &SampleSet,
    problem: &Problem,
    options: &RobustnessOptions,
) -> Result<f64> {
    if !samples.has_constraints() {
        return Ok(1.0);
    }

    let reference = match &options.original_point {
        Some(point) => {
            check_len("original point", problem.n_vars(), point.len())?;
            point.clone()
        }
        None => column_means(samples.variables.iter_rows(), samples.variables.cols()),
    };

    let mut nearest_infeasible: Option<f64> = None;
    let mut farthest = 0.0_f64;
    for row in samples.rows() {
        let dist = euclidean(row.variables, &reference);
        if row.is_feasible() {
            farthest = farthest.max(dist);
        } else {
            nearest_infeasible = Some(nearest_infeasible.map_or(dist, |d| d.min(dist)));
        }
    }
    Ok(nearest_infeasible.unwrap_or(farthest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Matrix;
    use crate::problem::ProblemBuilder;

    fn problem(n_objs: usize, n_constrs: usize) -> Problem {
        ProblemBuilder::new(2, n_objs)
            .constraints(n_constrs)
            .function(move |_x: &[f64]| vec![0.0; n_objs + n_constrs])
            .build()
            .unwrap()
    }

    fn samples(objectives: &[Vec<f64>], constraints: Option<&[Vec<f64>]>) -> SampleSet {
        let n = objectives.len();
        let vars: Vec<Vec<f64>> = (0..n).map(|i| vec![i as f64, 0.0]).collect();
        SampleSet {
            variables: Matrix::from_rows(&vars).unwrap(),
            objectives: Matrix::from_rows(objectives).unwrap(),
            constraints: constraints.map(|c| Matrix::from_rows(c).unwrap()),
            variable_names: vec!["x1".into(), "x2".into()],
            objective_names: (1..=objectives[0].len()).map(|i| format!("f{i}")).collect(),
            constraint_names: constraints
                .map(|c| (1..=c[0].len()).map(|i| format!("c{i}")).collect())
                .unwrap_or_default(),
        }
    }

    #[test]
    fn test_variance_is_negative_sample_sd() {
        let set = samples(&[vec![1.0], vec![2.0], vec![3.0]], None);
        let score = robustness(
            &set,
            &problem(1, 0),
            &RobustnessMethod::Variance,
            &RobustnessOptions::default(),
        )
        .unwrap();
        assert!((score + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_variance_weights() {
        let set = samples(&[vec![1.0, 0.0], vec![2.0, 0.0], vec![3.0, 0.0]], None);
        let options = RobustnessOptions {
            weights: Some(vec![2.5, 1.0]),
            ..Default::default()
        };
        let score = robustness(&set, &problem(2, 0), &RobustnessMethod::Variance, &options);
        assert!((score.unwrap() + 2.5).abs() < 1e-12);

        let bad = RobustnessOptions {
            weights: Some(vec![1.0]),
            ..Default::default()
        };
        assert!(matches!(
            robustness(&set, &problem(2, 0), &RobustnessMethod::Variance, &bad),
            Err(MordmError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_constraints_fraction() {
        let objs = vec![vec![0.0]; 4];
        let cons = [vec![0.0], vec![0.3], vec![0.0], vec![-1.0]];
        let set = samples(&objs, Some(&cons[..]));
        let score = robustness(
            &set,
            &problem(1, 1),
            &RobustnessMethod::Constraints,
            &RobustnessOptions::default(),
        )
        .unwrap();
        assert_eq!(score, 0.5);
    }

    #[test]
    fn test_default_combines() {
        let objs = [vec![1.0], vec![2.0], vec![3.0], vec![2.0]];
        let cons = [vec![0.0], vec![1.0], vec![0.0], vec![0.0]];
        let set = samples(&objs, Some(&cons[..]));
        let p = problem(1, 1);
        let opts = RobustnessOptions::default();
        let v = robustness(&set, &p, &RobustnessMethod::Variance, &opts).unwrap();
        let d = robustness(&set, &p, &RobustnessMethod::Default, &opts).unwrap();
        assert!((d - v * 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_distance() {
        let set = samples(&[vec![3.0, 4.0], vec![0.0, 0.0]], None);
        let p = problem(2, 0);
        let none = robustness(&set, &p, &RobustnessMethod::Distance, &Default::default());
        assert_eq!(none.unwrap(), 0.0);

        let options = RobustnessOptions {
            reference_point: Some(vec![0.0, 0.0]),
            ..Default::default()
        };
        let score = robustness(&set, &p, &RobustnessMethod::Distance, &options).unwrap();
        assert!((score + (12.5f64).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_infogap() {
        let objs = vec![vec![0.0]; 4];
        // Variables are (i, 0)
        let feasible = vec![vec![0.0]; 4];
        let p = problem(1, 1);
        let origin = RobustnessOptions {
            original_point: Some(vec![0.0, 0.0]),
            ..Default::default()
        };

        let set = samples(&objs, Some(&feasible[..]));
        let score = robustness(&set, &p, &RobustnessMethod::Infogap, &origin).unwrap();
        assert_eq!(score, 3.0);

        let mixed = [vec![0.0], vec![0.0], vec![1.0], vec![1.0]];
        let set = samples(&objs, Some(&mixed[..]));
        let score = robustness(&set, &p, &RobustnessMethod::Infogap, &origin).unwrap();
        assert_eq!(score, 2.0);

        // Sample mean (1.5, 0) as reference
        let score =
            robustness(&set, &p, &RobustnessMethod::Infogap, &Default::default()).unwrap();
        assert_eq!(score, 0.5);

        let unconstrained = samples(&objs, None);
        let score = robustness(&unconstrained, &problem(1, 0), &RobustnessMethod::Infogap, &origin);
        assert_eq!(score.unwrap(), 1.0);
    }

    #[test]
    fn test_custom_and_parsing() {
        let set = samples(&[vec![1.0], vec![5.0]], None);
        let method = RobustnessMethod::custom(|s, _| s.objectives.column(0).iter().sum());
        let score = robustness(&set, &problem(1, 0), &method, &Default::default()).unwrap();
        assert_eq!(score, 6.0);

        assert!(matches!(
            "infogap".parse::<RobustnessMethod>(),
            Ok(RobustnessMethod::Infogap)
        ));
        assert!(matches!(
            "spread".parse::<RobustnessMethod>(),
            Err(MordmError::UnknownMethod { .. })
        ));
    }

    #[test]
    fn test_empty_set_rejected() {
        let set = SampleSet {
            variables: Matrix::zeros(0, 2),
            objectives: Matrix::zeros(0, 1),
            constraints: None,
            variable_names: vec!["x1".into(), "x2".into()],
            objective_names: vec!["f1".into()],
            constraint_names: vec![],
        };
        assert!(matches!(
            robustness(&set, &problem(1, 0), &RobustnessMethod::Default, &Default::default()),
            Err(MordmError::UnsupportedInput(_))
        ));
    }
}
