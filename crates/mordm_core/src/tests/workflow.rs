use crate::design::sample_uniform;
use crate::optimization::{EpsilonArchiveSearch, OptimizerSettings};
use crate::problem::{Problem, ProblemBuilder};
use crate::robustness::{
    RobustnessMethod, RobustnessOptions, Uncertainty, check_robustness, robustness,
};
use crate::sensitivity::{SensitivityOptions, compute_sensitivity};

/// Lake-style trade-off: release more for benefit, risk crossing a threshold
fn release_problem() -> Problem {
    ProblemBuilder::new(2, 2)
        .constraints(1)
        .names(["release", "inflow", "benefit", "pollution", "threshold"])
        .bounds(vec![(0.0, 0.1), (0.0, 1.0)])
        .epsilons(vec![0.005, 0.01])
        .maximize(0)
        .function(|x: &[f64]| {
            let pollution = 5.0 * x[0] + 0.2 * x[1];
            let excess = (pollution - 0.6).max(0.0);
            vec![10.0 * x[0], pollution, excess]
        })
        .build()
        .unwrap()
}

#[test]
fn test_optimize_then_check_robustness() {
    let problem = release_problem();
    let settings = OptimizerSettings {
        max_evaluations: 1_500,
        frequency: None,
        seed: Some(99),
    };
    let pareto = problem
        .optimize(&EpsilonArchiveSearch::default(), &settings)
        .unwrap();

    assert!(!pareto.is_empty());
    assert_eq!(pareto.variable_names, ["release", "inflow"]);
    assert_eq!(pareto.objective_names, ["benefit", "pollution"]);
    // Benefit is maximized, so archived values are negated
    assert!(pareto.objectives.column(0).iter().all(|&v| v <= 0.0));
    assert_eq!(pareto.violation_count(), 0);

    let options = RobustnessOptions {
        seed: Some(1),
        ..Default::default()
    };
    let uncertainty = Uncertainty::Uniform {
        relative_radius: 0.2,
    };
    let scores = check_robustness(
        &problem,
        &pareto.variables,
        50,
        uncertainty,
        &RobustnessMethod::Constraints,
        &options,
    )
    .unwrap();
    assert_eq!(scores.len(), pareto.len());
    assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));

    // The most cautious release cannot be less robust than the boldest one
    let releases = pareto.variables.column(0);
    let cautious = (0..releases.len())
        .min_by(|&a, &b| releases[a].total_cmp(&releases[b]))
        .unwrap();
    let bold = (0..releases.len())
        .max_by(|&a, &b| releases[a].total_cmp(&releases[b]))
        .unwrap();
    assert!(scores[cautious] >= scores[bold]);
}

#[test]
fn test_scores_on_uniform_sample() {
    let problem = release_problem();
    let samples = sample_uniform(&problem, 400, Some(6)).unwrap();
    let options = RobustnessOptions::default();

    let constraints =
        robustness(&samples, &problem, &RobustnessMethod::Constraints, &options).unwrap();
    let variance = robustness(&samples, &problem, &RobustnessMethod::Variance, &options).unwrap();
    let combined = robustness(&samples, &problem, &RobustnessMethod::Default, &options).unwrap();
    assert!(constraints > 0.0 && constraints < 1.0);
    assert!(variance < 0.0);
    assert!((combined - variance * (2.0 - constraints)).abs() < 1e-12);

    // Pollution crosses the threshold as release grows, so feasible points sit
    // at a finite distance from the nearest infeasible one
    let infogap = robustness(&samples, &problem, &RobustnessMethod::Infogap, &options).unwrap();
    assert!(infogap.is_finite() && infogap >= 0.0);

    let custom = RobustnessMethod::custom(|set, _| set.len() as f64);
    assert_eq!(robustness(&samples, &problem, &custom, &options).unwrap(), 400.0);
}

#[test]
fn test_sensitivity_of_named_objective() {
    let problem = release_problem();
    let options = SensitivityOptions {
        seed: Some(10),
        ..Default::default()
    };
    let result = compute_sensitivity(&problem, "pollution", 800, "sobol2007", &options)
        .unwrap()
        .into_standard()
        .unwrap();
    // 5 * 0.1 range for release against 0.2 * 1.0 for inflow
    assert_eq!(result.first_order.unwrap().top(), Some(0));
    assert_eq!(result.evaluations, 800);
}
