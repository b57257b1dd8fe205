//! End-to-end runs of the subcommands against a shell model
#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};

use mordm::commands::{
    Distribution, EvaluateArgs, OptimizeArgs, RobustnessArgs, SampleArgs, SensitivityArgs,
};
use mordm::{Command, run};
use mordm_core::{SampleSet, SamplingScheme};
use tempfile::TempDir;

// Objectives x1 + 3 x2 and x1 * x2, constraint violated once x1 exceeds 0.8
const PROBLEM: &str = r#"
variables:
  - { name: x1, lower: 0.0, upper: 1.0 }
  - { name: x2, lower: 0.0, upper: 1.0 }
objectives:
  - { name: cost }
  - { name: yield, maximize: true }
constraints: [limit]
command:
  program: sh
  args:
    - "-c"
    - "awk 'NF == 0 { exit } { print $1 + 3 * $2, $1 * $2, ($1 > 0.8 ? $1 - 0.8 : 0) }'"
"#;

fn workspace() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let problem = dir.path().join("problem.yaml");
    fs::write(&problem, PROBLEM).unwrap();
    (dir, problem)
}

fn data_rows(text: &str) -> Vec<Vec<f64>> {
    text.lines()
        .filter(|l| !l.starts_with('#'))
        .map(|l| l.split_whitespace().map(|v| v.parse().unwrap()).collect())
        .collect()
}

fn sensitivity_args(problem: &Path, method: &str) -> SensitivityArgs {
    SensitivityArgs {
        problem: problem.to_path_buf(),
        method: method.into(),
        response: Some("cost".into()),
        samples: 400,
        nboot: 0,
        conf: 0.95,
        rank: false,
        morris_levels: 4,
        grid_jump: 2,
        raw: false,
        seed: Some(7),
    }
}

#[test]
fn test_sample_table_and_json() {
    let (_dir, problem) = workspace();
    let args = SampleArgs {
        problem: problem.clone(),
        samples: 20,
        scheme: SamplingScheme::LatinHypercube,
        seed: Some(1),
    };

    let text = run(&Command::Sample(args.clone()), false).unwrap();
    assert!(text.starts_with("# x1 x2 cost yield limit\n"));
    let rows = data_rows(&text);
    assert_eq!(rows.len(), 20);
    for row in &rows {
        assert_eq!(row.len(), 5);
        assert!((row[2] - (row[0] + 3.0 * row[1])).abs() < 1e-4);
        // yield is maximized, so it is reported negated
        assert!(row[3] <= 0.0);
    }

    let json = run(&Command::Sample(args), true).unwrap();
    let set: SampleSet = serde_json::from_str(&json).unwrap();
    assert_eq!(set.len(), 20);
    assert_eq!(set.objective_names, ["cost", "yield"]);
}

#[test]
fn test_evaluate_reads_sample_output() {
    let (dir, problem) = workspace();
    let design = dir.path().join("design.txt");
    fs::write(&design, "# x1 x2\n0.5 0.25\n0.9 0.0 7.5 -1\n").unwrap();

    let text = run(
        &Command::Evaluate(EvaluateArgs {
            problem,
            design,
        }),
        false,
    )
    .unwrap();
    let rows = data_rows(&text);
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][2..], &[1.25, -0.125, 0.0]);
    assert_eq!(rows[1][2], 0.9);
    assert!((rows[1][4] - 0.1).abs() < 1e-9);
}

#[test]
fn test_sensitivity_ranks_dominant_variable() {
    let (_dir, problem) = workspace();
    let text = run(&Command::Sensitivity(sensitivity_args(&problem, "src")), false).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with("# method src"));
    let x2: Vec<&str> = lines[3].split_whitespace().collect();
    assert_eq!(x2[0], "x2");
    assert_eq!(x2[2], "1");

    let mut raw = sensitivity_args(&problem, "morris");
    raw.raw = true;
    let json = run(&Command::Sensitivity(raw), false).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["output"], "raw");

    let err = run(&Command::Sensitivity(sensitivity_args(&problem, "sobol9")), false).unwrap_err();
    assert!(err.to_string().contains("soboljansen"));
}

#[test]
fn test_robustness_scores_candidates() {
    let (dir, problem) = workspace();
    let candidates = dir.path().join("candidates.txt");
    fs::write(&candidates, "0.1 0.5\n0.8 0.5\n").unwrap();

    let args = RobustnessArgs {
        problem,
        candidates,
        method: "constraints".into(),
        samples: 60,
        distribution: Distribution::Uniform,
        spread: 0.05,
        weights: None,
        reference: None,
        seed: Some(3),
    };
    let json = run(&Command::Robustness(args.clone()), true).unwrap();
    let scores: Vec<f64> = serde_json::from_str(&json).unwrap();
    assert_eq!(scores[0], 1.0);
    assert!(scores[1] < 1.0);

    let text = run(&Command::Robustness(args.clone()), false).unwrap();
    assert!(text.starts_with("# x1 x2 constraints\n"));
    assert_eq!(data_rows(&text).len(), 2);

    let unknown = RobustnessArgs {
        method: "regret".into(),
        ..args
    };
    let err = run(&Command::Robustness(unknown), false).unwrap_err();
    assert!(err.to_string().contains("infogap"));
}

#[test]
fn test_optimize_builtin_and_external() {
    let (dir, problem) = workspace();
    let builtin = OptimizeArgs {
        problem: problem.clone(),
        optimizer: None,
        result_file: dir.path().join("unused.txt"),
        optimizer_args: Vec::new(),
        evaluations: 300,
        frequency: None,
        seed: Some(4),
    };
    let json = run(&Command::Optimize(builtin.clone()), true).unwrap();
    let pareto: SampleSet = serde_json::from_str(&json).unwrap();
    assert!(!pareto.is_empty());
    assert_eq!(pareto.violation_count(), 0);

    // Fake optimizer: writes two solutions to the path following -f
    let exe = dir.path().join("optimizer.sh");
    fs::write(
        &exe,
        "#!/bin/sh\nwhile [ \"$1\" != \"-f\" ]; do shift; done\nprintf '0 0 0 0 0\\n0.5 0.5 2 0.25 0\\n' > \"$2\"\n",
    )
    .unwrap();
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();
    }
    let external = OptimizeArgs {
        optimizer: Some(exe),
        result_file: dir.path().join("result.txt"),
        optimizer_args: vec!["-s".into(), "9".into()],
        ..builtin
    };
    let text = run(&Command::Optimize(external), false).unwrap();
    let rows = data_rows(&text);
    assert_eq!(rows, vec![vec![0.0, 0.0, 0.0, 0.0, 0.0], vec![0.5, 0.5, 2.0, -0.25, 0.0]]);
}

#[test]
fn test_missing_problem_file() {
    let dir = tempfile::tempdir().unwrap();
    let args = SampleArgs {
        problem: dir.path().join("absent.yaml"),
        samples: 5,
        scheme: SamplingScheme::Uniform,
        seed: None,
    };
    let err = run(&Command::Sample(args), false).unwrap_err();
    assert!(format!("{err:?}").contains("absent.yaml"));
}
