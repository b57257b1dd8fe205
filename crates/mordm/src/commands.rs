//! Subcommands of the `mordm` binary
//!
//! Every command loads a YAML problem file, runs one library operation and
//! renders the result as a whitespace table or, with `--json`, as JSON.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand, ValueEnum};
use color_eyre::eyre::{Result, WrapErr};
use mordm_core::optimization::EpsilonArchiveSearch;
use mordm_core::sensitivity::{MorrisOptions, SensitivityOutput};
use mordm_core::{
    ExternalOptimizer, ObjectiveSelector, OptimizerSettings, RobustnessMethod, RobustnessOptions,
    SampleSet, SamplingScheme, SensitivityOptions, Uncertainty, check_robustness,
    compute_sensitivity, evaluate, scaled_design,
};
use serde::Serialize;

use crate::config::load_problem;
use crate::table::{parse_table, render_samples, render_sensitivity};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Draw and evaluate a design over the problem bounds
    Sample(SampleArgs),
    /// Evaluate the design rows in a file
    Evaluate(EvaluateArgs),
    /// Rank decision variables by their influence on one response
    Sensitivity(SensitivityArgs),
    /// Score candidate solutions under perturbation
    Robustness(RobustnessArgs),
    /// Approximate the Pareto set
    Optimize(OptimizeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SampleArgs {
    /// YAML problem file
    pub problem: PathBuf,

    #[arg(short = 'n', long, default_value_t = 100)]
    pub samples: usize,

    /// Sampling scheme (lhs, uniform)
    #[arg(long, default_value = "lhs")]
    pub scheme: SamplingScheme,

    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// YAML problem file
    pub problem: PathBuf,

    /// Whitespace table whose first columns are the decision variables
    pub design: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct SensitivityArgs {
    /// YAML problem file
    pub problem: PathBuf,

    #[arg(short, long, default_value = "sobol2007")]
    pub method: String,

    /// Column name to analyze; the first objective when omitted
    #[arg(short, long)]
    pub response: Option<String>,

    /// Target number of model evaluations
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub samples: usize,

    /// Bootstrap resamples for confidence intervals
    #[arg(long, default_value_t = 0)]
    pub nboot: usize,

    #[arg(long, default_value_t = 0.95)]
    pub conf: f64,

    /// Rank-transform the data for src and pcc
    #[arg(long)]
    pub rank: bool,

    #[arg(long, default_value_t = 4)]
    pub morris_levels: usize,

    #[arg(long, default_value_t = 2)]
    pub grid_jump: usize,

    /// Print the estimator output instead of the normalized indices
    #[arg(long)]
    pub raw: bool,

    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distribution {
    Normal,
    Uniform,
}

#[derive(Args, Debug, Clone)]
pub struct RobustnessArgs {
    /// YAML problem file
    pub problem: PathBuf,

    /// Whitespace table whose first columns are candidate decision variables
    pub candidates: PathBuf,

    /// Scoring method (variance, constraints, distance, infogap, default)
    #[arg(short, long, default_value = "default")]
    pub method: String,

    /// Perturbed evaluations per candidate
    #[arg(short = 'n', long, default_value_t = 100)]
    pub samples: usize,

    #[arg(long, value_enum, default_value_t = Distribution::Normal)]
    pub distribution: Distribution,

    /// Perturbation size relative to each bound range
    #[arg(long, default_value_t = 0.05)]
    pub spread: f64,

    /// Per-objective weights for the variance score
    #[arg(long, value_delimiter = ',')]
    pub weights: Option<Vec<f64>>,

    /// Objective-space reference point for the distance score
    #[arg(long, value_delimiter = ',')]
    pub reference: Option<Vec<f64>>,

    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct OptimizeArgs {
    /// YAML problem file
    pub problem: PathBuf,

    /// External optimizer executable; the built-in epsilon-archive search when omitted
    #[arg(long)]
    pub optimizer: Option<PathBuf>,

    /// Result file the external optimizer writes
    #[arg(long, default_value = "optimizer_result.txt")]
    pub result_file: PathBuf,

    /// Extra arguments passed to the external optimizer before the model command
    #[arg(long = "optimizer-arg", allow_hyphen_values = true)]
    pub optimizer_args: Vec<String>,

    /// Evaluation budget
    #[arg(short = 'n', long, default_value_t = 10_000)]
    pub evaluations: usize,

    /// Evaluations between progress reports
    #[arg(long)]
    pub frequency: Option<usize>,

    #[arg(long)]
    pub seed: Option<u64>,
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value).wrap_err("Failed to serialize output")?;
    text.push('\n');
    Ok(text)
}

fn render(set: &SampleSet, json: bool) -> Result<String> {
    if json {
        to_json(set)
    } else {
        Ok(render_samples(set))
    }
}

fn read_table(path: &Path, cols: usize) -> Result<mordm_core::Matrix> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    parse_table(&text, cols).wrap_err_with(|| format!("Malformed table {}", path.display()))
}

/// Run `command`, returning what should be printed
pub fn run(command: &Command, json: bool) -> Result<String> {
    match command {
        Command::Sample(args) => sample(args, json),
        Command::Evaluate(args) => evaluate_design(args, json),
        Command::Sensitivity(args) => sensitivity(args, json),
        Command::Robustness(args) => robustness(args, json),
        Command::Optimize(args) => optimize(args, json),
    }
}

pub fn sample(args: &SampleArgs, json: bool) -> Result<String> {
    let problem = load_problem(&args.problem)?;
    let design = scaled_design(&problem, args.samples, args.scheme, args.seed)?;
    let set = evaluate(&design, &problem)?;
    tracing::info!(rows = set.len(), scheme = %args.scheme, "sampled problem");
    render(&set, json)
}

pub fn evaluate_design(args: &EvaluateArgs, json: bool) -> Result<String> {
    let problem = load_problem(&args.problem)?;
    let design = read_table(&args.design, problem.n_vars())?;
    let set = evaluate(&design, &problem)?;
    render(&set, json)
}

pub fn sensitivity(args: &SensitivityArgs, json: bool) -> Result<String> {
    let problem = load_problem(&args.problem)?;
    let selector = match &args.response {
        Some(name) => ObjectiveSelector::from(name.as_str()),
        None => ObjectiveSelector::from(0usize),
    };
    let options = SensitivityOptions {
        seed: args.seed,
        raw: args.raw,
        nboot: args.nboot,
        conf: args.conf,
        rank: args.rank,
        morris: MorrisOptions {
            levels: args.morris_levels,
            grid_jump: args.grid_jump,
        },
        ..Default::default()
    };

    let output = compute_sensitivity(&problem, selector, args.samples, &args.method, &options)?;
    match output {
        SensitivityOutput::Standard(result) if !json => Ok(render_sensitivity(&result)),
        // The raw outputs differ per method, so they are always printed as JSON
        other => to_json(&other),
    }
}

pub fn robustness(args: &RobustnessArgs, json: bool) -> Result<String> {
    let problem = load_problem(&args.problem)?;
    let method: RobustnessMethod = args.method.parse()?;
    let candidates = read_table(&args.candidates, problem.n_vars())?;
    let uncertainty = match args.distribution {
        Distribution::Normal => Uncertainty::Normal {
            relative_sd: args.spread,
        },
        Distribution::Uniform => Uncertainty::Uniform {
            relative_radius: args.spread,
        },
    };
    let options = RobustnessOptions {
        weights: args.weights.clone(),
        reference_point: args.reference.clone(),
        original_point: None,
        seed: args.seed,
    };

    let scores = check_robustness(
        &problem,
        &candidates,
        args.samples,
        uncertainty,
        &method,
        &options,
    )?;

    if json {
        return to_json(&scores);
    }
    let mut out = format!("# {} {method}\n", problem.variable_names().join(" "));
    for (row, score) in candidates.iter_rows().zip(&scores) {
        let values: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        out.push_str(&format!("{} {score}\n", values.join(" ")));
    }
    Ok(out)
}

pub fn optimize(args: &OptimizeArgs, json: bool) -> Result<String> {
    let problem = load_problem(&args.problem)?;
    let settings = OptimizerSettings {
        max_evaluations: args.evaluations,
        frequency: args.frequency,
        seed: args.seed,
    };

    let pareto = match &args.optimizer {
        Some(executable) => {
            let mut optimizer = ExternalOptimizer::new(executable, &args.result_file);
            for arg in &args.optimizer_args {
                optimizer = optimizer.extra_arg(arg);
            }
            problem
                .optimize(&optimizer, &settings)
                .wrap_err_with(|| format!("Optimizer {} failed", executable.display()))?
        }
        None => problem.optimize(&EpsilonArchiveSearch::default(), &settings)?,
    };
    render(&pareto, json)
}
