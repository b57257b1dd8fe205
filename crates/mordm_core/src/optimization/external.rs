//! Delegating the search to an external optimizer executable.

use std::path::PathBuf;
use std::process::Command;

use serde::{Deserialize, Serialize};

use super::{Optimizer, OptimizerSettings};
use crate::error::{MordmError, Result};
use crate::evaluate::assemble;
use crate::model::{Matrix, SampleSet};
use crate::problem::{EvaluationTarget, Problem};

/// External optimizer invocation.
///
/// The executable is called as
/// `exe -n NFE -v NVARS -o NOBJS -c NCONSTRS -l L1,L2,.. -u U1,U2,..
/// -e E1,E2,.. -f OUTPUT [-F FREQ] EXTRA.. MODEL MODEL_ARGS..`
/// and must write the final solutions to `OUTPUT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalOptimizer {
    pub executable: PathBuf,
    pub output_path: PathBuf,
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn join(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

impl ExternalOptimizer {
    pub fn new(executable: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            output_path: output_path.into(),
            extra_args: Vec::new(),
        }
    }

    pub fn extra_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Command-line arguments for `problem`
    pub fn arguments(&self, problem: &Problem, settings: &OptimizerSettings) -> Result<Vec<String>> {
        let EvaluationTarget::External(model) = problem.target() else {
            return Err(MordmError::UnsupportedInput(
                "an external optimizer needs a problem evaluated by an external command".into(),
            ));
        };

        let mut args = vec![
            "-n".to_string(),
            settings.max_evaluations.to_string(),
            "-v".into(),
            problem.n_vars().to_string(),
            "-o".into(),
            problem.n_objs().to_string(),
            "-c".into(),
            problem.n_constrs().to_string(),
            "-l".into(),
            join(problem.lower_bounds()),
            "-u".into(),
            join(problem.upper_bounds()),
            "-e".into(),
            join(problem.epsilons()),
            "-f".into(),
            self.output_path.display().to_string(),
        ];
        if let Some(frequency) = settings.frequency {
            args.push("-F".into());
            args.push(frequency.to_string());
        }
        args.extend(self.extra_args.iter().cloned());
        args.extend(model.command_line());
        Ok(args)
    }
}

impl Optimizer for ExternalOptimizer {
    fn optimize(&self, problem: &Problem, settings: &OptimizerSettings) -> Result<SampleSet> {
        let args = self.arguments(problem, settings)?;
        tracing::debug!(executable = %self.executable.display(), ?args, "running external optimizer");

        let mut command = Command::new(&self.executable);
        command.args(&args);
        if let EvaluationTarget::External(model) = problem.target()
            && let Some(dir) = &model.working_dir
        {
            command.current_dir(dir);
        }

        let status = command.status()?;
        if !status.success() {
            return Err(MordmError::ProcessFailed {
                program: self.executable.display().to_string(),
                status: status.to_string(),
            });
        }

        let text = std::fs::read_to_string(&self.output_path)?;
        parse_result_file(&text, problem)
    }
}

/// Parse an optimizer result file.
///
/// Each non-comment line holds the variables followed by the objectives and,
/// optionally, the constraints of one solution. Lines starting with `#` or
/// `//` and blank lines are skipped. Missing constraint columns read as
/// satisfied.
pub fn parse_result_file(text: &str, problem: &Problem) -> Result<SampleSet> {
    let (n_vars, n_outputs) = (problem.n_vars(), problem.n_outputs());
    let full = n_vars + n_outputs;
    let short = n_vars + problem.n_objs();

    let mut variables = Matrix::with_cols(n_vars);
    let mut responses = Matrix::with_cols(n_outputs);
    let mut row = vec![0.0; n_outputs];
    for (i, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
            continue;
        }

        let values = trimmed
            .split_whitespace()
            .map(|tok| {
                tok.parse::<f64>().map_err(|_| MordmError::ProtocolViolation {
                    line: i + 1,
                    reason: format!("'{tok}' is not a number"),
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        if values.len() != full && values.len() != short {
            return Err(MordmError::ProtocolViolation {
                line: i + 1,
                reason: format!("expected {full} or {short} values, got {}", values.len()),
            });
        }

        variables.push_row(&values[..n_vars]);
        row.fill(0.0);
        row[..values.len() - n_vars].copy_from_slice(&values[n_vars..]);
        responses.push_row(&row);
    }

    Ok(assemble(variables, &responses, problem))
}
