//! Problem evaluation.
//!
//! Every sampling and analysis operation funnels through [`evaluate`], which
//! maps a design matrix (one row per point, already scaled into the problem
//! bounds) to a [`SampleSet`]. Row `i` of the output always corresponds to
//! row `i` of the design.
//!
//! External programs speak a line protocol: each input row is written as
//! space-separated values, followed by one empty line marking end of input.
//! The program answers with one line per row holding `n_objs + n_constrs`
//! space-separated numbers, in input order.

use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{MordmError, Result};
use crate::model::{Matrix, SampleSet};
use crate::problem::{CommandSpec, EvaluationTarget, Problem, ProblemFunction};

/// Evaluate every row of `design` against `problem`
pub fn evaluate(design: &Matrix, problem: &Problem) -> Result<SampleSet> {
    if design.cols() != problem.n_vars() {
        return Err(MordmError::DimensionMismatch {
            context: "design columns",
            expected: problem.n_vars(),
            actual: design.cols(),
        });
    }

    let responses = match problem.target() {
        EvaluationTarget::InProcess(f) => {
            tracing::debug!(rows = design.rows(), "evaluating in-process");
            evaluate_in_process(design, f, problem.n_outputs())?
        }
        EvaluationTarget::External(cmd) => {
            tracing::debug!(rows = design.rows(), program = %cmd.program, "evaluating externally");
            evaluate_external(design, cmd, problem.n_outputs())?
        }
    };

    Ok(assemble(design.clone(), &responses, problem))
}

/// Evaluate a single point
pub fn evaluate_point(point: &[f64], problem: &Problem) -> Result<SampleSet> {
    let design = Matrix::from_data(1, point.len(), point.to_vec()).ok_or_else(|| {
        MordmError::UnsupportedInput("point could not be shaped into a design".into())
    })?;
    evaluate(&design, problem)
}

/// Split responses into objective/constraint blocks, fix signs and attach names
pub(crate) fn assemble(variables: Matrix, responses: &Matrix, problem: &Problem) -> SampleSet {
    let n_objs = problem.n_objs();
    let obj_cols: Vec<usize> = (0..n_objs).collect();
    let mut objectives = responses.select_columns(&obj_cols);
    for i in 0..objectives.rows() {
        let row = objectives.row_mut(i);
        for &j in problem.maximize() {
            row[j] = -row[j];
        }
    }

    let constraints = (problem.n_constrs() > 0).then(|| {
        let cols: Vec<usize> = (n_objs..problem.n_outputs()).collect();
        responses.select_columns(&cols)
    });

    SampleSet {
        variables,
        objectives,
        constraints,
        variable_names: problem.variable_names().to_vec(),
        objective_names: problem.objective_names().to_vec(),
        constraint_names: problem.constraint_names().to_vec(),
    }
}

fn evaluate_in_process(design: &Matrix, f: &ProblemFunction, n_outputs: usize) -> Result<Matrix> {
    let rows: Vec<&[f64]> = design.iter_rows().collect();

    #[cfg(feature = "parallel")]
    let outputs: Vec<Vec<f64>> = rows.par_iter().map(|&row| f(row)).collect();
    #[cfg(not(feature = "parallel"))]
    let outputs: Vec<Vec<f64>> = rows.iter().map(|&row| f(row)).collect();

    let mut responses = Matrix::with_cols(n_outputs);
    for output in &outputs {
        if !responses.push_row(output) {
            return Err(MordmError::DimensionMismatch {
                context: "response",
                expected: n_outputs,
                actual: output.len(),
            });
        }
    }
    Ok(responses)
}

/// Format one design row for the evaluation protocol
pub(crate) fn format_row(row: &[f64]) -> String {
    row.iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse one protocol output line into exactly `expected` numbers
pub(crate) fn parse_line(line: &str, line_no: usize, expected: usize) -> Result<Vec<f64>> {
    let values = line
        .split_whitespace()
        .map(|tok| {
            tok.parse::<f64>().map_err(|_| MordmError::ProtocolViolation {
                line: line_no,
                reason: format!("'{tok}' is not a number"),
            })
        })
        .collect::<Result<Vec<f64>>>()?;

    if values.len() != expected {
        return Err(MordmError::ProtocolViolation {
            line: line_no,
            reason: format!("expected {expected} values, got {}", values.len()),
        });
    }
    Ok(values)
}

fn evaluate_external(design: &Matrix, cmd: &CommandSpec, n_outputs: usize) -> Result<Matrix> {
    let mut command = Command::new(&cmd.program);
    command
        .args(&cmd.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit());
    if let Some(dir) = &cmd.working_dir {
        command.current_dir(dir);
    }

    let mut child = command.spawn()?;
    let (Some(mut stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
        return Err(MordmError::UnsupportedInput(
            "external process pipes unavailable".into(),
        ));
    };

    let mut input = String::new();
    for row in design.iter_rows() {
        input.push_str(&format_row(row));
        input.push('\n');
    }
    input.push('\n');

    // Write on a separate thread so a chatty child cannot deadlock on a full stdout pipe
    let read_result = std::thread::scope(|scope| {
        let writer = scope.spawn(move || {
            let result = stdin.write_all(input.as_bytes()).and_then(|_| stdin.flush());
            drop(stdin);
            result
        });

        let read = read_responses(BufReader::new(stdout), design.rows(), n_outputs);
        let written = writer
            .join()
            .unwrap_or_else(|_| Err(std::io::Error::other("writer thread panicked")));
        (read, written)
    });

    let status = child.wait()?;
    let (responses, written) = read_result;
    let responses = responses?;
    // A child may legitimately close stdin early once it has answered every row
    if let Err(e) = written
        && e.kind() != std::io::ErrorKind::BrokenPipe
    {
        return Err(e.into());
    }
    if !status.success() {
        return Err(MordmError::ProcessFailed {
            program: cmd.program.clone(),
            status: status.to_string(),
        });
    }
    Ok(responses)
}

fn read_responses<R: BufRead>(reader: R, n_rows: usize, n_outputs: usize) -> Result<Matrix> {
    let mut responses = Matrix::with_cols(n_outputs);
    let mut lines = reader.lines();
    for line_no in 1..=n_rows {
        let line = match lines.next() {
            Some(line) => line?,
            None => {
                return Err(MordmError::ProtocolViolation {
                    line: line_no,
                    reason: format!("output ended after {} of {n_rows} rows", line_no - 1),
                });
            }
        };
        let values = parse_line(&line, line_no, n_outputs)?;
        responses.push_row(&values);
    }
    Ok(responses)
}
