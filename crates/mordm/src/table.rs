//! Whitespace tables on stdin/stdout files

use color_eyre::eyre::{Result, bail};
use mordm_core::{Matrix, SampleSet, StandardResult};

/// Parse a whitespace table, keeping the first `cols` values of each row.
///
/// Blank lines and lines starting with `#` are skipped, so files written by
/// [`render_samples`] can be read back as designs or candidates.
pub fn parse_table(text: &str, cols: usize) -> Result<Matrix> {
    let mut matrix = Matrix::with_cols(cols);
    for (i, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let values = trimmed
            .split_whitespace()
            .map(|tok| tok.parse::<f64>())
            .collect::<Result<Vec<f64>, _>>();
        let Ok(values) = values else {
            bail!("line {}: expected numbers, got '{trimmed}'", i + 1);
        };
        if values.len() < cols {
            bail!("line {}: expected at least {cols} values, got {}", i + 1, values.len());
        }
        matrix.push_row(&values[..cols]);
    }
    Ok(matrix)
}

fn join(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// One row per sample: variables, objectives, then constraints
pub fn render_samples(set: &SampleSet) -> String {
    let mut out = format!("# {}\n", set.column_names().join(" "));
    for row in set.rows() {
        let mut values = Vec::with_capacity(
            row.variables.len() + row.objectives.len() + row.constraints.len(),
        );
        values.extend_from_slice(row.variables);
        values.extend_from_slice(row.objectives);
        values.extend_from_slice(row.constraints);
        out.push_str(&join(&values));
        out.push('\n');
    }
    out
}

/// One row per variable, in variable order
pub fn render_sensitivity(result: &StandardResult) -> String {
    let mut out = format!(
        "# method {} ({} evaluations)\n# variable first first_rank",
        result.method, result.evaluations
    );
    let first_ci = result
        .first_order
        .as_ref()
        .is_some_and(|s| s.confidence.is_some());
    if first_ci {
        out.push_str(" first_min first_max");
    }
    if let Some(total) = &result.total_order {
        out.push_str(" total total_rank");
        if total.confidence.is_some() {
            out.push_str(" total_min total_max");
        }
    }
    out.push('\n');

    for (j, name) in result.variable_names.iter().enumerate() {
        out.push_str(name);
        for summary in [&result.first_order, &result.total_order].into_iter().flatten() {
            let rank = summary.rank.iter().position(|&v| v == j).unwrap_or(j) + 1;
            out.push_str(&format!(" {:.6} {rank}", summary.values[j]));
            if let Some((lo, hi)) = summary.confidence.as_ref().map(|ci| ci[j]) {
                out.push_str(&format!(" {lo:.6} {hi:.6}"));
            }
        }
        out.push('\n');
    }
    out
}
