//! YAML problem files
//!
//! ```yaml
//! variables:
//!   - { name: release, lower: 0.0, upper: 0.1 }
//!   - { name: inflow, lower: 0.0, upper: 1.0 }
//! objectives:
//!   - { name: benefit, maximize: true }
//!   - { name: pollution, epsilon: 0.05 }
//! constraints: [threshold]
//! command:
//!   program: python3
//!   args: [lake.py]
//! ```

use std::path::{Path, PathBuf};

use color_eyre::eyre::{WrapErr, eyre};
use mordm_core::problem::DEFAULT_EPSILON;
use mordm_core::{CommandSpec, Problem, ProblemBuilder, ProblemError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDef {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epsilon: Option<f64>,
    #[serde(default)]
    pub maximize: bool,
}

/// A problem evaluated by an external model command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemFile {
    pub variables: Vec<VariableDef>,
    pub objectives: Vec<ObjectiveDef>,
    #[serde(default)]
    pub constraints: Vec<String>,
    pub command: CommandSpec,
}

impl ProblemFile {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_saphyr::Error> {
        serde_saphyr::from_str(yaml)
    }

    pub fn load(path: &Path) -> color_eyre::Result<Self> {
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read problem file {}", path.display()))?;
        Self::from_yaml(&text)
            .map_err(|e| eyre!("Failed to parse problem file {}: {e}", path.display()))
    }

    /// Validate into a [`Problem`].
    ///
    /// A relative model working directory is resolved against `base_dir`,
    /// normally the directory holding the YAML file.
    pub fn build(&self, base_dir: Option<&Path>) -> Result<Problem, ProblemError> {
        let names = self
            .variables
            .iter()
            .map(|v| v.name.clone())
            .chain(self.objectives.iter().map(|o| o.name.clone()))
            .chain(self.constraints.iter().cloned());

        let mut command = self.command.clone();
        if let (Some(base), Some(dir)) = (base_dir, &command.working_dir)
            && dir.is_relative()
        {
            command.working_dir = Some(base.join(dir));
        }

        ProblemBuilder::new(self.variables.len(), self.objectives.len())
            .constraints(self.constraints.len())
            .bounds(self.variables.iter().map(|v| (v.lower, v.upper)).collect())
            .names(names)
            .epsilons(
                self.objectives
                    .iter()
                    .map(|o| o.epsilon.unwrap_or(DEFAULT_EPSILON))
                    .collect(),
            )
            .maximize_all(
                self.objectives
                    .iter()
                    .enumerate()
                    .filter(|(_, o)| o.maximize)
                    .map(|(i, _)| i),
            )
            .command(command)
            .build()
    }
}

/// Load and validate the problem at `path`
pub fn load_problem(path: &Path) -> color_eyre::Result<Problem> {
    let file = ProblemFile::load(path)?;
    let problem = file
        .build(path.parent())
        .wrap_err_with(|| format!("Invalid problem in {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        n_vars = problem.n_vars(),
        n_objs = problem.n_objs(),
        n_constrs = problem.n_constrs(),
        "loaded problem"
    );
    Ok(problem)
}

/// Get the default data directory path (~/.mordm/)
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mordm")
}
