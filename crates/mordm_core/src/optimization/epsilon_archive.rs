//! In-process search keeping an epsilon-box non-dominated archive.
//!
//! Objectives are compared after sign correction, so every objective is
//! minimized. Two solutions in different epsilon boxes are compared by box
//! index; two in the same box by raw objectives, then by distance to the
//! box corner.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Optimizer, OptimizerSettings};
use crate::design::{SamplingScheme, rng_from_seed, scale, unit_design};
use crate::error::{MordmError, Result};
use crate::evaluate::evaluate;
use crate::model::{Matrix, SampleSet};
use crate::problem::Problem;
use crate::robustness::{Uncertainty, perturb};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dominance {
    Dominates,
    Dominated,
    Equal,
    NonDominated,
}

fn compare(a: &[f64], b: &[f64]) -> Dominance {
    let mut better = false;
    let mut worse = false;
    for (x, y) in a.iter().zip(b) {
        if x < y {
            better = true;
        } else if x > y {
            worse = true;
        }
    }
    match (better, worse) {
        (true, false) => Dominance::Dominates,
        (false, true) => Dominance::Dominated,
        (false, false) => Dominance::Equal,
        (true, true) => Dominance::NonDominated,
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Member {
    variables: Vec<f64>,
    objectives: Vec<f64>,
    constraints: Vec<f64>,
    violation: f64,
}

/// Epsilon-box non-dominated archive.
///
/// Feasible solutions always displace infeasible ones; while nothing
/// feasible has been seen the archive holds the single least-violating
/// solution.
#[derive(Debug, Clone)]
pub struct EpsilonArchive {
    epsilons: Vec<f64>,
    members: Vec<Member>,
}

impl EpsilonArchive {
    pub fn new(epsilons: Vec<f64>) -> Self {
        Self {
            epsilons,
            members: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Variables of member `i`
    pub fn variables(&self, i: usize) -> &[f64] {
        &self.members[i].variables
    }

    fn boxes(&self, objectives: &[f64]) -> Vec<f64> {
        objectives
            .iter()
            .zip(&self.epsilons)
            .map(|(f, e)| (f / e).floor())
            .collect()
    }

    fn corner_distance(&self, objectives: &[f64]) -> f64 {
        objectives
            .iter()
            .zip(&self.epsilons)
            .map(|(f, e)| (f - (f / e).floor() * e).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    /// Offer a solution; returns whether it was archived
    pub fn insert(&mut self, variables: &[f64], objectives: &[f64], constraints: &[f64]) -> bool {
        let candidate = Member {
            variables: variables.to_vec(),
            objectives: objectives.to_vec(),
            constraints: constraints.to_vec(),
            violation: constraints.iter().map(|c| c.abs()).sum(),
        };

        if candidate.violation > 0.0 {
            match self.members.first() {
                Some(m) if m.violation == 0.0 || m.violation <= candidate.violation => {
                    return false;
                }
                _ => {
                    self.members.clear();
                    self.members.push(candidate);
                    return true;
                }
            }
        }
        if self.members.iter().any(|m| m.violation > 0.0) {
            self.members.clear();
        }

        let candidate_box = self.boxes(&candidate.objectives);
        let mut i = 0;
        while i < self.members.len() {
            let member_box = self.boxes(&self.members[i].objectives);
            match compare(&candidate_box, &member_box) {
                Dominance::Dominates => {
                    self.members.remove(i);
                }
                Dominance::Dominated => return false,
                Dominance::NonDominated => i += 1,
                Dominance::Equal => {
                    let keep_candidate =
                        match compare(&candidate.objectives, &self.members[i].objectives) {
                            Dominance::Dominates => true,
                            Dominance::Dominated | Dominance::Equal => false,
                            Dominance::NonDominated => {
                                self.corner_distance(&candidate.objectives)
                                    < self.corner_distance(&self.members[i].objectives)
                            }
                        };
                    if keep_candidate {
                        self.members[i] = candidate;
                    }
                    return keep_candidate;
                }
            }
        }
        self.members.push(candidate);
        true
    }

    /// Archive contents as a sample set with the problem's names
    pub fn to_sample_set(&self, problem: &Problem) -> SampleSet {
        let mut variables = Matrix::with_cols(problem.n_vars());
        let mut objectives = Matrix::with_cols(problem.n_objs());
        let mut constraints = Matrix::with_cols(problem.n_constrs());
        for m in &self.members {
            variables.push_row(&m.variables);
            objectives.push_row(&m.objectives);
            constraints.push_row(&m.constraints);
        }
        SampleSet {
            variables,
            objectives,
            constraints: (problem.n_constrs() > 0).then_some(constraints),
            variable_names: problem.variable_names().to_vec(),
            objective_names: problem.objective_names().to_vec(),
            constraint_names: problem.constraint_names().to_vec(),
        }
    }
}

/// Batch search: Latin hypercube exploration mixed with Gaussian mutation of
/// archive members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpsilonArchiveSearch {
    /// Evaluations per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Share of each batch drawn fresh from a Latin hypercube
    #[serde(default = "default_exploration")]
    pub exploration: f64,

    /// Mutation standard deviation relative to each bound range
    #[serde(default = "default_mutation_scale")]
    pub mutation_scale: f64,
}

fn default_batch_size() -> usize {
    100
}

fn default_exploration() -> f64 {
    0.2
}

fn default_mutation_scale() -> f64 {
    0.1
}

impl Default for EpsilonArchiveSearch {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            exploration: default_exploration(),
            mutation_scale: default_mutation_scale(),
        }
    }
}

impl Optimizer for EpsilonArchiveSearch {
    fn optimize(&self, problem: &Problem, settings: &OptimizerSettings) -> Result<SampleSet> {
        if !(0.0..=1.0).contains(&self.exploration) {
            return Err(MordmError::UnsupportedInput(format!(
                "exploration share must lie in [0, 1], got {}",
                self.exploration
            )));
        }

        let mut rng = rng_from_seed(settings.seed);
        let mut archive = EpsilonArchive::new(problem.epsilons().to_vec());
        let mutation = Uncertainty::Normal {
            relative_sd: self.mutation_scale,
        };
        let batch_size = self.batch_size.max(1);
        let report_every = settings.frequency.filter(|&f| f > 0);
        let mut next_report = report_every.unwrap_or(0);

        let mut used = 0;
        while used < settings.max_evaluations {
            let batch = batch_size.min(settings.max_evaluations - used);
            let n_explore = if archive.is_empty() {
                batch
            } else {
                ((batch as f64 * self.exploration).round() as usize).min(batch)
            };

            let unit = unit_design(
                n_explore,
                problem.n_vars(),
                SamplingScheme::LatinHypercube,
                &mut rng,
            );
            let mut design = scale(&unit, problem)?;
            for _ in n_explore..batch {
                let parent = rng.random_range(0..archive.len());
                let child = perturb(problem, archive.variables(parent), 1, mutation, &mut rng)?;
                design.push_row(child.row(0));
            }

            let samples = evaluate(&design, problem)?;
            for row in samples.rows() {
                archive.insert(row.variables, row.objectives, row.constraints);
            }
            used += batch;

            if let Some(every) = report_every
                && used >= next_report
            {
                tracing::info!(evaluations = used, archive = archive.len(), "search progress");
                next_report = used + every;
            }
        }

        tracing::debug!(evaluations = used, archive = archive.len(), "search finished");
        Ok(archive.to_sample_set(problem))
    }
}
