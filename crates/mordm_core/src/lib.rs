//! Many-objective robust decision making library
//!
//! This crate provides the analysis side of a MORDM workflow:
//! - Problem definitions evaluated in-process or by an external command
//! - Uniform and Latin hypercube sampling of the decision space
//! - Sensitivity analysis over a registry of Fourier, variance-based,
//!   screening and regression methods, normalized into one result shape
//! - Robustness scoring of sampled neighbourhoods around candidate solutions
//! - An optimizer boundary with an external-executable adapter and a simple
//!   in-process epsilon-archive search
//!
//! # Example
//!
//! ```ignore
//! use mordm_core::{ProblemBuilder, SensitivityOptions, compute_sensitivity};
//!
//! let problem = ProblemBuilder::new(2, 1)
//!     .function(|x: &[f64]| vec![x[0] + x[1]])
//!     .build()?;
//!
//! let output = compute_sensitivity(&problem, "f1", 1_000, "sobol2007", &SensitivityOptions::default())?;
//! for (name, value) in output.standard().unwrap().ranked_first_order() {
//!     println!("{name}: {value:.3}");
//! }
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod design;
pub mod error;
pub mod evaluate;
pub mod optimization;
pub mod robustness;
pub mod sensitivity;
pub mod stats;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod model;
pub mod problem;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use design::{SamplingScheme, sample_lhs, sample_uniform, scaled_design};
pub use error::{MordmError, ProblemError, Result};
pub use evaluate::{evaluate, evaluate_point};
pub use model::{Matrix, SampleRow, SampleSet};
pub use optimization::{
    EpsilonArchiveSearch, ExternalOptimizer, Optimizer, OptimizerSettings,
};
pub use problem::{CommandSpec, EvaluationTarget, Problem, ProblemBuilder};
pub use robustness::{
    RobustnessMethod, RobustnessOptions, Uncertainty, check_robustness, robustness,
};
pub use sensitivity::{
    ObjectiveSelector, SensitivityOptions, SensitivityOutput, StandardResult, compute_sensitivity,
};
