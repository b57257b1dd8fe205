//! Command-line front end for many-objective robust decision making
//!
//! Problems are described in YAML files (see [`config`]) and evaluated by an
//! external model command. The binary exposes sampling, evaluation,
//! sensitivity analysis, robustness checking and optimization as subcommands.

#![warn(clippy::all)]

pub mod commands;
pub mod config;
mod logging;
pub mod table;

pub use commands::{Command, run};
pub use config::{ProblemFile, default_data_dir, load_problem};
pub use logging::init_logging;
