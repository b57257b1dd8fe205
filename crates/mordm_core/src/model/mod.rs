//! Core value types shared across sampling, evaluation and analysis

mod matrix;
mod sample_set;

pub use matrix::Matrix;
pub use sample_set::{ColumnBlock, SampleRow, SampleSet};
