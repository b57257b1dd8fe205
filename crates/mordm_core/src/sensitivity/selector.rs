//! Choosing the scalar response a sensitivity analysis explains.

use std::fmt;
use std::sync::Arc;

use crate::error::{MordmError, Result};
use crate::model::{SampleRow, SampleSet};

/// Derives a scalar response from one evaluated row
pub type ResponseFn = Arc<dyn Fn(&SampleRow<'_>) -> f64 + Send + Sync>;

/// Which response of an evaluated [`SampleSet`] to analyze
#[derive(Clone)]
pub enum ObjectiveSelector {
    /// Column name; variables, then objectives, then constraints
    Name(String),
    /// Objective index
    Index(usize),
    /// Derived response computed per row
    Response(ResponseFn),
}

impl ObjectiveSelector {
    pub fn name(name: impl Into<String>) -> Self {
        ObjectiveSelector::Name(name.into())
    }

    pub fn response<F>(f: F) -> Self
    where
        F: Fn(&SampleRow<'_>) -> f64 + Send + Sync + 'static,
    {
        ObjectiveSelector::Response(Arc::new(f))
    }

    /// Extract the response vector, one value per row
    pub fn resolve(&self, samples: &SampleSet) -> Result<Vec<f64>> {
        match self {
            ObjectiveSelector::Name(name) => {
                samples
                    .column(name)
                    .ok_or_else(|| MordmError::UnknownColumn {
                        name: name.clone(),
                        available: samples.column_names(),
                    })
            }
            ObjectiveSelector::Index(i) => {
                if *i >= samples.objectives.cols() {
                    return Err(MordmError::UnsupportedInput(format!(
                        "objective index {i} out of range for {} objectives",
                        samples.objectives.cols()
                    )));
                }
                Ok(samples.objectives.column(*i))
            }
            ObjectiveSelector::Response(f) => Ok(samples.rows().map(|row| f(&row)).collect()),
        }
    }
}

impl fmt::Debug for ObjectiveSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectiveSelector::Name(name) => f.debug_tuple("Name").field(name).finish(),
            ObjectiveSelector::Index(i) => f.debug_tuple("Index").field(i).finish(),
            ObjectiveSelector::Response(_) => f.write_str("Response(..)"),
        }
    }
}

impl From<&str> for ObjectiveSelector {
    fn from(name: &str) -> Self {
        ObjectiveSelector::Name(name.to_string())
    }
}

impl From<usize> for ObjectiveSelector {
    fn from(index: usize) -> Self {
        ObjectiveSelector::Index(index)
    }
}
