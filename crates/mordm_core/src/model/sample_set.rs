//! Evaluated samples: variables, objectives and constraints row by row.

use serde::{Deserialize, Serialize};

use super::Matrix;

/// One evaluated row of a [`SampleSet`]
#[derive(Debug, Clone, Copy)]
pub struct SampleRow<'a> {
    pub variables: &'a [f64],
    pub objectives: &'a [f64],
    pub constraints: &'a [f64],
}

impl SampleRow<'_> {
    /// A row is feasible when every constraint value is exactly zero
    pub fn is_feasible(&self) -> bool {
        self.constraints.iter().all(|&c| c == 0.0)
    }
}

/// Which block of a [`SampleSet`] a column belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnBlock {
    Variables,
    Objectives,
    Constraints,
}

/// Output of an evaluation run.
///
/// Row `i` of every block describes the same evaluation. Objective columns
/// are already sign-corrected for maximized objectives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSet {
    pub variables: Matrix,
    pub objectives: Matrix,
    pub constraints: Option<Matrix>,
    pub variable_names: Vec<String>,
    pub objective_names: Vec<String>,
    pub constraint_names: Vec<String>,
}

impl SampleSet {
    /// Number of evaluated rows
    pub fn len(&self) -> usize {
        self.variables.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.rows() == 0
    }

    pub fn has_constraints(&self) -> bool {
        self.constraints.as_ref().is_some_and(|c| c.cols() > 0)
    }

    pub fn row(&self, i: usize) -> SampleRow<'_> {
        SampleRow {
            variables: self.variables.row(i),
            objectives: self.objectives.row(i),
            constraints: self.constraints.as_ref().map_or(&[], |c| c.row(i)),
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = SampleRow<'_>> {
        (0..self.len()).map(|i| self.row(i))
    }

    /// Locate a column by name.
    ///
    /// Variables are searched first, then objectives, then constraints; the
    /// first match wins.
    pub fn find_column(&self, name: &str) -> Option<(ColumnBlock, usize)> {
        if let Some(j) = self.variable_names.iter().position(|n| n == name) {
            return Some((ColumnBlock::Variables, j));
        }
        if let Some(j) = self.objective_names.iter().position(|n| n == name) {
            return Some((ColumnBlock::Objectives, j));
        }
        self.constraint_names
            .iter()
            .position(|n| n == name)
            .map(|j| (ColumnBlock::Constraints, j))
    }

    /// Copy out a column by name, following [`Self::find_column`] precedence
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let (block, j) = self.find_column(name)?;
        match block {
            ColumnBlock::Variables => Some(self.variables.column(j)),
            ColumnBlock::Objectives => Some(self.objectives.column(j)),
            ColumnBlock::Constraints => self.constraints.as_ref().map(|c| c.column(j)),
        }
    }

    /// All column names in search order
    pub fn column_names(&self) -> Vec<String> {
        self.variable_names
            .iter()
            .chain(&self.objective_names)
            .chain(&self.constraint_names)
            .cloned()
            .collect()
    }

    /// Count of rows with at least one non-zero constraint
    pub fn violation_count(&self) -> usize {
        self.rows().filter(|r| !r.is_feasible()).count()
    }
}
