//! Per-method index estimators.
//!
//! Each estimator takes the unit-cube [`DesignPlan`] a method built and the
//! response vector evaluated from it, and returns the method's
//! [`NativeOutput`](super::NativeOutput). Estimators know nothing about problems or selectors.

pub mod fast;
pub mod morris;
pub mod regression;
pub mod variance;

use super::DesignPlan;
use crate::error::{MordmError, Result};

/// Ensure one response per design row
pub(crate) fn check_response(plan: &DesignPlan, y: &[f64]) -> Result<()> {
    if y.len() != plan.unit.rows() {
        return Err(MordmError::DimensionMismatch {
            context: "response",
            expected: plan.unit.rows(),
            actual: y.len(),
        });
    }
    Ok(())
}
