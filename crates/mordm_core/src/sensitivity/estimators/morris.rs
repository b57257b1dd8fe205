//! Morris elementary effects screening.

use rand::rngs::SmallRng;

use super::check_response;
use crate::error::{MordmError, Result};
use crate::model::Matrix;
use crate::sensitivity::{DesignPlan, NativeOutput, SensitivityOptions};
use crate::stats::{mean, std_dev};

pub(crate) fn estimate(
    plan: &DesignPlan,
    y: &[f64],
    _options: &SensitivityOptions,
    _rng: &mut SmallRng,
) -> Result<NativeOutput> {
    check_response(plan, y)?;
    let d = plan.n_vars();
    let r = plan.base_size;
    let mut ee = Matrix::zeros(r, d);

    for t in 0..r {
        for s in 0..d {
            let a = t * (d + 1) + s;
            let (xa, xb) = (plan.unit.row(a), plan.unit.row(a + 1));
            // The only column that changes between consecutive points
            let Some((j, step)) = xa
                .iter()
                .zip(xb)
                .map(|(p, q)| q - p)
                .enumerate()
                .max_by(|(_, p), (_, q)| p.abs().total_cmp(&q.abs()))
            else {
                continue;
            };
            if step == 0.0 {
                return Err(MordmError::InvalidDesign {
                    method: "morris".into(),
                    reason: format!("trajectory {t} does not move at step {s}"),
                });
            }
            ee.set(t, j, (y[a + 1] - y[a]) / step);
        }
    }

    let mut mu = Vec::with_capacity(d);
    let mut mu_star = Vec::with_capacity(d);
    let mut sigma = Vec::with_capacity(d);
    for j in 0..d {
        let effects = ee.column(j);
        let abs: Vec<f64> = effects.iter().map(|e| e.abs()).collect();
        mu.push(mean(&effects));
        mu_star.push(mean(&abs));
        sigma.push(std_dev(&effects));
    }

    Ok(NativeOutput::Morris {
        ee,
        mu,
        mu_star,
        sigma,
    })
}
