//! ---
//! dbb_section: "08-energy-models-optimization"
//! dbb_subsection: "module"
//! dbb_type: "source"
//! dbb_scope: "code"
//! dbb_description: "Coupler loading estimation and busbar split optimisation routines."
//! dbb_version: "v0.1.0"
//! dbb_owner: "tbd"
//! ---
use nalgebra::DMatrix;

use crate::{
    errors::{EngineError, Result},
    model::{Configuration, SampleSeries},
};

/// Compute the coupler apparent power for every (sample, configuration) pair.
///
/// With `P` and `Q` as T x N measurement matrices and `C` the N x C 0/1
/// configuration matrix, the coupler flows are the contractions `P * C` and
/// `Q * C`: for each sample, the total active/reactive power of the bays on
/// busbar "1", which is what the coupler must carry to balance the other
/// side under the idealized two-busbar model. Apparent power follows
/// elementwise as `sqrt(p^2 + q^2)`, giving the returned T x C matrix.
/// The computation is pure and bit-for-bit reproducible.
pub fn evaluate_coupler(
    series: &SampleSeries,
    configs: &[Configuration],
) -> Result<DMatrix<f64>> {
    let n = series.bay_count();
    for config in configs {
        if config.len() != n {
            return Err(EngineError::ShapeMismatch {
                config_len: config.len(),
                bay_count: n,
            });
        }
    }

    let samples = series.sample_count();
    let p = DMatrix::from_fn(samples, n, |row, col| series.p[row][col]);
    let q = DMatrix::from_fn(samples, n, |row, col| series.q[row][col]);
    let assignment = DMatrix::from_fn(n, configs.len(), |row, col| {
        f64::from(configs[col].bits()[row])
    });

    let coupled_p = &p * &assignment;
    let coupled_q = &q * &assignment;
    Ok(coupled_p.zip_map(&coupled_q, |cp, cq| cp.hypot(cq)))
}
