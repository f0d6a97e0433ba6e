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

use crate::model::{Configuration, ConfigurationScore, RankedConfiguration};

/// Reduce the T x C apparent-power matrix to one (mean, max) score per
/// configuration and sort ascending: mean first, max second, and as the
/// explicit final tie-break the configuration bit vector in lexicographic
/// order. The resulting order is a strict total order, so repeated runs over
/// the same inputs produce byte-identical tables. A matrix with zero sample
/// rows ranks nothing.
pub fn rank_configurations(
    s: &DMatrix<f64>,
    configs: &[Configuration],
) -> Vec<RankedConfiguration> {
    debug_assert_eq!(s.ncols(), configs.len());
    if s.nrows() == 0 {
        return Vec::new();
    }

    let mut rows: Vec<RankedConfiguration> = configs
        .iter()
        .enumerate()
        .map(|(idx, config)| {
            let column = s.column(idx);
            let mean = column.sum() / s.nrows() as f64;
            let max = column.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            RankedConfiguration {
                configuration: config.clone(),
                score: ConfigurationScore { mean, max },
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        a.score
            .mean
            .total_cmp(&b.score.mean)
            .then_with(|| a.score.max.total_cmp(&b.score.max))
            .then_with(|| a.configuration.cmp(&b.configuration))
    });
    rows
}
