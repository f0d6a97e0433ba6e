//! ---
//! dbb_section: "08-energy-models-optimization"
//! dbb_subsection: "module"
//! dbb_type: "source"
//! dbb_scope: "code"
//! dbb_description: "Coupler loading estimation and busbar split optimisation routines."
//! dbb_version: "v0.1.0"
//! dbb_owner: "tbd"
//! ---
use std::collections::HashMap;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::{
    errors::{EngineError, Result},
    model::{RawSeries, SampleSeries},
};

/// Filter and align one substation's P and Q tables.
///
/// Power into a busbar sums to ~zero, so a row whose absolute sum reaches
/// `sum_threshold` carries a metering or topology inconsistency and is
/// dropped. Each table is filtered independently, then both are intersected
/// on timestamp; a timestamp survives only if it passed the threshold in both
/// tables and has no missing cell in any bay column of either. The output bay
/// order is the P table's column order and is canonical for the rest of the
/// run.
pub fn clean_samples(p: &RawSeries, q: &RawSeries, sum_threshold: f64) -> Result<SampleSeries> {
    if p.bays != q.bays {
        return Err(EngineError::BayMismatch(format!(
            "P columns [{}] vs Q columns [{}]",
            p.bays.join(", "),
            q.bays.join(", ")
        )));
    }

    let p_valid = threshold_filter(p, sum_threshold);
    let q_valid = threshold_filter(q, sum_threshold);
    debug!(
        p_kept = p_valid.len(),
        p_total = p.sample_count(),
        q_kept = q_valid.len(),
        q_total = q.sample_count(),
        "sum-threshold filter applied"
    );

    let q_by_time: HashMap<NaiveDateTime, usize> = q_valid
        .iter()
        .map(|&row| (q.timestamps[row], row))
        .collect();

    let mut timestamps = Vec::new();
    let mut p_rows = Vec::new();
    let mut q_rows = Vec::new();
    for &p_row in &p_valid {
        let stamp = p.timestamps[p_row];
        let Some(&q_row) = q_by_time.get(&stamp) else {
            continue;
        };
        if !p.row_is_complete(p_row) || !q.row_is_complete(q_row) {
            continue;
        }
        timestamps.push(stamp);
        p_rows.push(p.values[p_row].iter().map(|v| v.unwrap_or_default()).collect());
        q_rows.push(q.values[q_row].iter().map(|v| v.unwrap_or_default()).collect());
    }

    info!(
        samples = timestamps.len(),
        bays = p.bay_count(),
        "series cleaned and aligned"
    );

    Ok(SampleSeries {
        bays: p.bays.clone(),
        timestamps,
        p: p_rows,
        q: q_rows,
    })
}

fn threshold_filter(table: &RawSeries, sum_threshold: f64) -> Vec<usize> {
    (0..table.sample_count())
        .filter(|&row| table.row_sum(row).abs() < sum_threshold)
        .collect()
}
