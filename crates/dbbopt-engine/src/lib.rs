//! ---
//! dbb_section: "08-energy-models-optimization"
//! dbb_subsection: "module"
//! dbb_type: "source"
//! dbb_scope: "code"
//! dbb_description: "Coupler loading estimation and busbar split optimisation routines."
//! dbb_version: "v0.1.0"
//! dbb_owner: "tbd"
//! ---
pub mod cleaner;
pub mod enumerate;
pub mod errors;
pub mod evaluate;
pub mod model;
pub mod rank;
pub mod reports;
pub mod source;

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::{
    cleaner::clean_samples,
    enumerate::enumerate_configurations,
    evaluate::evaluate_coupler,
    model::{RawSeries, ResultTable},
    rank::rank_configurations,
    reports::WorkbookExporter,
    source::SeriesSource,
};

pub use errors::{EngineError, Result};

/// Tunable thresholds threaded through the pipeline. Defaults follow the
/// established operating practice: samples whose bay sums reach 20 power
/// units are rejected as inconsistent, and each busbar must host at least
/// 30% of the bays.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct StudySettings {
    pub sum_threshold: f64,
    pub balance_fraction: f64,
}

impl Default for StudySettings {
    fn default() -> Self {
        Self {
            sum_threshold: 20.0,
            balance_fraction: 0.3,
        }
    }
}

/// One substation to solve: a label for the exported sheet plus the series
/// acquisition backend for its historical data.
pub struct SubstationStudy {
    pub name: String,
    pub source: Box<dyn SeriesSource>,
}

/// Outcome of a full batch run.
#[derive(Debug)]
pub struct BatchSummary {
    pub tables: Vec<ResultTable>,
    pub workbook_dir: PathBuf,
}

/// Solve one substation: clean and align its series, enumerate balanced
/// busbar splits, score every split on every sample, and rank.
///
/// An empty post-cleaning series or an empty surviving-split set yields an
/// empty [`ResultTable`]; only structural contract violations (mismatched
/// bay columns, non-numeric data, oversized bay counts) surface as errors.
pub fn optimize_substation(
    name: &str,
    raw_p: &RawSeries,
    raw_q: &RawSeries,
    settings: &StudySettings,
) -> Result<ResultTable> {
    info!(substation = name, "starting coupler loading estimation");

    let series = clean_samples(raw_p, raw_q, settings.sum_threshold)?;
    let configs = enumerate_configurations(series.bay_count(), settings.balance_fraction)?;

    if series.is_empty() || configs.is_empty() {
        warn!(
            substation = name,
            samples = series.sample_count(),
            configurations = configs.len(),
            "nothing to rank for this substation"
        );
        return Ok(ResultTable::empty(name, series.bays));
    }

    let apparent = evaluate_coupler(&series, &configs)?;
    let rows = rank_configurations(&apparent, &configs);

    if let Some(best) = rows.first() {
        info!(
            substation = name,
            mean = best.score.mean,
            max = best.score.max,
            "best configuration found"
        );
    }

    Ok(ResultTable {
        substation: name.to_owned(),
        bays: series.bays,
        rows,
    })
}

/// Run an ordered batch of independent substation studies. Result order
/// mirrors the input order. The first structural error aborts the batch;
/// data hygiene (dropped samples, empty series) never does.
pub fn run_batch(studies: &[SubstationStudy], settings: &StudySettings) -> Result<Vec<ResultTable>> {
    let mut tables = Vec::with_capacity(studies.len());
    for study in studies {
        let (raw_p, raw_q) = study.source.load()?;
        tables.push(optimize_substation(&study.name, &raw_p, &raw_q, settings)?);
    }
    Ok(tables)
}

/// Run a batch and export the ranked tables as a workbook under
/// `output_dir/<workbook>`.
pub fn run_batch_with_export(
    studies: &[SubstationStudy],
    settings: &StudySettings,
    output_dir: &Path,
    workbook: &str,
) -> Result<BatchSummary> {
    let tables = run_batch(studies, settings)?;
    let workbook_dir = WorkbookExporter::new(&tables).export_all(output_dir, workbook)?;
    Ok(BatchSummary {
        tables,
        workbook_dir,
    })
}
