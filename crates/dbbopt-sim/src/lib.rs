//! ---
//! dbb_section: "11-simulation-test-harness"
//! dbb_subsection: "module"
//! dbb_type: "source"
//! dbb_scope: "code"
//! dbb_description: "Synthetic measurement generators for coupler studies."
//! dbb_version: "v0.1.0"
//! dbb_owner: "tbd"
//! ---
//! Seeded generator producing plausible per-bay P/Q histories for a double
//! busbar substation. Bay flows follow daily sine profiles with Gaussian
//! noise, the final bay balances the rest so sample sums stay near zero, and
//! configurable rates inject the imperfections the cleaning stage exists
//! for: off-balance outlier rows and missing cells.

use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use dbbopt_engine::{
    model::RawSeries,
    source::SeriesSource,
    Result,
};
use rand::prelude::*;
use rand_distr::Normal;
use tracing::debug;

/// Shape of one synthetic substation history. Identical specs produce
/// identical tables.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticSpec {
    pub bays: usize,
    pub samples: usize,
    pub seed: u64,
    /// Per-sample probability of an off-balance measurement row.
    pub outlier_rate: f64,
    /// Per-sample probability of a missing cell in one of the tables.
    pub gap_rate: f64,
    /// Offset added to the first bay of an outlier row.
    pub outlier_magnitude: f64,
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self {
            bays: 6,
            samples: 192,
            seed: 0x0DBB,
            outlier_rate: 0.05,
            gap_rate: 0.02,
            outlier_magnitude: 60.0,
        }
    }
}

/// Acquisition backend generating series on demand, interchangeable with the
/// file-backed source.
#[derive(Debug, Clone)]
pub struct SyntheticSeriesSource {
    spec: SyntheticSpec,
}

impl SyntheticSeriesSource {
    pub fn new(spec: SyntheticSpec) -> Self {
        Self { spec }
    }
}

impl SeriesSource for SyntheticSeriesSource {
    fn load(&self) -> Result<(RawSeries, RawSeries)> {
        Ok(generate(&self.spec))
    }
}

/// Generate one substation's raw P and Q tables.
pub fn generate(spec: &SyntheticSpec) -> (RawSeries, RawSeries) {
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let noise = Normal::new(0.0, 0.4).expect("sigma must be positive");
    let residual = Normal::new(0.0, 0.5).expect("sigma must be positive");

    let bays = bay_names(spec.bays);
    let timestamps = quarter_hour_stamps(spec.samples);

    let mut p_rows = Vec::with_capacity(spec.samples);
    let mut q_rows = Vec::with_capacity(spec.samples);
    for sample in 0..spec.samples {
        let t = sample as f64 / 96.0;
        let mut p_row = Vec::with_capacity(spec.bays);
        let mut q_row = Vec::with_capacity(spec.bays);

        for bay in 0..spec.bays.saturating_sub(1) {
            let amplitude = 5.0 + 3.0 * (bay % 4) as f64;
            let phase = bay as f64 * 0.7;
            let p = amplitude * (std::f64::consts::TAU * t + phase).sin()
                + noise.sample(&mut rng);
            p_row.push(p);
            q_row.push(0.3 * p + 0.1 * noise.sample(&mut rng));
        }
        if spec.bays > 0 {
            // The closing bay balances the busbar, up to a small residual.
            let p_sum: f64 = p_row.iter().sum();
            let q_sum: f64 = q_row.iter().sum();
            p_row.push(-p_sum + residual.sample(&mut rng));
            q_row.push(-q_sum + 0.3 * residual.sample(&mut rng));
        }

        if spec.bays > 0 && rng.gen_bool(spec.outlier_rate) {
            p_row[0] += spec.outlier_magnitude;
        }

        let mut p_cells: Vec<Option<f64>> = p_row.into_iter().map(Some).collect();
        let mut q_cells: Vec<Option<f64>> = q_row.into_iter().map(Some).collect();
        if spec.bays > 0 && rng.gen_bool(spec.gap_rate) {
            let bay = rng.gen_range(0..spec.bays);
            if rng.gen_bool(0.5) {
                p_cells[bay] = None;
            } else {
                q_cells[bay] = None;
            }
        }

        p_rows.push(p_cells);
        q_rows.push(q_cells);
    }

    debug!(
        bays = spec.bays,
        samples = spec.samples,
        seed = spec.seed,
        "synthetic series generated"
    );

    let p = RawSeries::new(bays.clone(), timestamps.clone(), p_rows)
        .expect("generated tables are rectangular");
    let q = RawSeries::new(bays, timestamps, q_rows)
        .expect("generated tables are rectangular");
    (p, q)
}

/// Materialise a raw series as a CSV export in the layout the file-backed
/// source reads: `Time` column first, one column per bay, empty cells for
/// missing values.
pub fn write_series_csv(series: &RawSeries, path: impl AsRef<Path>) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    let mut header = vec!["Time".to_owned()];
    header.extend(series.bays.iter().cloned());
    writer.write_record(&header)?;

    for (row, stamp) in series.timestamps.iter().enumerate() {
        let mut record = vec![stamp.format("%Y-%m-%d %H:%M:%S").to_string()];
        for cell in &series.values[row] {
            record.push(cell.map(|v| v.to_string()).unwrap_or_default());
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn bay_names(count: usize) -> Vec<String> {
    (1..=count).map(|idx| format!("Bay{idx:02}")).collect()
}

fn quarter_hour_stamps(count: usize) -> Vec<NaiveDateTime> {
    let base = NaiveDate::from_ymd_opt(2023, 10, 1)
        .expect("valid base date")
        .and_hms_opt(0, 0, 0)
        .expect("valid base time");
    (0..count)
        .map(|idx| base + Duration::minutes(15 * idx as i64))
        .collect()
}
