//! ---
//! dbb_section: "08-energy-models-optimization"
//! dbb_subsection: "module"
//! dbb_type: "source"
//! dbb_scope: "code"
//! dbb_description: "Coupler loading estimation and busbar split optimisation routines."
//! dbb_version: "v0.1.0"
//! dbb_owner: "tbd"
//! ---
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::debug;

use crate::{
    errors::{EngineError, Result},
    model::RawSeries,
};

/// Acquisition seam for one substation's historical P and Q tables.
///
/// Implementations are interchangeable: CSV exports on disk here, a seeded
/// synthetic generator in `dbbopt-sim`, or a live acquisition backend in a
/// host installation. The engine only requires that both tables share the
/// same bay columns.
pub trait SeriesSource {
    fn load(&self) -> Result<(RawSeries, RawSeries)>;
}

/// File-backed source reading two CSV exports, one for P and one for Q.
/// Expected layout: header row with a leading timestamp column (`Time` by
/// convention, any label accepted) followed by one column per bay; empty
/// cells mark missing measurements.
#[derive(Debug, Clone)]
pub struct CsvSeriesSource {
    p_path: PathBuf,
    q_path: PathBuf,
}

impl CsvSeriesSource {
    pub fn new(p_path: impl Into<PathBuf>, q_path: impl Into<PathBuf>) -> Self {
        Self {
            p_path: p_path.into(),
            q_path: q_path.into(),
        }
    }
}

impl SeriesSource for CsvSeriesSource {
    fn load(&self) -> Result<(RawSeries, RawSeries)> {
        let p = read_series_csv(&self.p_path)?;
        let q = read_series_csv(&self.q_path)?;
        Ok((p, q))
    }
}

/// Read one timestamp-indexed measurement table from a CSV file. Rows are
/// returned in chronological order regardless of file order.
pub fn read_series_csv(path: impl AsRef<Path>) -> Result<RawSeries> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let bays: Vec<String> = headers.iter().skip(1).map(str::to_owned).collect();

    let mut timestamps = Vec::new();
    let mut values = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        // Header is line 1, the first data record line 2.
        let line = idx + 2;
        let stamp_cell = record.get(0).unwrap_or_default();
        timestamps.push(parse_timestamp(stamp_cell)?);

        let mut row = Vec::with_capacity(bays.len());
        for (col, bay) in bays.iter().enumerate() {
            let cell = record.get(col + 1).unwrap_or_default();
            if cell.is_empty() {
                row.push(None);
            } else {
                let value = cell.parse::<f64>().map_err(|_| EngineError::NonNumericValue {
                    value: cell.to_owned(),
                    line,
                    column: bay.clone(),
                })?;
                row.push(Some(value));
            }
        }
        values.push(row);
    }

    debug!(
        file = %path.display(),
        rows = timestamps.len(),
        bays = bays.len(),
        "series table loaded"
    );

    let mut series = RawSeries::new(bays, timestamps, values)?;
    series.sort_by_time();
    Ok(series)
}

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

fn parse_timestamp(cell: &str) -> Result<NaiveDateTime> {
    for format in TIMESTAMP_FORMATS {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(cell, format) {
            return Ok(stamp);
        }
    }
    Err(EngineError::BadTimestamp(cell.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reads_a_well_formed_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "p.csv",
            "Time,Linea1,Linea2\n\
             2023-10-01 00:15:00,5.0,-4.0\n\
             2023-10-01 00:00:00,10.0,-10.0\n",
        );
        let series = read_series_csv(&path).unwrap();
        assert_eq!(series.bays, vec!["Linea1", "Linea2"]);
        // Rows come back chronologically even though the file is shuffled.
        assert_eq!(series.values[0], vec![Some(10.0), Some(-10.0)]);
        assert_eq!(series.values[1], vec![Some(5.0), Some(-4.0)]);
    }

    #[test]
    fn empty_cells_become_missing_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "p.csv",
            "Time,B1,B2\n2023-10-01 00:00:00,,3.5\n",
        );
        let series = read_series_csv(&path).unwrap();
        assert_eq!(series.values[0], vec![None, Some(3.5)]);
    }

    #[test]
    fn non_numeric_cells_are_fatal_and_located() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "p.csv",
            "Time,B1\n2023-10-01 00:00:00,5.0\n2023-10-01 00:15:00,n/a\n",
        );
        match read_series_csv(&path) {
            Err(EngineError::NonNumericValue { value, line, column }) => {
                assert_eq!(value, "n/a");
                assert_eq!(line, 3);
                assert_eq!(column, "B1");
            }
            other => panic!("expected NonNumericValue, got {other:?}"),
        }
    }

    #[test]
    fn bad_timestamps_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "p.csv", "Time,B1\nyesterday,5.0\n");
        assert!(matches!(
            read_series_csv(&path),
            Err(EngineError::BadTimestamp(_))
        ));
    }

    #[test]
    fn csv_source_loads_both_tables() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_csv(&dir, "p.csv", "Time,B1,B2\n2023-10-01 00:00:00,1.0,-1.0\n");
        let q = write_csv(&dir, "q.csv", "Time,B1,B2\n2023-10-01 00:00:00,0.2,-0.2\n");
        let source = CsvSeriesSource::new(p, q);
        let (raw_p, raw_q) = source.load().unwrap();
        assert_eq!(raw_p.bays, raw_q.bays);
        assert_eq!(raw_p.sample_count(), 1);
    }
}
