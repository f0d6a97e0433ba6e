//! ---
//! dbb_section: "08-energy-models-optimization"
//! dbb_subsection: "module"
//! dbb_type: "source"
//! dbb_scope: "code"
//! dbb_description: "Coupler loading estimation and busbar split optimisation routines."
//! dbb_version: "v0.1.0"
//! dbb_owner: "tbd"
//! ---
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, Result};

/// Per-bay measurement table as loaded, before cleaning. One row per
/// timestamp, one column per bay; cells may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    pub bays: Vec<String>,
    pub timestamps: Vec<NaiveDateTime>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl RawSeries {
    pub fn new(
        bays: Vec<String>,
        timestamps: Vec<NaiveDateTime>,
        values: Vec<Vec<Option<f64>>>,
    ) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(EngineError::RaggedTable {
                expected: timestamps.len(),
                found: values.len(),
            });
        }
        for row in &values {
            if row.len() != bays.len() {
                return Err(EngineError::RaggedTable {
                    expected: bays.len(),
                    found: row.len(),
                });
            }
        }
        Ok(Self {
            bays,
            timestamps,
            values,
        })
    }

    pub fn bay_count(&self) -> usize {
        self.bays.len()
    }

    pub fn sample_count(&self) -> usize {
        self.timestamps.len()
    }

    /// Signed sum of the present cells in one row. Missing cells are skipped;
    /// the completeness rule removes them later during alignment.
    pub fn row_sum(&self, row: usize) -> f64 {
        self.values[row].iter().flatten().sum()
    }

    pub fn row_is_complete(&self, row: usize) -> bool {
        self.values[row].iter().all(Option::is_some)
    }

    /// Reorder rows chronologically, keeping value rows attached to their
    /// timestamps. Loaders call this so downstream stages can rely on order.
    pub fn sort_by_time(&mut self) {
        let mut order: Vec<usize> = (0..self.timestamps.len()).collect();
        order.sort_by_key(|&idx| self.timestamps[idx]);
        self.timestamps = order.iter().map(|&idx| self.timestamps[idx]).collect();
        let mut rows = Vec::with_capacity(order.len());
        for &idx in &order {
            rows.push(std::mem::take(&mut self.values[idx]));
        }
        self.values = rows;
    }
}

/// Cleaned, fully populated P/Q series for one substation. Invariants: no
/// missing cells, identical timestamp set for P and Q, bay order canonical
/// for the remainder of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSeries {
    pub bays: Vec<String>,
    pub timestamps: Vec<NaiveDateTime>,
    pub p: Vec<Vec<f64>>,
    pub q: Vec<Vec<f64>>,
}

impl SampleSeries {
    pub fn bay_count(&self) -> usize {
        self.bays.len()
    }

    pub fn sample_count(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// One candidate bay-to-busbar assignment: bit `i` places bay `i` on busbar
/// "0" or "1", in canonical bay order. Immutable once enumerated.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Configuration(Vec<u8>);

impl Configuration {
    pub fn new(bits: Vec<u8>) -> Self {
        debug_assert!(bits.iter().all(|&b| b <= 1));
        Self(bits)
    }

    /// Low bit of `mask` maps to the first bay.
    pub fn from_mask(mask: u32, len: usize) -> Self {
        Self((0..len).map(|bit| ((mask >> bit) & 1) as u8).collect())
    }

    pub fn bits(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of bays assigned to busbar "1".
    pub fn popcount(&self) -> usize {
        self.0.iter().filter(|&&b| b == 1).count()
    }

    /// Swap the busbar labelling. Coupler loading is invariant under this
    /// relabelling whenever the per-sample sums are balanced.
    pub fn complement(&self) -> Self {
        Self(self.0.iter().map(|&b| 1 - b).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationScore {
    pub mean: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedConfiguration {
    pub configuration: Configuration,
    pub score: ConfigurationScore,
}

/// Ranked study outcome for one substation, best configuration first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    pub substation: String,
    pub bays: Vec<String>,
    pub rows: Vec<RankedConfiguration>,
}

impl ResultTable {
    pub fn empty(substation: &str, bays: Vec<String>) -> Self {
        Self {
            substation: substation.to_owned(),
            bays,
            rows: Vec::new(),
        }
    }

    pub fn best(&self) -> Option<&RankedConfiguration> {
        self.rows.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stamp(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 10, 1)
            .unwrap()
            .and_hms_opt(0, minute, 0)
            .unwrap()
    }

    #[test]
    fn raw_series_rejects_ragged_rows() {
        let result = RawSeries::new(
            vec!["B1".into(), "B2".into()],
            vec![stamp(0)],
            vec![vec![Some(1.0)]],
        );
        assert!(matches!(result, Err(EngineError::RaggedTable { .. })));
    }

    #[test]
    fn row_sum_skips_missing_cells() {
        let series = RawSeries::new(
            vec!["B1".into(), "B2".into(), "B3".into()],
            vec![stamp(0)],
            vec![vec![Some(4.0), None, Some(-1.5)]],
        )
        .unwrap();
        assert_eq!(series.row_sum(0), 2.5);
        assert!(!series.row_is_complete(0));
    }

    #[test]
    fn sort_by_time_keeps_rows_attached() {
        let mut series = RawSeries::new(
            vec!["B1".into()],
            vec![stamp(30), stamp(0), stamp(15)],
            vec![vec![Some(3.0)], vec![Some(1.0)], vec![Some(2.0)]],
        )
        .unwrap();
        series.sort_by_time();
        assert_eq!(series.timestamps, vec![stamp(0), stamp(15), stamp(30)]);
        assert_eq!(
            series.values,
            vec![vec![Some(1.0)], vec![Some(2.0)], vec![Some(3.0)]]
        );
    }

    #[test]
    fn configuration_mask_round_trip() {
        let config = Configuration::from_mask(0b0101, 4);
        assert_eq!(config.bits(), &[1, 0, 1, 0]);
        assert_eq!(config.popcount(), 2);
        assert_eq!(config.complement().bits(), &[0, 1, 0, 1]);
    }
}
