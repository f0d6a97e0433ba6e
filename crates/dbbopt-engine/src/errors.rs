//! ---
//! dbb_section: "08-energy-models-optimization"
//! dbb_subsection: "module"
//! dbb_type: "source"
//! dbb_scope: "code"
//! dbb_description: "Coupler loading estimation and busbar split optimisation routines."
//! dbb_version: "v0.1.0"
//! dbb_owner: "tbd"
//! ---
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("P and Q tables disagree on bay columns: {0}")]
    BayMismatch(String),
    #[error("configuration length {config_len} does not match bay count {bay_count}")]
    ShapeMismatch {
        config_len: usize,
        bay_count: usize,
    },
    #[error("{bays} bays exceed the supported enumeration ceiling of {max}")]
    TooManyBays { bays: usize, max: usize },
    #[error("non-numeric value '{value}' at line {line}, column '{column}'")]
    NonNumericValue {
        value: String,
        line: usize,
        column: String,
    },
    #[error("unparseable timestamp '{0}'")]
    BadTimestamp(String),
    #[error("table rows have inconsistent width (expected {expected}, found {found})")]
    RaggedTable { expected: usize, found: usize },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("serialization error: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
