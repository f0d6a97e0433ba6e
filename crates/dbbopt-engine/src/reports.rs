//! ---
//! dbb_section: "08-energy-models-optimization"
//! dbb_subsection: "module"
//! dbb_type: "source"
//! dbb_scope: "code"
//! dbb_description: "Coupler loading estimation and busbar split optimisation routines."
//! dbb_version: "v0.1.0"
//! dbb_owner: "tbd"
//! ---
use std::{fs, path::{Path, PathBuf}};

use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::{errors::Result, model::ResultTable};

/// Writes one workbook directory per study run: a CSV sheet and a JSON
/// envelope per substation, ranked rows best-first.
#[derive(Debug)]
pub struct WorkbookExporter<'a> {
    tables: &'a [ResultTable],
}

impl<'a> WorkbookExporter<'a> {
    pub fn new(tables: &'a [ResultTable]) -> Self {
        Self { tables }
    }

    /// Export all sheets under `output_dir/<workbook>`. When that directory
    /// already holds files from an earlier run, a numbered sibling such as
    /// `<workbook>(0)` is used instead and a warning names both paths; the
    /// ranked content is never altered by the rename.
    pub fn export_all(&self, output_dir: &Path, workbook: &str) -> Result<PathBuf> {
        let target = resolve_workbook_dir(output_dir, workbook);
        fs::create_dir_all(&target)?;

        let generated_at = chrono::Utc::now().to_rfc3339();
        for table in self.tables {
            let sheet = sheet_name(&table.substation);
            write_sheet_csv(&target.join(format!("{sheet}.csv")), table)?;
            let envelope = ReportEnvelope {
                generated_at: &generated_at,
                workbook,
                schema: ranking_schema(),
                data: table,
            };
            write_json(&target.join(format!("{sheet}.json")), &envelope)?;
        }

        info!(
            workbook = %target.display(),
            sheets = self.tables.len(),
            "study results exported"
        );
        Ok(target)
    }
}

/// Pick a collision-free workbook directory, mirroring the numbered-suffix
/// convention operators already know from exported spreadsheets.
fn resolve_workbook_dir(output_dir: &Path, workbook: &str) -> PathBuf {
    let preferred = output_dir.join(workbook);
    if !dir_in_use(&preferred) {
        return preferred;
    }
    for attempt in 0..100 {
        let candidate = output_dir.join(format!("{workbook}({attempt})"));
        if !dir_in_use(&candidate) {
            warn!(
                requested = %preferred.display(),
                substitute = %candidate.display(),
                "workbook directory already in use, writing under substitute name"
            );
            return candidate;
        }
    }
    // 100 colliding runs in one directory; reuse the last candidate.
    output_dir.join(format!("{workbook}(99)"))
}

fn dir_in_use(path: &Path) -> bool {
    match fs::read_dir(path) {
        Ok(mut entries) => entries.next().is_some(),
        Err(_) => false,
    }
}

fn sheet_name(substation: &str) -> String {
    substation
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn write_sheet_csv(path: &Path, table: &ResultTable) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    let mut header: Vec<String> = table.bays.clone();
    header.push("mean".to_owned());
    header.push("max".to_owned());
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut record: Vec<String> = row
            .configuration
            .bits()
            .iter()
            .map(u8::to_string)
            .collect();
        record.push(row.score.mean.to_string());
        record.push(row.score.max.to_string());
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct ReportEnvelope<'a, T: Serialize> {
    generated_at: &'a str,
    workbook: &'a str,
    schema: serde_json::Value,
    data: &'a T,
}

fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let serialized = serde_json::to_string_pretty(value)?;
    fs::write(path, serialized)?;
    Ok(())
}

fn ranking_schema() -> serde_json::Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "ResultTable",
        "type": "object",
        "properties": {
            "substation": {"type": "string"},
            "bays": {"type": "array", "items": {"type": "string"}},
            "rows": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "configuration": {
                            "type": "array",
                            "items": {"type": "integer", "minimum": 0, "maximum": 1}
                        },
                        "score": {
                            "type": "object",
                            "properties": {
                                "mean": {"type": "number"},
                                "max": {"type": "number"}
                            },
                            "required": ["mean", "max"]
                        }
                    },
                    "required": ["configuration", "score"]
                }
            }
        },
        "required": ["substation", "bays", "rows"],
    })
}
