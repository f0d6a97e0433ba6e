//! ---
//! dbb_section: "05-networking-external-interfaces"
//! dbb_subsection: "binary"
//! dbb_type: "source"
//! dbb_scope: "code"
//! dbb_description: "Command line entry point for running coupler studies."
//! dbb_version: "v0.1.0"
//! dbb_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use dbbopt_common::AppConfig;
use dbbopt_engine::{
    model::ResultTable, run_batch_with_export, source::CsvSeriesSource, StudySettings,
    SubstationStudy,
};
use tracing::info;

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Configuration file; defaults walk dbbopt.toml then configs/dbbopt.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Override the export directory from the configuration
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Override the workbook name from the configuration
    #[arg(short, long)]
    pub workbook: Option<String>,
}

pub fn run(args: RunArgs) -> Result<()> {
    let loaded = match &args.config {
        Some(path) => AppConfig::load_with_source(&[path])?,
        None => AppConfig::load_with_source(&["dbbopt.toml", "configs/dbbopt.toml"])?,
    };
    info!(config = %loaded.source.display(), "configuration loaded");
    let config = loaded.config;

    let studies: Vec<SubstationStudy> = config
        .substations
        .iter()
        .map(|(name, substation)| SubstationStudy {
            name: name.clone(),
            source: Box::new(CsvSeriesSource::new(&substation.p_file, &substation.q_file)),
        })
        .collect();

    let settings = StudySettings {
        sum_threshold: config.thresholds.sum_threshold,
        balance_fraction: config.thresholds.balance_fraction,
    };
    let output_dir = args.output.unwrap_or(config.export.directory);
    let workbook = args.workbook.unwrap_or(config.export.workbook);

    let summary = run_batch_with_export(&studies, &settings, &output_dir, &workbook)
        .context("coupler study batch failed")?;

    println!("Workbook written to {}", summary.workbook_dir.display());
    for table in &summary.tables {
        print_recommendation(table);
    }
    Ok(())
}

pub(crate) fn print_recommendation(table: &ResultTable) {
    match table.best() {
        Some(best) => {
            let split: Vec<String> = table
                .bays
                .iter()
                .zip(best.configuration.bits())
                .map(|(bay, bit)| format!("{bay}->{bit}"))
                .collect();
            println!(
                "{}: best split [{}] mean {:.3} max {:.3}",
                table.substation,
                split.join(", "),
                best.score.mean,
                best.score.max
            );
        }
        None => println!("{}: no rankable configuration", table.substation),
    }
}
