//! ---
//! dbb_section: "05-networking-external-interfaces"
//! dbb_subsection: "binary"
//! dbb_type: "source"
//! dbb_scope: "code"
//! dbb_description: "Command line entry point for running coupler studies."
//! dbb_version: "v0.1.0"
//! dbb_owner: "tbd"
//! ---
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use dbbopt_engine::{
    run_batch_with_export, source::CsvSeriesSource, StudySettings, SubstationStudy,
};
use dbbopt_sim::{generate, write_series_csv, SyntheticSpec};
use tracing::info;

use crate::run::print_recommendation;

#[derive(Debug, Args)]
pub struct DemoArgs {
    /// Number of switchable bays per substation
    #[arg(long, default_value_t = 6)]
    pub bays: usize,
    /// Number of quarter-hour samples per substation
    #[arg(long, default_value_t = 192)]
    pub samples: usize,
    /// Number of synthetic substations to study
    #[arg(long, default_value_t = 2)]
    pub substations: usize,
    /// Seed for the synthetic histories
    #[arg(long, default_value_t = 0x0DBB)]
    pub seed: u64,
    /// Directory receiving the generated data and the workbook
    #[arg(short, long, default_value = "reports/demo")]
    pub output: PathBuf,
}

/// Generate synthetic substation histories, write them as CSV exports, and
/// run the full study over the files, exercising the same acquisition path a
/// production run uses.
pub fn run(args: DemoArgs) -> Result<()> {
    let data_dir = args.output.join("data");
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("unable to create demo data directory {}", data_dir.display()))?;

    let mut studies = Vec::with_capacity(args.substations);
    for idx in 0..args.substations {
        let name = format!("SE{}_demo", idx + 1);
        let spec = SyntheticSpec {
            bays: args.bays,
            samples: args.samples,
            seed: args.seed.wrapping_add(idx as u64),
            ..SyntheticSpec::default()
        };
        let (p, q) = generate(&spec);

        let p_path = data_dir.join(format!("{name}__P__.csv"));
        let q_path = data_dir.join(format!("{name}__Q__.csv"));
        write_series_csv(&p, &p_path)?;
        write_series_csv(&q, &q_path)?;
        info!(substation = %name, p_file = %p_path.display(), q_file = %q_path.display(), "demo series written");

        studies.push(SubstationStudy {
            name,
            source: Box::new(CsvSeriesSource::new(p_path, q_path)),
        });
    }

    let summary = run_batch_with_export(
        &studies,
        &StudySettings::default(),
        &args.output,
        "demo_study",
    )
    .context("demo study failed")?;

    println!("Workbook written to {}", summary.workbook_dir.display());
    for table in &summary.tables {
        print_recommendation(table);
    }
    Ok(())
}
