//! ---
//! dbb_section: "05-networking-external-interfaces"
//! dbb_subsection: "binary"
//! dbb_type: "source"
//! dbb_scope: "code"
//! dbb_description: "Command line entry point for running coupler studies."
//! dbb_version: "v0.1.0"
//! dbb_owner: "tbd"
//! ---
use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use dbbopt_common::{logging, VersionInfo};

mod demo;
mod run;

#[derive(Debug, Parser)]
#[command(
    author,
    disable_version_flag = true,
    about = "Double-busbar coupler loading study utility",
    long_about = None
)]
struct Cli {
    #[arg(
        short = 'V',
        long = "version",
        action = ArgAction::SetTrue,
        help = "Print extended version information and exit"
    )]
    version: bool,
    #[arg(
        long = "json-logs",
        action = ArgAction::SetTrue,
        help = "Emit structured JSON logs instead of human-readable output"
    )]
    json_logs: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Run a coupler study batch from a configuration file")]
    Run(run::RunArgs),
    #[command(about = "Generate synthetic substation histories and study them end to end")]
    Demo(demo::DemoArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.version {
        println!("{}", VersionInfo::current().extended());
        return Ok(());
    }
    let format = if cli.json_logs {
        logging::LogFormat::StructuredJson
    } else {
        logging::LogFormat::Pretty
    };
    logging::init_tracing("dbbopt", format);

    match cli.command {
        Some(Commands::Run(args)) => run::run(args)?,
        Some(Commands::Demo(args)) => demo::run(args)?,
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
    }
    Ok(())
}
