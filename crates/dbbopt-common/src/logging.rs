//! ---
//! dbb_section: "01-core-functionality"
//! dbb_subsection: "module"
//! dbb_type: "source"
//! dbb_scope: "code"
//! dbb_description: "Shared primitives and utilities for the study runtime."
//! dbb_version: "v0.1.0"
//! dbb_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

const LOG_ENV: &str = "DBBOPT_LOG";

/// Available log formats for the tooling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    StructuredJson,
    #[default]
    Pretty,
}

/// Initialize the tracing subscriber based on environment variables.
///
/// `DBBOPT_LOG` overrides the filter (e.g. `info`, `debug,dbbopt_engine=trace`);
/// when unset the standard `RUST_LOG` variable is honoured, finally defaulting
/// to `info` so batch runs stay readable while still narrating each stage.
pub fn init_tracing(service_name: &str, format: LogFormat) {
    let filter = match std::env::var(LOG_ENV) {
        Ok(directive) => EnvFilter::try_new(directive).unwrap_or_else(|err| {
            eprintln!(
                "invalid {} directive ({}); defaulting to info logging",
                LOG_ENV, err
            );
            EnvFilter::new("info")
        }),
        Err(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let fmt_layer = match format {
        LogFormat::StructuredJson => fmt::layer().with_target(false).json().boxed(),
        LogFormat::Pretty => fmt::layer().with_target(true).boxed(),
    };

    let initialised = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_ok();

    if initialised {
        info!(service = %service_name, format = ?format, "tracing initialised");
    }
}
