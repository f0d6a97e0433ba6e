//! ---
//! dbb_section: "01-core-functionality"
//! dbb_subsection: "module"
//! dbb_type: "source"
//! dbb_scope: "code"
//! dbb_description: "Shared primitives and utilities for the study runtime."
//! dbb_version: "v0.1.0"
//! dbb_owner: "tbd"
//! ---
//! Core shared primitives for the DBB-Opt workspace.
//! This crate exposes configuration loading, logging initialisation, and
//! version metadata utilities consumed across the workspace.

pub mod config;
pub mod logging;
pub mod version;

pub use config::{
    AppConfig, ExportConfig, LoadedAppConfig, SubstationConfig, ThresholdConfig,
};
pub use logging::{init_tracing, LogFormat};
pub use version::VersionInfo;
