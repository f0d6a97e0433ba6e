//! ---
//! dbb_section: "01-core-functionality"
//! dbb_subsection: "module"
//! dbb_type: "source"
//! dbb_scope: "code"
//! dbb_description: "Shared primitives and utilities for the study runtime."
//! dbb_version: "v0.1.0"
//! dbb_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

fn default_sum_threshold() -> f64 {
    20.0
}

fn default_balance_fraction() -> f64 {
    0.3
}

fn default_export_directory() -> PathBuf {
    PathBuf::from("reports")
}

fn default_workbook_name() -> String {
    "coupler_study".to_owned()
}

/// Primary configuration object for a study run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub export: ExportConfig,
    /// Ordered map of substations to solve; iteration order is file order
    /// and fixes the result ordering of the whole run.
    #[serde(default)]
    pub substations: IndexMap<String, SubstationConfig>,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    pub source: PathBuf,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &str = "DBBOPT_CONFIG";

    /// Load configuration from disk, respecting the `DBBOPT_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(path.clone())?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(path.clone())?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    fn from_path(path: PathBuf) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<AppConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Retrieve a substation configuration by identifier.
    pub fn substation(&self, name: &str) -> Option<&SubstationConfig> {
        self.substations.get(name)
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        if self.substations.is_empty() {
            return Err(anyhow!("configuration must declare at least one substation"));
        }
        self.thresholds.validate()?;
        for (name, substation) in &self.substations {
            substation.validate(name)?;
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            thresholds: ThresholdConfig::default(),
            export: ExportConfig::default(),
            substations: IndexMap::new(),
        }
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

/// Tunable bounds for the cleaning and enumeration stages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Samples whose absolute bay sum reaches this bound are rejected.
    #[serde(default = "default_sum_threshold")]
    pub sum_threshold: f64,
    /// Minimum fraction of bays each busbar must host, within [0, 0.5].
    #[serde(default = "default_balance_fraction")]
    pub balance_fraction: f64,
}

impl ThresholdConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.sum_threshold > 0.0) {
            return Err(anyhow!(
                "sum_threshold must be strictly positive, got {}",
                self.sum_threshold
            ));
        }
        if !(0.0..=0.5).contains(&self.balance_fraction) {
            return Err(anyhow!(
                "balance_fraction must lie within [0, 0.5], got {}",
                self.balance_fraction
            ));
        }
        Ok(())
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            sum_threshold: default_sum_threshold(),
            balance_fraction: default_balance_fraction(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_workbook_name")]
    pub workbook: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: default_export_directory(),
            workbook: default_workbook_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SubstationConfig {
    #[serde(default)]
    pub description: Option<String>,
    pub p_file: PathBuf,
    pub q_file: PathBuf,
}

impl SubstationConfig {
    pub fn validate(&self, name: &str) -> Result<()> {
        if self.p_file.as_os_str().is_empty() || self.q_file.as_os_str().is_empty() {
            return Err(anyhow!(
                "substation '{}' must declare both p_file and q_file",
                name
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[thresholds]
sum_threshold = 15.0
balance_fraction = 0.25

[export]
directory = "out"
workbook = "se_study"

[substations.SE1_220kV]
description = "Eight-bay double busbar"
p_file = "data/SE1__P__.csv"
q_file = "data/SE1__Q__.csv"

[substations.SE2_110kV]
p_file = "data/SE2__P__.csv"
q_file = "data/SE2__Q__.csv"
"#;

    #[test]
    fn parses_a_full_configuration() {
        let config: AppConfig = SAMPLE.parse().unwrap();
        assert_eq!(config.thresholds.sum_threshold, 15.0);
        assert_eq!(config.thresholds.balance_fraction, 0.25);
        assert_eq!(config.export.workbook, "se_study");
        assert_eq!(config.substations.len(), 2);
        // IndexMap preserves declaration order.
        let names: Vec<_> = config.substations.keys().collect();
        assert_eq!(names, vec!["SE1_220kV", "SE2_110kV"]);
    }

    #[test]
    fn defaults_apply_when_sections_are_omitted() {
        let config: AppConfig = r#"
[substations.SE1]
p_file = "p.csv"
q_file = "q.csv"
"#
        .parse()
        .unwrap();
        assert_eq!(config.thresholds.sum_threshold, 20.0);
        assert_eq!(config.thresholds.balance_fraction, 0.3);
        assert_eq!(config.export.directory, PathBuf::from("reports"));
    }

    #[test]
    fn rejects_a_substation_free_configuration() {
        let result = "".parse::<AppConfig>();
        assert!(result.is_err());
    }

    #[test]
    fn rejects_an_out_of_range_balance_fraction() {
        let result = r#"
[thresholds]
balance_fraction = 0.7

[substations.SE1]
p_file = "p.csv"
q_file = "q.csv"
"#
        .parse::<AppConfig>();
        assert!(result.is_err());
    }

    #[test]
    fn rejects_a_non_positive_sum_threshold() {
        let result = r#"
[thresholds]
sum_threshold = 0.0

[substations.SE1]
p_file = "p.csv"
q_file = "q.csv"
"#
        .parse::<AppConfig>();
        assert!(result.is_err());
    }

    #[test]
    fn load_with_source_walks_the_candidate_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dbbopt.toml");
        fs::write(&path, SAMPLE).unwrap();
        let missing = dir.path().join("absent.toml");
        let loaded = AppConfig::load_with_source(&[&missing, &path]).unwrap();
        assert_eq!(loaded.source, path);
        assert_eq!(loaded.config.substations.len(), 2);
    }
}
