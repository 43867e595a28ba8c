use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use phylab_core::{ErrorInfo, PhyError};
use serde::{Deserialize, Serialize};

use crate::serde::from_yaml_slice;

/// File looked up in the working directory when no config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "phylab.yaml";

/// YAML-configurable settings of the lab tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabConfig {
    /// Directory holding one data file per experiment.
    #[serde(default = "default_target_dir")]
    pub target_dir: PathBuf,
    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Rendering of run reports.
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_target_dir() -> PathBuf {
    PathBuf::from("target")
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            target_dir: default_target_dir(),
            log_level: default_log_level(),
            format: OutputFormat::default(),
        }
    }
}

impl LabConfig {
    /// Loads `path`, or [`DEFAULT_CONFIG_FILE`] when present, or defaults.
    ///
    /// An explicitly requested file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, PhyError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.exists() {
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let bytes = fs::read(&path).map_err(|err| {
            PhyError::Io(
                ErrorInfo::new("config.read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        from_yaml_slice(&bytes)
    }
}

/// Supported report renderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human readable text.
    #[default]
    Text,
    /// Canonical JSON.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = PhyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(PhyError::Data(
                ErrorInfo::new("config.format", "unknown output format")
                    .with_context("format", other)
                    .with_hint("expected text or json"),
            )),
        }
    }
}
