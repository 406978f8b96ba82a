// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::library::default_excluded;

/// Name of the optional per-project configuration file.
pub const CONFIG_FILE: &str = "fwforge.yaml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BoardConfig {
    pub mcu: String,
    pub f_cpu: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            mcu: "atmega328p".to_string(),
            f_cpu: "16000000L".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    pub cc: String,
    pub cxx: String,
    pub ar: String,
    pub objcopy: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            cc: "avr-gcc".to_string(),
            cxx: "avr-g++".to_string(),
            ar: "avr-ar".to_string(),
            objcopy: "avr-objcopy".to_string(),
        }
    }
}

/// Build settings, read from `fwforge.yaml` and overridden from the command line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    pub board: BoardConfig,
    pub arduino_dist: Option<PathBuf>,
    pub arduino_version: Option<u32>,
    pub tools: ToolsConfig,
    /// Treat a failing dependency scan as fatal instead of best-effort.
    pub strict_scan: bool,
    pub excluded_subdirs: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            arduino_dist: None,
            arduino_version: None,
            tools: ToolsConfig::default(),
            strict_scan: false,
            excluded_subdirs: default_excluded(),
        }
    }
}

impl BuildConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads `fwforge.yaml` from `project_root`, or the defaults if absent.
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = project_root.join(CONFIG_FILE);
        if !path.exists() {
            debug!("no {CONFIG_FILE} found, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config = Self::from_yaml_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        // Relative SDK paths are relative to the project, not the working directory.
        if let Some(dist) = &config.arduino_dist {
            if dist.is_relative() {
                config.arduino_dist = Some(project_root.join(dist));
            }
        }

        Ok(config)
    }
}
