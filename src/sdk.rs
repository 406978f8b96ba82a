// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use tracing::info;

use crate::library::LibraryCollection;

/// Paths inside an Arduino software distribution.
#[derive(Debug, Clone)]
pub struct SdkLayout {
    pub root: PathBuf,
    pub core_dir: PathBuf,
    pub libraries_dir: PathBuf,
    core_header: &'static str,
    version: u32,
}

impl SdkLayout {
    /// Validates the distribution under `root` and detects its version.
    pub fn discover(root: &Path, version_override: Option<u32>) -> Result<Self> {
        let root = root
            .canonicalize()
            .with_context(|| format!("Arduino distribution {} not found", root.display()))?;

        let core_dir = root.join("hardware/arduino/cores/arduino");
        let core_header = ["Arduino.h", "WProgram.h"]
            .into_iter()
            .find(|header| core_dir.join(header).is_file())
            .ok_or_else(|| {
                anyhow!(
                    "Arduino core library not found: expected Arduino.h or WProgram.h in {}",
                    core_dir.display()
                )
            })?;

        let version = match version_override {
            Some(version) => version,
            None => {
                let file = root.join("lib/version.txt");
                let text = std::fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                parse_version(&text)
                    .with_context(|| format!("Invalid Arduino version in {}", file.display()))?
            }
        };
        info!(version, dist = %root.display(), "detected Arduino software");

        Ok(Self {
            libraries_dir: root.join("libraries"),
            core_dir,
            core_header,
            version,
            root,
        })
    }

    pub fn core_header(&self) -> &'static str {
        self.core_header
    }

    /// Value of the `ARDUINO` preprocessor define.
    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn standard_libraries(&self) -> LibraryCollection {
        LibraryCollection::standard(&self.libraries_dir)
    }
}

/// Parses `version.txt`: `0022` gives 22 and `1.0.5` gives 105.
pub fn parse_version(text: &str) -> Result<u32> {
    let text = text.trim();
    if text.is_empty() {
        bail!("version is empty");
    }
    if !text.contains('.') {
        return Ok(text.parse()?);
    }

    let mut parts = [0u32; 3];
    for (idx, part) in text.split('.').enumerate() {
        if idx >= parts.len() {
            bail!("too many components in version `{text}`");
        }
        parts[idx] = part.parse()?;
    }
    let [major, minor, patch] = parts;
    major
        .checked_mul(100)
        .zip(minor.checked_mul(10))
        .and_then(|(major, minor)| major.checked_add(minor)?.checked_add(patch))
        .with_context(|| format!("version `{text}` is out of range"))
}
