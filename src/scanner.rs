// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::error::{ResolveError, Result};
use crate::include_paths::IncludeFlagSet;
use crate::library::{LibraryCatalog, LibraryRoot};
use crate::project::find_sources;
use crate::toolchain::{CompileFlags, Toolchain};
use crate::usage_report::{LibraryMatcher, UsageReport};
use crate::utils::format_command;

/// File name of the usage report inside a directory's build area.
pub const REPORT_FILE: &str = "dependencies.d";

/// Produces the usage report for one source directory.
pub trait ReportGenerator {
    fn generate(&self, source_dir: &Path, include_flags: &IncludeFlagSet) -> Result<UsageReport>;
}

/// Location of the usage report for `source_dir` inside `build_dir`.
pub fn report_path(build_dir: &Path, source_dir: &Path) -> PathBuf {
    let name = source_dir
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "root".into());
    build_dir.join(name).join(REPORT_FILE)
}

/// Generates usage reports by running the compiler in `-MM` mode over
/// every source of a directory.
#[derive(Debug, Clone)]
pub struct DepfileGenerator {
    pub build_dir: PathBuf,
    pub toolchain: Toolchain,
    pub flags: CompileFlags,
    pub excluded: Vec<String>,
    pub strict: bool,
}

impl DepfileGenerator {
    fn run_tool(
        &self,
        mut command: Command,
        tool: &str,
        dir: &Path,
        failures: &mut Vec<String>,
    ) -> Result<()> {
        debug!("$ {}", format_command(&command));
        let status = command.status().map_err(|source| ResolveError::ToolUnavailable {
            tool: tool.to_string(),
            source,
        })?;

        if !status.success() {
            let failure = ResolveError::ToolInvocationFailure {
                tool: tool.to_string(),
                dir: dir.to_path_buf(),
                status,
            };
            if self.strict {
                return Err(failure);
            }
            warn!("{failure}; continuing with partial usage report");
            failures.push(failure.to_string());
        }
        Ok(())
    }
}

impl ReportGenerator for DepfileGenerator {
    fn generate(&self, source_dir: &Path, include_flags: &IncludeFlagSet) -> Result<UsageReport> {
        let path = report_path(&self.build_dir, source_dir);
        let unreadable = |source: std::io::Error| ResolveError::ArtifactUnreadable {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(unreadable)?;
        }
        // Start from an empty artifact so an earlier run can never leak in.
        File::create(&path).map_err(unreadable)?;

        let include_args = include_flags.to_args();
        let mut failures = Vec::new();
        for source in find_sources(source_dir, &self.excluded)? {
            let tool = self.toolchain.compiler(source.kind);
            let out = OpenOptions::new()
                .append(true)
                .open(&path)
                .map_err(unreadable)?;

            let mut command = Command::new(tool);
            command
                .args(self.flags.args_for(source.kind))
                .args(&include_args)
                .arg("-MM")
                .arg(&source.path)
                .stdout(Stdio::from(out));

            self.run_tool(command, tool, source_dir, &mut failures)?;
        }

        let mut report = UsageReport::read(&path)?;
        report.failures = failures;
        Ok(report)
    }
}

/// Finds the libraries a directory's sources use.
pub struct HeaderUsageScanner<'a, G> {
    generator: G,
    catalog: &'a LibraryCatalog,
    matcher: LibraryMatcher,
}

/// Result of scanning one directory.
#[derive(Debug, Clone)]
pub struct Scan {
    pub libraries: BTreeSet<LibraryRoot>,
    pub report: PathBuf,
    pub failures: Vec<String>,
}

impl<'a, G: ReportGenerator> HeaderUsageScanner<'a, G> {
    pub fn new(generator: G, catalog: &'a LibraryCatalog) -> Result<Self> {
        Ok(Self {
            generator,
            matcher: LibraryMatcher::new(catalog)?,
            catalog,
        })
    }

    pub fn catalog(&self) -> &LibraryCatalog {
        self.catalog
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Generates and parses the usage report for `source_dir`.
    pub fn scan(&self, source_dir: &Path, include_flags: &IncludeFlagSet) -> Result<Scan> {
        let report = self
            .generator
            .generate(source_dir, include_flags)
            .map_err(|e| ResolveError::scan_failed(source_dir, e))?;
        let libraries = self.matcher.libraries(&report, self.catalog);
        debug!(
            dir = %source_dir.display(),
            found = libraries.len(),
            "scanned usage report"
        );
        Ok(Scan {
            libraries,
            report: report.path,
            failures: report.failures,
        })
    }
}
