// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Shared fixtures for tests that need real directory trees.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempDir;

use crate::error::{ResolveError, Result as ResolveResult};
use crate::include_paths::IncludeFlagSet;
use crate::library::{LibraryCatalog, LibraryCollection, LibraryOrigin};
use crate::scanner::ReportGenerator;
use crate::usage_report::UsageReport;

/// A project with a `src` directory, a local `lib` collection and an SDK
/// `libraries` collection inside a temporary directory.
pub struct Fixture {
    _dir: TempDir,
    pub root: PathBuf,
}

impl Fixture {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let root = dir.path().canonicalize()?;
        fs::create_dir_all(root.join("project/src"))?;
        fs::create_dir_all(root.join("project/lib"))?;
        fs::create_dir_all(root.join("sdk/libraries"))?;
        Ok(Self { _dir: dir, root })
    }

    pub fn src_dir(&self) -> PathBuf {
        self.root.join("project/src")
    }

    pub fn local_dir(&self) -> PathBuf {
        self.root.join("project/lib")
    }

    pub fn standard_dir(&self) -> PathBuf {
        self.root.join("sdk/libraries")
    }

    pub fn collection_dir(&self, origin: LibraryOrigin) -> PathBuf {
        match origin {
            LibraryOrigin::Local => self.local_dir(),
            LibraryOrigin::Standard => self.standard_dir(),
        }
    }

    /// Creates `relative` (which may be nested) under the given collection.
    pub fn add_dir(&self, origin: LibraryOrigin, relative: &str) -> Result<PathBuf> {
        let path = self.collection_dir(origin).join(relative);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    pub fn collections(&self) -> Vec<LibraryCollection> {
        vec![
            LibraryCollection::local(self.local_dir()),
            LibraryCollection::standard(self.standard_dir()),
        ]
    }

    pub fn catalog(&self) -> Result<LibraryCatalog> {
        Ok(LibraryCatalog::discover(
            &self.collections(),
            &crate::library::default_excluded(),
        )?)
    }

    /// Expands `$SRC`, `$LIB` and `$SDK` in report text.
    pub fn expand(&self, text: &str) -> String {
        text.replace("$SRC", &self.src_dir().display().to_string())
            .replace("$LIB", &self.local_dir().display().to_string())
            .replace("$SDK", &self.standard_dir().display().to_string())
    }
}

/// Report generator that serves canned report text keyed by directory name.
#[derive(Default)]
pub struct CannedReports {
    pub reports: BTreeMap<String, String>,
    pub unreadable: Vec<String>,
    pub calls: RefCell<Vec<PathBuf>>,
}

impl CannedReports {
    pub fn calls_for(&self, dir: &Path) -> usize {
        self.calls.borrow().iter().filter(|d| d.as_path() == dir).count()
    }
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl ReportGenerator for CannedReports {
    fn generate(&self, source_dir: &Path, _flags: &IncludeFlagSet) -> ResolveResult<UsageReport> {
        self.calls.borrow_mut().push(source_dir.to_path_buf());
        let name = dir_name(source_dir);
        let path = source_dir.join("dependencies.d");
        if self.unreadable.contains(&name) {
            return Err(ResolveError::ArtifactUnreadable {
                path,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no report"),
            });
        }
        let contents = self.reports.get(&name).cloned().unwrap_or_default();
        Ok(UsageReport::from_contents(path, contents))
    }
}
