// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::{BTreeSet, VecDeque};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::include_paths::{build_include_flags, IncludeFlagSet};
use crate::library::LibraryRoot;
use crate::scanner::{HeaderUsageScanner, ReportGenerator};

/// Transitively closed set of libraries a project uses.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolvedDependencies {
    pub libraries: BTreeSet<LibraryRoot>,
    /// Directories in the order they were scanned, project first.
    pub scanned: Vec<PathBuf>,
    /// Usage report artifacts, one per scanned directory.
    pub reports: Vec<PathBuf>,
    /// Non-fatal tool failures encountered while scanning.
    pub failures: Vec<String>,
}

impl ResolvedDependencies {
    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }

    pub fn library_paths(&self) -> impl Iterator<Item = &Path> {
        self.libraries.iter().map(LibraryRoot::path)
    }
}

/// Computes the fixed point of "directory uses library" over a catalog.
pub struct DependencyResolver<'s, 'c, G> {
    scanner: &'s HeaderUsageScanner<'c, G>,
    excluded: Vec<String>,
}

impl<'s, 'c, G: ReportGenerator> DependencyResolver<'s, 'c, G> {
    pub fn new(scanner: &'s HeaderUsageScanner<'c, G>, excluded: &[String]) -> Self {
        Self {
            scanner,
            excluded: excluded.to_vec(),
        }
    }

    /// Resolves every library reachable from `project_src`.
    ///
    /// Every scan sees the include paths of the whole catalog, so a library's
    /// headers resolve no matter which library pulls them in. Libraries are
    /// kept on a worklist and each directory is scanned at most once; since
    /// the catalog is finite the loop ends even when libraries include each
    /// other.
    pub fn resolve(&self, project_src: &Path) -> Result<ResolvedDependencies> {
        let catalog = self.scanner.catalog();
        let include_flags: IncludeFlagSet =
            build_include_flags(catalog.roots().iter().map(LibraryRoot::path), &self.excluded)?;

        let mut resolved = ResolvedDependencies::default();
        let mut scanned: BTreeSet<PathBuf> = BTreeSet::new();
        let mut worklist: VecDeque<LibraryRoot> = VecDeque::new();

        let initial = self.scanner.scan(project_src, &include_flags)?;
        resolved.scanned.push(project_src.to_path_buf());
        resolved.reports.push(initial.report);
        resolved.failures.extend(initial.failures);
        for library in initial.libraries {
            if resolved.libraries.insert(library.clone()) {
                worklist.push_back(library);
            }
        }

        while let Some(library) = worklist.pop_front() {
            if !scanned.insert(library.path().to_path_buf()) {
                continue;
            }

            let scan = self.scanner.scan(library.path(), &include_flags)?;
            resolved.scanned.push(library.path().to_path_buf());
            resolved.reports.push(scan.report);
            resolved.failures.extend(scan.failures);

            for found in scan.libraries {
                if resolved.libraries.insert(found.clone()) {
                    debug!(library = %found.name(), by = %library.name(), "discovered dependency");
                    worklist.push_back(found);
                }
            }
        }

        info!(
            libraries = resolved.libraries.len(),
            scans = resolved.scanned.len(),
            "dependency resolution reached a fixed point"
        );
        Ok(resolved)
    }
}
