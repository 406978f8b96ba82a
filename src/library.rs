// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::{ResolveError, Result};

/// Directory names that never contribute include paths or sources.
pub const DEFAULT_EXCLUDED_SUBDIRS: &[&str] = &["examples"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryOrigin {
    /// Library shipped inside the project's own `lib/` directory.
    Local,
    /// Library from the SDK's standard library collection.
    Standard,
}

impl LibraryOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            LibraryOrigin::Local => "local",
            LibraryOrigin::Standard => "standard",
        }
    }
}

/// One self-contained library directory.
///
/// Identity is the path alone; two roots with the same path are the same
/// library regardless of how they were discovered.
#[derive(Debug, Clone, Serialize)]
pub struct LibraryRoot {
    path: PathBuf,
    origin: LibraryOrigin,
}

impl LibraryRoot {
    pub fn new(path: impl Into<PathBuf>, origin: LibraryOrigin) -> Self {
        Self {
            path: path.into(),
            origin,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn origin(&self) -> LibraryOrigin {
        self.origin
    }

    /// Base name of the library directory, e.g. `Servo`.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}

impl PartialEq for LibraryRoot {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for LibraryRoot {}

impl PartialOrd for LibraryRoot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LibraryRoot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path.cmp(&other.path)
    }
}

impl std::hash::Hash for LibraryRoot {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

/// A directory whose immediate subdirectories are library roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryCollection {
    pub dir: PathBuf,
    pub origin: LibraryOrigin,
}

impl LibraryCollection {
    pub fn local(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            origin: LibraryOrigin::Local,
        }
    }

    pub fn standard(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            origin: LibraryOrigin::Standard,
        }
    }
}

/// Every library root visible to a build, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct LibraryCatalog {
    collections: Vec<LibraryCollection>,
    roots: Vec<LibraryRoot>,
    by_path: BTreeMap<PathBuf, usize>,
}

impl LibraryCatalog {
    /// Lists the immediate subdirectories of each collection.
    ///
    /// Collection directories are canonicalized so that the paths handed to the
    /// compiler match the paths it writes back into usage reports. A collection
    /// that does not exist contributes no roots.
    pub fn discover(collections: &[LibraryCollection], excluded: &[String]) -> Result<Self> {
        let mut catalog = LibraryCatalog::default();

        for collection in collections {
            if !collection.dir.is_dir() {
                debug!(dir = %collection.dir.display(), "library collection absent, skipping");
                continue;
            }

            let dir = fs::canonicalize(&collection.dir)
                .map_err(|e| ResolveError::library_dir(&collection.dir, e))?;

            let mut subdirs = Vec::new();
            let entries = fs::read_dir(&dir).map_err(|e| ResolveError::library_dir(&dir, e))?;
            for entry in entries {
                let entry = entry.map_err(|e| ResolveError::library_dir(&dir, e))?;
                let path = entry.path();
                if !path.is_dir() {
                    continue;
                }
                if is_excluded(&path, excluded) {
                    continue;
                }
                subdirs.push(path);
            }
            subdirs.sort();

            for path in subdirs {
                catalog.insert(LibraryRoot::new(path, collection.origin));
            }

            catalog.collections.push(LibraryCollection {
                dir,
                origin: collection.origin,
            });
        }

        debug!(libraries = catalog.len(), "library candidates discovered");
        Ok(catalog)
    }

    /// Builds a catalog from already known roots.
    pub fn from_roots<I>(collections: Vec<LibraryCollection>, roots: I) -> Self
    where
        I: IntoIterator<Item = LibraryRoot>,
    {
        let mut catalog = LibraryCatalog {
            collections,
            ..Default::default()
        };
        for root in roots {
            catalog.insert(root);
        }
        catalog
    }

    fn insert(&mut self, root: LibraryRoot) -> bool {
        if self.by_path.contains_key(root.path()) {
            return false;
        }
        self.by_path.insert(root.path().to_path_buf(), self.roots.len());
        self.roots.push(root);
        true
    }

    pub fn collections(&self) -> &[LibraryCollection] {
        &self.collections
    }

    pub fn roots(&self) -> &[LibraryRoot] {
        &self.roots
    }

    pub fn get(&self, path: &Path) -> Option<&LibraryRoot> {
        self.by_path.get(path).and_then(|idx| self.roots.get(*idx))
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.by_path.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Returns true if the final component of `path` is one of `excluded`.
pub fn is_excluded(path: &Path, excluded: &[String]) -> bool {
    match path.file_name().and_then(|name| name.to_str()) {
        Some(name) => excluded.iter().any(|e| e == name),
        None => false,
    }
}

/// Default exclusion list as owned strings.
pub fn default_excluded() -> Vec<String> {
    DEFAULT_EXCLUDED_SUBDIRS
        .iter()
        .map(|name| name.to_string())
        .collect()
}
