// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{ResolveError, Result};
use crate::library::is_excluded;

/// Ordered, duplicate-free list of include directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeFlagSet {
    dirs: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
}

impl IncludeFlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `dir` unless an entry with the same canonical path exists.
    pub fn push(&mut self, dir: impl Into<PathBuf>) -> bool {
        let dir = dir.into();
        if !self.seen.insert(canonical_key(&dir)) {
            return false;
        }
        self.dirs.push(dir);
        true
    }

    pub fn extend(&mut self, other: &IncludeFlagSet) {
        for dir in &other.dirs {
            self.push(dir.clone());
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// True if `dir` or another spelling of the same directory is present.
    pub fn contains(&self, dir: &Path) -> bool {
        self.seen.contains(&canonical_key(dir))
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Renders the set as `-I<dir>` compiler arguments.
    pub fn to_args(&self) -> Vec<String> {
        self.dirs
            .iter()
            .map(|dir| format!("-I{}", dir.display()))
            .collect()
    }
}

fn canonical_key(dir: &Path) -> PathBuf {
    fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf())
}

/// Computes the recursive include flags for `roots`.
///
/// Each root is followed by its subdirectories in depth-first, name-sorted
/// order. Directories named in `excluded` are pruned along with everything
/// beneath them, at any depth.
pub fn build_include_flags<'a, I>(roots: I, excluded: &[String]) -> Result<IncludeFlagSet>
where
    I: IntoIterator<Item = &'a Path>,
{
    let mut flags = IncludeFlagSet::new();

    for root in roots {
        if !root.is_dir() {
            return Err(ResolveError::library_dir(
                root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            ));
        }

        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry.path(), excluded));

        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_dir() {
                flags.push(entry.into_path());
            }
        }
    }

    Ok(flags)
}
