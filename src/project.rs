// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use walkdir::WalkDir;

use crate::error::Result;
use crate::library::{is_excluded, LibraryCollection};

/// Standard directories of a project.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub src_dir: PathBuf,
    pub lib_dir: PathBuf,
    pub build_dir: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: &Path) -> anyhow::Result<Self> {
        let root = root
            .canonicalize()
            .with_context(|| format!("project directory {} not found", root.display()))?;
        let src_dir = root.join("src");
        if !src_dir.is_dir() {
            bail!(
                "{} has no `src` directory; run from a project root",
                root.display()
            );
        }
        Ok(Self {
            lib_dir: root.join("lib"),
            build_dir: root.join(".build"),
            src_dir,
            root,
        })
    }

    pub fn local_libraries(&self) -> LibraryCollection {
        LibraryCollection::local(&self.lib_dir)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    C,
    Cxx,
    /// `.ino`/`.pde` sketch, compiled as C++ with the core header forced in.
    Sketch,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext {
            "c" => Some(SourceKind::C),
            "cpp" | "cc" | "cxx" => Some(SourceKind::Cxx),
            "ino" | "pde" => Some(SourceKind::Sketch),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub kind: SourceKind,
}

impl SourceFile {
    /// Object file name for this source, e.g. `Servo.cpp.o`.
    pub fn object_name(&self, dir: &Path) -> String {
        let relative = self.path.strip_prefix(dir).unwrap_or(self.path.as_path());
        let mut name = relative.to_string_lossy().replace(['/', '\\'], "_");
        name.push_str(".o");
        name
    }
}

/// Recursively lists compilable sources under `dir` in a stable order.
pub fn find_sources(dir: &Path, excluded: &[String]) -> Result<Vec<SourceFile>> {
    let mut sources = Vec::new();
    let walker = WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry.path(), excluded));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(kind) = SourceKind::from_path(entry.path()) {
            sources.push(SourceFile {
                path: entry.into_path(),
                kind,
            });
        }
    }

    Ok(sources)
}
