// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::{ResolveError, Result};
use crate::library::{LibraryCatalog, LibraryRoot};

/// Header usage listing produced for one source directory.
#[derive(Debug, Clone, Default)]
pub struct UsageReport {
    pub path: PathBuf,
    pub contents: String,
    /// Non-fatal tool failures that occurred while producing the report.
    pub failures: Vec<String>,
}

impl UsageReport {
    /// Reads a report artifact from disk.
    pub fn read(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).map_err(|source| ResolveError::ArtifactUnreadable {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            contents,
            failures: Vec::new(),
        })
    }

    pub fn from_contents(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
            failures: Vec::new(),
        }
    }
}

/// Extracts library roots from usage report text.
///
/// A line matches a collection when it contains the collection directory,
/// a separator, a root name and at least one further separator. The trailing
/// separator is what keeps `Foo` from matching `FooBar/x.h` and what keeps the
/// root's own directory entry from counting as a use.
///
/// Paths are accepted both raw and in the make escaping compilers use for
/// dependency listings (`\ ` for a space, `\#` for `#`, `$$` for `$`).
#[derive(Debug, Clone)]
pub struct LibraryMatcher {
    patterns: Vec<Regex>,
}

impl LibraryMatcher {
    pub fn new(catalog: &LibraryCatalog) -> Result<Self> {
        let sep = separator_class();
        let mut patterns = Vec::new();
        for collection in catalog.collections() {
            let dir = collection
                .dir
                .to_str()
                .ok_or_else(|| ResolveError::InvalidCollection {
                    dir: collection.dir.clone(),
                })?;
            let dir = escaped_dir_pattern(dir.trim_end_matches(['/', '\\']));
            let pattern =
                format!(r"(?:^|\s)(?P<libdir>{dir}{sep}(?:\\[ #]|[^/\\\s])+){sep}");
            let regex = Regex::new(&pattern).map_err(|_| ResolveError::InvalidCollection {
                dir: collection.dir.clone(),
            })?;
            patterns.push(regex);
        }
        Ok(Self { patterns })
    }

    /// Returns the distinct library directories named by one line.
    pub fn match_line(&self, line: &str) -> BTreeSet<PathBuf> {
        let mut dirs = BTreeSet::new();
        for pattern in &self.patterns {
            for captures in pattern.captures_iter(line) {
                if let Some(libdir) = captures.name("libdir") {
                    dirs.insert(PathBuf::from(unescape_make(libdir.as_str()).as_ref()));
                }
            }
        }
        dirs
    }

    /// Returns every catalog root implicated by `report`, once each.
    pub fn libraries(
        &self,
        report: &UsageReport,
        catalog: &LibraryCatalog,
    ) -> BTreeSet<LibraryRoot> {
        let mut used = BTreeSet::new();
        for line in report.contents.lines() {
            for dir in self.match_line(line) {
                if let Some(root) = catalog.get(&dir) {
                    used.insert(root.clone());
                }
            }
        }
        used
    }
}

fn separator_class() -> &'static str {
    if cfg!(windows) {
        r"[/\\]"
    } else {
        "/"
    }
}

/// Regex for `dir` that also accepts its make-escaped spelling.
fn escaped_dir_pattern(dir: &str) -> String {
    let mut pattern = String::with_capacity(dir.len());
    for c in dir.chars() {
        match c {
            ' ' => pattern.push_str(r"\\? "),
            '#' => pattern.push_str(r"\\?[#]"),
            '$' => pattern.push_str(r"\$\$?"),
            c => pattern.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    pattern
}

/// Undoes the escaping of a path taken from a dependency listing.
pub fn unescape_make(path: &str) -> Cow<'_, str> {
    if !path.contains(['\\', '$']) {
        return Cow::Borrowed(path);
    }
    let mut out = String::with_capacity(path.len());
    let mut chars = path.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('\\', Some(&next @ (' ' | '#'))) | ('$', Some(&next @ '$')) => {
                out.push(next);
                chars.next();
            }
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
