// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Error type for library discovery and dependency resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The dependency generation tool could not be started at all.
    #[error("failed to spawn `{tool}`: {source}")]
    ToolUnavailable {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The dependency generation tool ran but exited unsuccessfully.
    #[error("`{tool}` exited with {status} while scanning {}", .dir.display())]
    ToolInvocationFailure {
        tool: String,
        dir: PathBuf,
        status: ExitStatus,
    },

    /// The usage report could not be written or read back.
    #[error("usage report {} is unreadable: {source}", .path.display())]
    ArtifactUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A library root or collection could not be listed.
    #[error("cannot list library directory {}: {source}", .path.display())]
    LibraryDirUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The collection path cannot be expressed as a matcher pattern.
    #[error("library collection {} is not valid UTF-8", .dir.display())]
    InvalidCollection { dir: PathBuf },

    /// A fatal error raised while scanning one directory.
    #[error("dependency scan of {} failed", .dir.display())]
    ScanFailed {
        dir: PathBuf,
        #[source]
        source: Box<ResolveError>,
    },
}

impl ResolveError {
    pub(crate) fn scan_failed(dir: impl Into<PathBuf>, source: ResolveError) -> Self {
        ResolveError::ScanFailed {
            dir: dir.into(),
            source: Box::new(source),
        }
    }

    pub(crate) fn library_dir(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ResolveError::LibraryDirUnreadable {
            path: path.into(),
            source,
        }
    }
}

impl From<walkdir::Error> for ResolveError {
    fn from(error: walkdir::Error) -> Self {
        let path = error.path().map(PathBuf::from).unwrap_or_default();
        let source = error
            .into_io_error()
            .unwrap_or_else(|| io::Error::other("filesystem loop detected"));
        ResolveError::LibraryDirUnreadable { path, source }
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
