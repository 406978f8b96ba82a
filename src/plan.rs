// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::path::PathBuf;

use crate::error::Result;
use crate::include_paths::{build_include_flags, IncludeFlagSet};
use crate::library::LibraryRoot;
use crate::resolver::ResolvedDependencies;
use crate::toolchain::CompileFlags;

/// Everything the build driver needs to compile and link the firmware.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub flags: CompileFlags,
    pub include_flags: IncludeFlagSet,
    /// Libraries whose sources are compiled and archived alongside the project.
    pub libraries: Vec<LibraryRoot>,
    pub reports: Vec<PathBuf>,
}

pub struct BuildPlanAssembler {
    excluded: Vec<String>,
}

impl BuildPlanAssembler {
    pub fn new(excluded: &[String]) -> Self {
        Self {
            excluded: excluded.to_vec(),
        }
    }

    /// Extends `flags` with the include paths of the resolved libraries.
    pub fn assemble(
        &self,
        mut flags: CompileFlags,
        resolved: &ResolvedDependencies,
    ) -> Result<BuildPlan> {
        let include_flags = build_include_flags(resolved.library_paths(), &self.excluded)?;
        flags.add_includes(include_flags.to_args());

        Ok(BuildPlan {
            flags,
            include_flags,
            libraries: resolved.libraries.iter().cloned().collect(),
            reports: resolved.reports.clone(),
        })
    }
}
