// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};

use crate::config::BuildConfig;
use crate::driver::BuildDriver;
use crate::library::LibraryCatalog;
use crate::plan::{BuildPlan, BuildPlanAssembler};
use crate::project::ProjectLayout;
use crate::resolver::{DependencyResolver, ResolvedDependencies};
use crate::scanner::{DepfileGenerator, HeaderUsageScanner};
use crate::sdk::SdkLayout;
use crate::toolchain::{CompileFlags, Toolchain};

/// The firmware build engine for one project.
#[derive(Debug, Clone)]
pub struct Engine {
    config: BuildConfig,
    layout: ProjectLayout,
    sdk: SdkLayout,
    toolchain: Toolchain,
}

impl Engine {
    pub fn new(project_root: &Path, config: BuildConfig) -> Result<Self> {
        let layout = ProjectLayout::new(project_root)?;
        let dist = config.arduino_dist.clone().ok_or_else(|| {
            anyhow!("Arduino distribution not configured; pass --arduino-dist or set ARDUINO_DIR")
        })?;
        let sdk = SdkLayout::discover(&dist, config.arduino_version)?;
        let toolchain = Toolchain::from(&config.tools);

        Ok(Self {
            config,
            layout,
            sdk,
            toolchain,
        })
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn sdk(&self) -> &SdkLayout {
        &self.sdk
    }

    pub fn base_flags(&self) -> CompileFlags {
        CompileFlags::for_board(&self.config.board, &self.sdk)
    }

    /// Lists the project-local and standard library candidates.
    pub fn catalog(&self) -> Result<LibraryCatalog> {
        let collections = [self.layout.local_libraries(), self.sdk.standard_libraries()];
        Ok(LibraryCatalog::discover(
            &collections,
            &self.config.excluded_subdirs,
        )?)
    }

    fn generator(&self) -> DepfileGenerator {
        DepfileGenerator {
            build_dir: self.layout.build_dir.clone(),
            toolchain: self.toolchain.clone(),
            flags: self.base_flags(),
            excluded: self.config.excluded_subdirs.clone(),
            strict: self.config.strict_scan,
        }
    }

    /// Resolves the libraries the project transitively uses.
    pub fn resolve(&self) -> Result<ResolvedDependencies> {
        let catalog = self.catalog()?;
        let scanner = HeaderUsageScanner::new(self.generator(), &catalog)?;
        let resolver = DependencyResolver::new(&scanner, &self.config.excluded_subdirs);
        let resolved = resolver
            .resolve(&self.layout.src_dir)
            .context("dependency resolution failed")?;

        for failure in &resolved.failures {
            warn!("usage report may be incomplete: {failure}");
        }
        Ok(resolved)
    }

    pub fn plan(&self, resolved: &ResolvedDependencies) -> Result<BuildPlan> {
        let assembler = BuildPlanAssembler::new(&self.config.excluded_subdirs);
        Ok(assembler.assemble(self.base_flags(), resolved)?)
    }

    /// Resolves, plans and builds the firmware, returning the hex image path.
    pub fn build(&self) -> Result<PathBuf> {
        let resolved = self.resolve()?;
        for library in &resolved.libraries {
            info!(library = %library.name(), origin = ?library.origin(), "using library");
        }

        let plan = self.plan(&resolved)?;
        let driver = BuildDriver::new(
            &self.toolchain,
            &self.layout.build_dir,
            &self.config.excluded_subdirs,
        );
        driver.build(&plan, &self.layout.src_dir, &self.sdk.core_dir)
    }
}

/// Removes the build-output area of the project at `project_root`.
pub fn clean(project_root: &Path) -> Result<()> {
    let layout = ProjectLayout::new(project_root)?;
    if layout.build_dir.exists() {
        std::fs::remove_dir_all(&layout.build_dir)
            .with_context(|| format!("failed to remove {}", layout.build_dir.display()))?;
        info!(dir = %layout.build_dir.display(), "removed build directory");
    }
    Ok(())
}
