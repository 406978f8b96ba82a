// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Drives the cross toolchain over a [`BuildPlan`].
//!
//! The SDK core and every resolved library are compiled into static
//! archives, the project's own sources into plain objects, and the result is
//! linked into `firmware.elf` and converted to `firmware.hex`. Everything is
//! rebuilt on each run.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use tracing::info;

use crate::library::LibraryRoot;
use crate::plan::BuildPlan;
use crate::project::find_sources;
use crate::toolchain::Toolchain;
use crate::utils::{log_step, run_command};

pub const FIRMWARE_ELF: &str = "firmware.elf";
pub const FIRMWARE_HEX: &str = "firmware.hex";

pub struct BuildDriver<'a> {
    toolchain: &'a Toolchain,
    build_dir: PathBuf,
    excluded: Vec<String>,
}

impl<'a> BuildDriver<'a> {
    pub fn new(toolchain: &'a Toolchain, build_dir: &Path, excluded: &[String]) -> Self {
        Self {
            toolchain,
            build_dir: build_dir.to_path_buf(),
            excluded: excluded.to_vec(),
        }
    }

    /// Builds the firmware image and returns the path of the hex file.
    pub fn build(&self, plan: &BuildPlan, project_src: &Path, core_dir: &Path) -> Result<PathBuf> {
        log_step("Compiling core");
        let core_objects = self.compile_unit("core", core_dir, plan)?;
        let core = self.archive("core", &core_objects)?;

        let mut archives = Vec::new();
        for library in &plan.libraries {
            let unit = library_unit(library);
            log_step(&format!("Compiling library {}", library.name()));
            let objects = self.compile_unit(&unit, library.path(), plan)?;
            if objects.is_empty() {
                continue;
            }
            archives.push(self.archive(&unit, &objects)?);
        }
        archives.push(core);

        log_step("Compiling project");
        let objects = self.compile_unit("src", project_src, plan)?;

        log_step("Linking");
        let elf = self.link(&objects, &archives, plan)?;
        let hex = self.extract_hex(&elf)?;

        info!(firmware = %hex.display(), "firmware image ready");
        Ok(hex)
    }

    fn unit_dir(&self, unit: &str) -> Result<PathBuf> {
        let dir = self.build_dir.join(unit);
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create build directory {}", dir.display()))?;
        Ok(dir)
    }

    fn compile_unit(
        &self,
        unit: &str,
        source_dir: &Path,
        plan: &BuildPlan,
    ) -> Result<Vec<PathBuf>> {
        let out_dir = self.unit_dir(unit)?;
        let sources = find_sources(source_dir, &self.excluded)
            .with_context(|| format!("failed to list sources of {}", source_dir.display()))?;

        let mut objects = Vec::new();
        for source in sources {
            let object = out_dir.join(source.object_name(source_dir));
            let mut command = Command::new(self.toolchain.compiler(source.kind));
            command
                .args(plan.flags.args_for(source.kind))
                .arg("-c")
                .arg(&source.path)
                .arg("-o")
                .arg(&object);
            run_command(command, &format!("compile {}", source.path.display()))?;
            objects.push(object);
        }
        Ok(objects)
    }

    fn archive(&self, unit: &str, objects: &[PathBuf]) -> Result<PathBuf> {
        let archive = self.build_dir.join(format!("lib{unit}.a"));
        if archive.exists() {
            fs::remove_file(&archive)
                .with_context(|| format!("failed to remove stale {}", archive.display()))?;
        }

        let mut command = Command::new(&self.toolchain.ar);
        command.arg("rcs").arg(&archive).args(objects);
        run_command(command, &format!("archive lib{unit}.a"))?;
        Ok(archive)
    }

    fn link(&self, objects: &[PathBuf], archives: &[PathBuf], plan: &BuildPlan) -> Result<PathBuf> {
        let elf = self.build_dir.join(FIRMWARE_ELF);
        let mut command = Command::new(&self.toolchain.cc);
        command
            .args(&plan.flags.elfflags)
            .arg("-o")
            .arg(&elf)
            .args(objects)
            .args(archives)
            .arg("-lm");
        run_command(command, "link")?;
        Ok(elf)
    }

    fn extract_hex(&self, elf: &Path) -> Result<PathBuf> {
        let hex = self.build_dir.join(FIRMWARE_HEX);
        let mut command = Command::new(&self.toolchain.objcopy);
        command
            .args(["-O", "ihex", "-R", ".eeprom"])
            .arg(elf)
            .arg(&hex);
        run_command(command, "objcopy")?;
        Ok(hex)
    }
}

/// Build unit of a library, e.g. `standard-Servo`.
///
/// The origin prefix keeps a local and a standard library of the same name
/// apart, and keeps libraries clear of the `core` and `src` units.
pub fn library_unit(library: &LibraryRoot) -> String {
    format!("{}-{}", library.origin().as_str(), library.name())
}
