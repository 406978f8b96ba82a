// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::config::{BoardConfig, ToolsConfig};
use crate::project::SourceKind;
use crate::sdk::SdkLayout;
use crate::utils::dedup;

/// The cross toolchain binaries driven by a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub cc: String,
    pub cxx: String,
    pub ar: String,
    pub objcopy: String,
}

impl From<&ToolsConfig> for Toolchain {
    fn from(tools: &ToolsConfig) -> Self {
        Self {
            cc: tools.cc.clone(),
            cxx: tools.cxx.clone(),
            ar: tools.ar.clone(),
            objcopy: tools.objcopy.clone(),
        }
    }
}

impl Toolchain {
    /// Compiler used for a source of the given kind.
    pub fn compiler(&self, kind: SourceKind) -> &str {
        match kind {
            SourceKind::C => &self.cc,
            SourceKind::Cxx | SourceKind::Sketch => &self.cxx,
        }
    }
}

/// Flags shared by every compilation and the final link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileFlags {
    pub cflags: Vec<String>,
    pub cxxflags: Vec<String>,
    pub elfflags: Vec<String>,
    /// Header force-included into sketches.
    pub sketch_header: Option<String>,
}

impl CompileFlags {
    pub fn for_board(board: &BoardConfig, sdk: &SdkLayout) -> Self {
        let mcu = format!("-mmcu={}", board.mcu);
        let cflags = vec![
            mcu.clone(),
            "-ffunction-sections".to_string(),
            "-fdata-sections".to_string(),
            "-g".to_string(),
            "-Os".to_string(),
            "-w".to_string(),
            format!("-DF_CPU={}", board.f_cpu),
            format!("-DARDUINO={}", sdk.version()),
            format!("-I{}", sdk.core_dir.display()),
        ];

        Self {
            cflags,
            cxxflags: vec!["-fno-exceptions".to_string()],
            elfflags: vec!["-Os".to_string(), "-Wl,--gc-sections".to_string(), mcu],
            sketch_header: Some(sdk.core_header().to_string()),
        }
    }

    /// Arguments for compiling a source of `kind`, excluding the file itself.
    pub fn args_for(&self, kind: SourceKind) -> Vec<String> {
        let mut args = self.cflags.clone();
        match kind {
            SourceKind::C => {}
            SourceKind::Cxx => args.extend(self.cxxflags.iter().cloned()),
            SourceKind::Sketch => {
                args.extend(self.cxxflags.iter().cloned());
                args.push("-x".to_string());
                args.push("c++".to_string());
                if let Some(header) = &self.sketch_header {
                    args.push("-include".to_string());
                    args.push(header.clone());
                }
            }
        }
        args
    }

    /// Appends include directories to the C flags, skipping duplicates.
    pub fn add_includes(&mut self, include_args: Vec<String>) {
        self.cflags.extend(include_args);
        dedup(&mut self.cflags);
    }
}
