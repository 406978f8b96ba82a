// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use fwforge::{BuildConfig, Engine, LibraryRoot};

/// Options that override values from fwforge.yaml.
#[derive(Args, Debug)]
struct BuildOptions {
    /// Arduino software distribution directory.
    #[arg(long, env = "ARDUINO_DIR", value_name = "DIR")]
    arduino_dist: Option<PathBuf>,

    /// Target MCU, e.g. atmega328p.
    #[arg(long)]
    board_mcu: Option<String>,

    /// CPU frequency define, e.g. 16000000L.
    #[arg(long)]
    f_cpu: Option<String>,

    /// Treat failing dependency scans as fatal.
    #[arg(long)]
    strict: bool,
}

impl BuildOptions {
    fn apply(&self, config: &mut BuildConfig) {
        if let Some(dist) = &self.arduino_dist {
            config.arduino_dist = Some(dist.clone());
        }
        if let Some(mcu) = &self.board_mcu {
            config.board.mcu = mcu.clone();
        }
        if let Some(f_cpu) = &self.f_cpu {
            config.board.f_cpu = f_cpu.clone();
        }
        if self.strict {
            config.strict_scan = true;
        }
    }
}

#[derive(Subcommand, Debug)]
enum FwforgeCommand {
    /// Build the firmware of the project.
    Build {
        #[command(flatten)]
        options: BuildOptions,
    },

    /// Resolve and print the libraries the project uses.
    Deps {
        #[command(flatten)]
        options: BuildOptions,

        /// Print the resolution as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Remove the build output directory.
    Clean,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"))]
struct Cli {
    /// Project root directory.
    #[arg(long, short, default_value = ".")]
    project: PathBuf,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: FwforgeCommand,
}

#[derive(Serialize)]
struct DepsOutput<'a> {
    libraries: Vec<&'a LibraryRoot>,
    scanned: &'a [PathBuf],
    include_flags: Vec<String>,
    failures: &'a [String],
}

fn load_engine(project: &Path, options: &BuildOptions) -> Result<Engine> {
    let mut config = BuildConfig::load(project)?;
    options.apply(&mut config);
    Engine::new(project, config)
}

fn fwforge_build(project: &Path, options: &BuildOptions) -> Result<()> {
    let engine = load_engine(project, options)?;
    let hex = engine.build()?;
    println!("{}", hex.display());
    Ok(())
}

fn fwforge_deps(project: &Path, options: &BuildOptions, json: bool) -> Result<()> {
    let engine = load_engine(project, options)?;
    let resolved = engine.resolve()?;
    let plan = engine.plan(&resolved)?;

    let output = DepsOutput {
        libraries: resolved.libraries.iter().collect(),
        scanned: &resolved.scanned,
        include_flags: plan.include_flags.to_args(),
        failures: &resolved.failures,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if output.libraries.is_empty() {
        println!("no library dependencies");
    }
    for library in &output.libraries {
        println!("{} ({:?})\t{}", library.name(), library.origin(), library.path().display());
    }
    for flag in &output.include_flags {
        println!("  {flag}");
    }
    Ok(())
}

fn main() -> Result<()> {
    // Parse and dispatch command.
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match &cli.command {
        FwforgeCommand::Build { options } => fwforge_build(&cli.project, options),
        FwforgeCommand::Deps { options, json } => fwforge_deps(&cli.project, options, *json),
        FwforgeCommand::Clean => fwforge::clean(&cli.project),
    }
}
