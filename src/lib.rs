// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Use README.md as crate documentation.
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

pub mod config;
pub mod driver;
mod engine;
mod error;
pub mod include_paths;
pub mod library;
pub mod plan;
pub mod project;
pub mod resolver;
pub mod scanner;
pub mod sdk;
pub mod toolchain;
pub mod usage_report;
mod utils;

pub use config::BuildConfig;
pub use engine::{clean, Engine};
pub use error::{ResolveError, Result};
pub use include_paths::{build_include_flags, IncludeFlagSet};
pub use library::{LibraryCatalog, LibraryCollection, LibraryOrigin, LibraryRoot};
pub use plan::{BuildPlan, BuildPlanAssembler};
pub use resolver::{DependencyResolver, ResolvedDependencies};
pub use scanner::{DepfileGenerator, HeaderUsageScanner, ReportGenerator};
pub use usage_report::{LibraryMatcher, UsageReport};

#[cfg(test)]
mod tests;
