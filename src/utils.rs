// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::HashSet;
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

/// Runs a command, logs the command line, and maps a failing exit status to an error.
pub fn run_command(mut command: Command, label: &str) -> Result<()> {
    debug!("$ {}", format_command(&command));

    let status = command
        .status()
        .with_context(|| format!("failed to spawn {}", label))?;
    if !status.success() {
        bail!(
            "{} failed with status {}\n  command: {}",
            label,
            status,
            format_command(&command)
        );
    }

    Ok(())
}

/// Logs a heading for the upcoming build step.
pub fn log_step(title: &str) {
    info!("=== {} ===", title);
}

/// Renders `command` as a shell-like line for logs and error messages.
pub fn format_command(command: &Command) -> String {
    std::iter::once(command.get_program())
        .chain(command.get_args())
        .map(|part| part.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drops repeated flags, keeping the first occurrence of each.
pub fn dedup(values: &mut Vec<String>) {
    let mut seen = HashSet::new();
    values.retain(|value| seen.insert(value.clone()));
}
