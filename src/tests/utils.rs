// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::process::Command;

use crate::utils::{dedup, format_command};

#[test]
fn dedup_keeps_first_occurrence() {
    let mut flags: Vec<String> = ["-Os", "-Ia", "-Os", "-Ib", "-Ia"]
        .iter()
        .map(|flag| flag.to_string())
        .collect();
    dedup(&mut flags);
    assert_eq!(flags, vec!["-Os", "-Ia", "-Ib"]);
}

#[test]
fn format_command_joins_program_and_args() {
    let mut command = Command::new("avr-gcc");
    command.args(["-MM", "main.cpp"]);
    assert_eq!(format_command(&command), "avr-gcc -MM main.cpp");
}
