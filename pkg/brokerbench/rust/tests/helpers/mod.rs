// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::path::Path;
use std::process::{Command, Output};

pub const HEADER: &str =
    "ObservationSet,Experiment,Broker,Time,ActiveProcs,CPU(%),NetSent(KB/s),NetRecv(KB/s)";

/// Run the brokerbench binary to completion with the given arguments.
pub fn run_brokerbench(args: &[&str]) -> Output {
    let bin = env!("CARGO_BIN_EXE_brokerbench");
    Command::new(bin)
        .args(args)
        .env_remove("BROKERBENCH_CONFIG")
        .output()
        .expect("failed to run brokerbench")
}

/// stdout and stderr of a finished run, concatenated.
pub fn combined_output(output: &Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

/// Write a dataset file from `(observation, experiment, broker, time, cpu)`
/// tuples; network columns are fixed at 1.0 sent and 2.0 received.
pub fn write_dataset(path: &Path, rows: &[(u32, u32, &str, u32, f64)]) {
    let mut contents = String::from(HEADER);
    contents.push('\n');
    for (observation, experiment, broker, time, cpu) in rows {
        contents.push_str(&format!(
            "{observation},{experiment},{broker},{time},1,{cpu},1.0,2.0\n"
        ));
    }
    std::fs::write(path, contents).expect("failed to write dataset");
}
