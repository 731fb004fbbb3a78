// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Compare the CPU and network footprint of message brokers
#[derive(Parser, Debug)]
#[command(name = "brokerbench", version)]
#[command(about = "Sample broker processes, gate runs on operator review, chart the results")]
pub struct Args {
    /// Log every state transition and skipped tick
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sample the target processes once and print summary statistics
    Monitor {
        /// Process names to track, descendants included
        #[arg(short, long, num_args = 1.., default_values = ["mosquitto", "server"])]
        processes: Vec<String>,

        /// Total duration in seconds
        #[arg(short, long, default_value = "30")]
        duration: u64,

        /// Sampling interval in seconds
        #[arg(short, long, default_value = "1")]
        interval: u64,
    },

    /// Run the experiment suite with operator confirmation and review
    Collect {
        /// Suite file (YAML); falls back to BROKERBENCH_CONFIG
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Accepted runs required per experiment and broker
        #[arg(short = 'k', long)]
        observations: Option<u32>,

        /// Duration of each run in seconds
        #[arg(short, long)]
        duration: Option<u64>,

        /// Sampling interval in seconds
        #[arg(short, long)]
        interval: Option<u64>,

        /// Dataset file to write
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Aggregate a dataset into per-experiment chart data
    Report {
        /// Dataset file to read
        #[arg(long, default_value = brokerbench::config::DEFAULT_OUTPUT)]
        input: PathBuf,

        /// Directory receiving experiment-<id>.json files
        #[arg(long, default_value = "charts")]
        output_dir: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitor_defaults() {
        let args = Args::try_parse_from(["brokerbench", "monitor"]).unwrap();
        assert!(!args.verbose);
        match args.command {
            Command::Monitor {
                processes,
                duration,
                interval,
            } => {
                assert_eq!(processes, vec!["mosquitto", "server"]);
                assert_eq!(duration, 30);
                assert_eq!(interval, 1);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_monitor_process_list() {
        let args = Args::try_parse_from([
            "brokerbench",
            "monitor",
            "--processes",
            "emqx",
            "beam.smp",
            "-d",
            "5",
            "--verbose",
        ])
        .unwrap();
        assert!(args.verbose);
        match args.command {
            Command::Monitor {
                processes,
                duration,
                ..
            } => {
                assert_eq!(processes, vec!["emqx", "beam.smp"]);
                assert_eq!(duration, 5);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_collect_overrides_are_optional() {
        let args = Args::try_parse_from(["brokerbench", "collect", "-k", "2"]).unwrap();
        match args.command {
            Command::Collect {
                config,
                observations,
                duration,
                output,
                ..
            } => {
                assert!(config.is_none());
                assert_eq!(observations, Some(2));
                assert!(duration.is_none());
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_report_defaults() {
        let args = Args::try_parse_from(["brokerbench", "report"]).unwrap();
        match args.command {
            Command::Report { input, output_dir } => {
                assert_eq!(input, PathBuf::from("mqtt_results.csv"));
                assert_eq!(output_dir, PathBuf::from("charts"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_missing_subcommand_is_error() {
        assert!(Args::try_parse_from(["brokerbench"]).is_err());
    }
}
