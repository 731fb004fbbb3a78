// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Experiment harness comparing the CPU and network footprint of two message
//! brokers: sample cumulative OS counters into per-interval rates, gate every
//! run behind an operator decision, and reduce accepted runs to mean/stddev
//! curves for charting.

// Correctness
#![deny(clippy::indexing_slicing)]
#![deny(clippy::string_slice)]
#![deny(clippy::cast_possible_wrap)]
#![deny(clippy::undocumented_unsafe_blocks)]
// Panicking code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unimplemented)]
#![deny(clippy::todo)]
// Debug code that shouldn't be in production
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]

pub mod aggregate;
pub mod config;
pub mod counter;
pub mod dataset;
pub mod errors;
pub mod host;
pub mod monitor;
pub mod orchestrator;
pub mod procs;
pub mod render;
pub mod state;
pub mod summary;

#[cfg(test)]
pub(crate) mod test_utils;

pub use aggregate::{AggregateCurve, CurvePoint, Metric, Stat, aggregate, normalize_time_axis};
pub use config::{BrokerTarget, SuiteConfig, SuiteOverrides};
pub use counter::{Counter, CounterDiffer, CpuTime, NetCounters, NetRates, RateSampler};
pub use dataset::{Dataset, Row, RunTag};
pub use errors::{Error, Result};
pub use host::{NetworkCounters, ProcessInfo, ProcessTable, SysinfoHost};
pub use monitor::{MonitorLoop, MonitorSettings, Run, Sample};
pub use orchestrator::{Decider, MonitorRecorder, Orchestrator, Recorder, SuiteOutcome, SuitePlan};
pub use procs::{CpuSample, CpuSampler};
pub use render::{ChartGroup, ChartRenderer, JsonChartWriter, MetricChart, Series};
pub use state::{MonitorState, RunState};
pub use summary::RunSummary;
