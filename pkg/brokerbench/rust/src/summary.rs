// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::fmt;

use crate::aggregate::Stat;
use crate::monitor::Run;

/// Whole-run statistics reported at the end of a standalone monitor run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub samples: usize,
    pub cpu: Stat,
    pub net_sent_kbps: Stat,
    pub net_recv_kbps: Stat,
}

impl RunSummary {
    /// `None` when the run recorded nothing, e.g. the broker was not running.
    pub fn from_run(run: &Run) -> Option<Self> {
        if run.samples.is_empty() {
            return None;
        }
        let column = |f: fn(&crate::monitor::Sample) -> f64| {
            let values: Vec<f64> = run.samples.iter().map(f).collect();
            Stat::from_values(&values)
        };
        Some(Self {
            samples: run.samples.len(),
            cpu: column(|s| s.cpu_percent),
            net_sent_kbps: column(|s| s.net_sent_rate / 1024.0),
            net_recv_kbps: column(|s| s.net_recv_rate / 1024.0),
        })
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Final Results ({} samples) ---", self.samples)?;
        writeln!(
            f,
            "CPU Usage (%):       Avg: {:.2} | StdDev: {:.2}",
            self.cpu.mean, self.cpu.stddev
        )?;
        writeln!(
            f,
            "Net Sent (KB/s):     Avg: {:.2} | StdDev: {:.2}",
            self.net_sent_kbps.mean, self.net_sent_kbps.stddev
        )?;
        write!(
            f,
            "Net Received (KB/s): Avg: {:.2} | StdDev: {:.2}",
            self.net_recv_kbps.mean, self.net_recv_kbps.stddev
        )
    }
}
