// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Periodic sampling of the target processes' CPU and the host's network
//! throughput for a fixed wall-clock duration.

use std::time::Duration;

use log::{debug, info};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

use crate::counter::RateSampler;
use crate::host::{NetworkCounters, ProcessTable};
use crate::procs::CpuSampler;
use crate::state::MonitorState;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// One recorded tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// 1-based position of the sample within its run.
    pub time_step: u32,
    pub active_process_count: usize,
    pub cpu_percent: f64,
    /// Bytes per second.
    pub net_sent_rate: f64,
    /// Bytes per second.
    pub net_recv_rate: f64,
}

/// Samples produced by one monitor loop execution, complete or aborted.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub samples: Vec<Sample>,
    pub state: MonitorState,
}

impl Run {
    pub fn was_aborted(&self) -> bool {
        self.state == MonitorState::Aborted
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSettings {
    pub target_names: Vec<String>,
    pub duration: Duration,
    pub interval: Duration,
}

/// Drives one run: wait an interval, sample, repeat until the duration has
/// elapsed or the token is cancelled.
pub struct MonitorLoop<'a, H: ?Sized> {
    host: &'a mut H,
    cancel: CancellationToken,
    state: MonitorState,
}

impl<'a, H> MonitorLoop<'a, H>
where
    H: ProcessTable + NetworkCounters + ?Sized,
{
    pub fn new(host: &'a mut H, cancel: CancellationToken) -> Self {
        Self {
            host,
            cancel,
            state: MonitorState::Idle,
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    fn transition(&mut self, next: MonitorState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid monitor transition {} -> {next}",
            self.state
        );
        debug!("monitor: {} -> {next}", self.state);
        self.state = next;
    }

    pub async fn run(mut self, settings: &MonitorSettings) -> Run {
        self.transition(MonitorState::Sampling);

        let start = Instant::now();
        let mut cpu_sampler = CpuSampler::new();
        // Baseline for every process already running.
        cpu_sampler.sample_cpu(&mut *self.host, &settings.target_names, Duration::ZERO);
        let mut network = RateSampler::new(self.host.read_network_counters(), Duration::ZERO);

        let period = settings.interval.max(MIN_INTERVAL);
        let mut ticker = interval_at(start + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let cancel = self.cancel.clone();
        let mut samples = Vec::new();
        let mut time_step = 0u32;

        while start.elapsed() < settings.duration {
            let cancelled = tokio::select! {
                biased;
                _ = cancel.cancelled() => true,
                _ = ticker.tick() => false,
            };
            if cancelled {
                self.transition(MonitorState::Aborted);
                info!("monitor stopped manually after {} sample(s)", samples.len());
                return Run {
                    samples,
                    state: self.state,
                };
            }

            self.transition(MonitorState::SampleTick);
            let at = start.elapsed();
            let cpu = cpu_sampler.sample_cpu(&mut *self.host, &settings.target_names, at);
            // Network counters are system-wide: the snapshot advances on every
            // tick, including ticks where no target process is running.
            let rates = network.tick(self.host.read_network_counters(), at);

            if cpu.is_empty() {
                debug!("no target processes found, waiting");
            } else {
                time_step += 1;
                let sample = Sample {
                    time_step,
                    active_process_count: cpu.processes.len(),
                    cpu_percent: cpu.total_cpu_percent,
                    net_sent_rate: rates.sent_per_sec,
                    net_recv_rate: rates.recv_per_sec,
                };
                info!(
                    "Active Procs: {}, CPU: {:.2}%, Net Sent: {:.2} KB/s, Net Recv: {:.2} KB/s",
                    sample.active_process_count,
                    sample.cpu_percent,
                    sample.net_sent_rate / 1024.0,
                    sample.net_recv_rate / 1024.0
                );
                samples.push(sample);
            }
            self.transition(MonitorState::Sampling);
        }

        self.transition(MonitorState::Done);
        Run {
            samples,
            state: self.state,
        }
    }
}
