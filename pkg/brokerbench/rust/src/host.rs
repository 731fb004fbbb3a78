// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Operating-system capabilities used by the harness: the process table and
//! the system-wide network counters.

use sysinfo::{Networks, Pid, ProcessRefreshKind, ProcessesToUpdate, System};

use crate::counter::{CpuTime, NetCounters};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub parent: Option<u32>,
    pub name: String,
}

/// Live process listing with cumulative per-process CPU time.
pub trait ProcessTable {
    /// Re-read the process list and the CPU times reported by [`Self::cpu_time`].
    fn refresh(&mut self) -> Vec<ProcessInfo>;

    /// CPU time consumed by `pid` since it started, or `None` if the process
    /// is gone or cannot be read.
    fn cpu_time(&self, pid: u32) -> Option<CpuTime>;
}

/// Cumulative byte counters summed over every network interface.
pub trait NetworkCounters {
    fn read_network_counters(&mut self) -> NetCounters;
}

/// Host capabilities backed by `sysinfo`.
pub struct SysinfoHost {
    system: System,
    networks: Networks,
}

impl SysinfoHost {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            networks: Networks::new_with_refreshed_list(),
        }
    }
}

impl Default for SysinfoHost {
    fn default() -> Self {
        Self::new()
    }
}

fn refresh_kind() -> ProcessRefreshKind {
    ProcessRefreshKind::nothing().with_cpu()
}

impl ProcessTable for SysinfoHost {
    fn refresh(&mut self) -> Vec<ProcessInfo> {
        self.system
            .refresh_processes_specifics(ProcessesToUpdate::All, true, refresh_kind());
        self.system
            .processes()
            .iter()
            // Linux threads show up as tasks; their CPU is already in the owner.
            .filter(|(_, process)| process.thread_kind().is_none())
            .map(|(pid, process)| ProcessInfo {
                pid: pid.as_u32(),
                parent: process.parent().map(|parent| parent.as_u32()),
                name: process.name().to_string_lossy().into_owned(),
            })
            .collect()
    }

    fn cpu_time(&self, pid: u32) -> Option<CpuTime> {
        self.system
            .process(Pid::from_u32(pid))
            .map(|process| CpuTime(process.accumulated_cpu_time()))
    }
}

impl NetworkCounters for SysinfoHost {
    fn read_network_counters(&mut self) -> NetCounters {
        self.networks.refresh(true);
        self.networks
            .list()
            .values()
            .fold(NetCounters::default(), |acc, data| NetCounters {
                bytes_sent: acc.bytes_sent.saturating_add(data.total_transmitted()),
                bytes_recv: acc.bytes_recv.saturating_add(data.total_received()),
            })
    }
}
