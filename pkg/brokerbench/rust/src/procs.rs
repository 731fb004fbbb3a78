// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use log::debug;

use crate::counter::{CounterDiffer, CpuTime};
use crate::host::{ProcessInfo, ProcessTable};

/// CPU consumption of the target processes for one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuSample {
    /// Processes whose name matched a target, ordered by pid.
    pub processes: Vec<ProcessInfo>,
    /// Sum over the matched processes and all of their descendants.
    pub total_cpu_percent: f64,
}

impl CpuSample {
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }
}

/// Per-process CPU percent derived from cumulative CPU time, one counter
/// differ per pid. A pid seen for the first time only sets its baseline and
/// contributes 0 for that tick.
#[derive(Debug, Default)]
pub struct CpuSampler {
    differs: HashMap<u32, CounterDiffer<CpuTime>>,
}

impl CpuSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find every live process named in `target_names` and sum its CPU percent
    /// with that of all its transitive children over the interval ending at
    /// `at`.
    ///
    /// Processes may exit between the listing and the CPU query; those
    /// contribute nothing. Each pid is counted once even when a matched process
    /// is also the descendant of another matched process.
    pub fn sample_cpu<T: ProcessTable + ?Sized>(
        &mut self,
        table: &mut T,
        target_names: &[String],
        at: Duration,
    ) -> CpuSample {
        let listing = table.refresh();

        let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
        for process in &listing {
            if let Some(parent) = process.parent {
                children.entry(parent).or_default().push(process.pid);
            }
        }

        let mut processes: Vec<ProcessInfo> = listing
            .into_iter()
            .filter(|process| target_names.iter().any(|name| *name == process.name))
            .collect();
        processes.sort_by_key(|process| process.pid);

        let mut counted = HashSet::new();
        let mut total_cpu_percent = 0.0;
        for process in &processes {
            let mut pending = vec![process.pid];
            while let Some(pid) = pending.pop() {
                if !counted.insert(pid) {
                    continue;
                }
                match table.cpu_time(pid) {
                    Some(cpu_time) => total_cpu_percent += self.cpu_percent(pid, cpu_time, at),
                    None => debug!("pid {pid} vanished before its CPU time was read"),
                }
                if let Some(kids) = children.get(&pid) {
                    pending.extend(kids.iter().copied());
                }
            }
        }

        // Exited pids must not leave a stale baseline for a reused pid.
        self.differs.retain(|pid, _| counted.contains(pid));

        CpuSample {
            processes,
            total_cpu_percent,
        }
    }

    fn cpu_percent(&mut self, pid: u32, cpu_time: CpuTime, at: Duration) -> f64 {
        match self.differs.get_mut(&pid) {
            Some(differ) => differ.tick(cpu_time, at),
            None => {
                self.differs.insert(pid, CounterDiffer::new(cpu_time, at));
                0.0
            }
        }
    }
}
