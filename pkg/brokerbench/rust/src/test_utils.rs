// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Deterministic stand-ins for the host and the operator. Time is driven by
//! tokio's paused test clock.
#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;

use crate::counter::{CpuTime, NetCounters};
use crate::host::{NetworkCounters, ProcessInfo, ProcessTable};
use crate::orchestrator::Decider;

#[derive(Debug, Clone)]
pub struct FakeProc {
    pub info: ProcessInfo,
    /// Cumulative CPU milliseconds. `None` simulates a process that exits
    /// between listing and CPU query.
    pub cpu_ms: Option<u64>,
}

pub fn fake_proc(pid: u32, parent: Option<u32>, name: &str, cpu_ms: Option<u64>) -> FakeProc {
    FakeProc {
        info: ProcessInfo {
            pid,
            parent,
            name: name.to_string(),
        },
        cpu_ms,
    }
}

/// Host replaying one process listing per refresh and one network reading per
/// counter read. Once a script runs out the last entry repeats.
#[derive(Default)]
pub struct FakeHost {
    listings: VecDeque<Vec<FakeProc>>,
    cpu: HashMap<u32, u64>,
    readings: VecDeque<NetCounters>,
    last_reading: NetCounters,
    pub refreshes: usize,
    pub network_reads: usize,
}

impl FakeHost {
    pub fn new(listings: Vec<Vec<FakeProc>>, readings: Vec<NetCounters>) -> Self {
        Self {
            listings: listings.into(),
            readings: readings.into(),
            ..Self::default()
        }
    }
}

impl ProcessTable for FakeHost {
    fn refresh(&mut self) -> Vec<ProcessInfo> {
        self.refreshes += 1;
        let listing = if self.listings.len() > 1 {
            self.listings.pop_front().unwrap_or_default()
        } else {
            self.listings.front().cloned().unwrap_or_default()
        };
        self.cpu = listing
            .iter()
            .filter_map(|p| p.cpu_ms.map(|ms| (p.info.pid, ms)))
            .collect();
        listing.into_iter().map(|p| p.info).collect()
    }

    fn cpu_time(&self, pid: u32) -> Option<CpuTime> {
        self.cpu.get(&pid).copied().map(CpuTime)
    }
}

impl NetworkCounters for FakeHost {
    fn read_network_counters(&mut self) -> NetCounters {
        self.network_reads += 1;
        if let Some(reading) = self.readings.pop_front() {
            self.last_reading = reading;
        }
        self.last_reading
    }
}

pub fn sent(bytes_sent: u64) -> NetCounters {
    NetCounters {
        bytes_sent,
        bytes_recv: 0,
    }
}

/// Listings for one process whose CPU time grows by `percents[i]` of a core
/// per one-second tick. The first listing is the zero baseline.
pub fn busy_process(pid: u32, name: &str, percents: &[u64]) -> Vec<Vec<FakeProc>> {
    let mut cpu_ms = 0;
    let mut listings = vec![vec![fake_proc(pid, None, name, Some(cpu_ms))]];
    for percent in percents {
        cpu_ms += percent * 10;
        listings.push(vec![fake_proc(pid, None, name, Some(cpu_ms))]);
    }
    listings
}

/// Operator answering from a script; answers "no" once the script is spent.
#[derive(Default)]
pub struct ScriptedDecider {
    answers: VecDeque<bool>,
    pub prompts: Vec<String>,
}

impl ScriptedDecider {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            prompts: Vec::new(),
        }
    }

    pub fn always_yes(count: usize) -> Self {
        Self::new(&vec![true; count])
    }
}

#[async_trait]
impl Decider for ScriptedDecider {
    async fn confirm(&mut self, prompt: &str) -> bool {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().unwrap_or(false)
    }
}
