// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Conversion of cumulative, monotonically increasing counters into
//! per-second rates.
//!
//! Timestamps are offsets from a `tokio::time::Instant`, never wall-clock
//! time, so a system time change cannot produce a negative or inflated
//! interval.

use std::time::Duration;

/// A cumulative reading that can be differenced against an earlier reading of
/// the same counter.
pub trait Counter: Copy {
    type Rate: Copy + Default;

    /// Rate accumulated from `previous` to `self` over `elapsed_secs`.
    /// Only called with `elapsed_secs > 0`.
    fn rate_since(&self, previous: &Self, elapsed_secs: f64) -> Self::Rate;
}

impl Counter for u64 {
    type Rate = f64;

    #[allow(clippy::cast_precision_loss)]
    fn rate_since(&self, previous: &Self, elapsed_secs: f64) -> f64 {
        // A counter that went backwards was reset (interface re-created,
        // counter wrapped); nothing is attributable to this interval.
        self.saturating_sub(*previous) as f64 / elapsed_secs
    }
}

/// System-wide network byte counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetCounters {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
}

/// Network throughput in bytes per second.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NetRates {
    pub sent_per_sec: f64,
    pub recv_per_sec: f64,
}

impl Counter for NetCounters {
    type Rate = NetRates;

    fn rate_since(&self, previous: &Self, elapsed_secs: f64) -> NetRates {
        NetRates {
            sent_per_sec: self.bytes_sent.rate_since(&previous.bytes_sent, elapsed_secs),
            recv_per_sec: self.bytes_recv.rate_since(&previous.bytes_recv, elapsed_secs),
        }
    }
}

/// Accumulated CPU time of one process, in CPU-milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTime(pub u64);

impl Counter for CpuTime {
    /// Percent of one core; a process saturating two cores reads 200.
    type Rate = f64;

    fn rate_since(&self, previous: &Self, elapsed_secs: f64) -> f64 {
        // ms of CPU per second of wall time, over 1000 ms, times 100.
        self.0.rate_since(&previous.0, elapsed_secs) / 10.0
    }
}

/// Rate between two readings taken at `previous_at` and `current_at`.
///
/// A zero or negative interval yields the zero rate instead of dividing by
/// zero.
pub fn rate_between<T: Counter>(
    current: &T,
    previous: &T,
    previous_at: Duration,
    current_at: Duration,
) -> T::Rate {
    let elapsed_secs = current_at.as_secs_f64() - previous_at.as_secs_f64();
    if elapsed_secs <= 0.0 {
        return T::Rate::default();
    }
    current.rate_since(previous, elapsed_secs)
}

#[derive(Debug, Clone, Copy)]
struct Snapshot<T> {
    value: T,
    at: Duration,
}

/// Holds the previous reading of a counter between ticks.
#[derive(Debug)]
pub struct CounterDiffer<T: Counter> {
    last: Snapshot<T>,
}

/// Network rate sampler: the snapshot is the last seen system-wide counters.
pub type RateSampler = CounterDiffer<NetCounters>;

impl<T: Counter> CounterDiffer<T> {
    pub fn new(initial: T, at: Duration) -> Self {
        Self {
            last: Snapshot { value: initial, at },
        }
    }

    /// Rate since the stored snapshot. The snapshot is replaced by `current`
    /// whatever the outcome, so a bad interval never carries into the next.
    pub fn tick(&mut self, current: T, at: Duration) -> T::Rate {
        let rate = rate_between(&current, &self.last.value, self.last.at, at);
        self.last = Snapshot { value: current, at };
        rate
    }
}
