// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Reduction of a dataset to per-broker mean/stddev curves.
//!
//! Samples are grouped by time step within each broker, independently per
//! experiment. When brokers' curves end at different time steps, the shorter
//! ones have their time coordinate stretched so every curve spans the same
//! horizontal extent. Only the time label changes; values are never
//! resampled.

use std::collections::BTreeMap;
use std::fmt;

use log::debug;
use serde::Serialize;

use crate::dataset::{Dataset, Row};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Stat {
    pub mean: f64,
    pub stddev: f64,
}

impl Stat {
    /// Mean and sample standard deviation (n - 1 denominator). The deviation
    /// is 0 with fewer than two values; an empty slice is all zeros.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_values(values: &[f64]) -> Self {
        let n = values.len();
        if n == 0 {
            return Self::default();
        }
        let mean = values.iter().sum::<f64>() / n as f64;
        let stddev = if n < 2 {
            0.0
        } else {
            let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (squares / (n - 1) as f64).sqrt()
        };
        Self { mean, stddev }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Metric {
    Cpu,
    NetSent,
    NetRecv,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Cpu, Metric::NetSent, Metric::NetRecv];

    /// Dataset column name.
    pub fn column(self) -> &'static str {
        match self {
            Metric::Cpu => "CPU(%)",
            Metric::NetSent => "NetSent(KB/s)",
            Metric::NetRecv => "NetRecv(KB/s)",
        }
    }

    pub fn value(self, row: &Row) -> f64 {
        match self {
            Metric::Cpu => row.cpu_percent,
            Metric::NetSent => row.net_sent_kbps,
            Metric::NetRecv => row.net_recv_kbps,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurvePoint {
    pub time_step: u32,
    /// Horizontal coordinate; equals `time_step` unless the curve was rescaled.
    pub time: f64,
    /// Number of runs contributing a sample at this step.
    pub observations: usize,
    pub cpu: Stat,
    pub net_sent: Stat,
    pub net_recv: Stat,
}

impl CurvePoint {
    pub fn stat(&self, metric: Metric) -> Stat {
        match metric {
            Metric::Cpu => self.cpu,
            Metric::NetSent => self.net_sent,
            Metric::NetRecv => self.net_recv,
        }
    }
}

/// Points ordered by time step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateCurve {
    pub points: Vec<CurvePoint>,
}

impl AggregateCurve {
    fn from_rows(rows: &[&Row]) -> Self {
        let mut by_step: BTreeMap<u32, Vec<&Row>> = BTreeMap::new();
        for &row in rows {
            by_step.entry(row.time_step).or_default().push(row);
        }

        let points = by_step
            .into_iter()
            .map(|(time_step, rows)| {
                let stat = |metric: Metric| {
                    let values: Vec<f64> = rows.iter().map(|row| metric.value(row)).collect();
                    Stat::from_values(&values)
                };
                CurvePoint {
                    time_step,
                    time: f64::from(time_step),
                    observations: rows.len(),
                    cpu: stat(Metric::Cpu),
                    net_sent: stat(Metric::NetSent),
                    net_recv: stat(Metric::NetRecv),
                }
            })
            .collect();

        Self { points }
    }

    pub fn max_time_step(&self) -> u32 {
        self.points
            .iter()
            .map(|point| point.time_step)
            .max()
            .unwrap_or(0)
    }

    /// Relabel every point's time coordinate as `time_step * factor`.
    pub fn rescale(&mut self, factor: f64) {
        for point in &mut self.points {
            point.time = f64::from(point.time_step) * factor;
        }
    }
}

/// Curves of one experiment keyed by broker label. The time axis is already
/// normalized.
pub fn aggregate(dataset: &Dataset, experiment_id: u32) -> BTreeMap<String, AggregateCurve> {
    let mut by_broker: BTreeMap<&str, Vec<&Row>> = BTreeMap::new();
    for row in dataset
        .rows()
        .iter()
        .filter(|row| row.experiment_id == experiment_id)
    {
        by_broker.entry(&row.broker_label).or_default().push(row);
    }

    let mut curves: BTreeMap<String, AggregateCurve> = by_broker
        .into_iter()
        .map(|(broker, rows)| (broker.to_string(), AggregateCurve::from_rows(&rows)))
        .collect();
    normalize_time_axis(&mut curves);
    curves
}

/// Stretch every curve shorter than the longest so they all end at the same
/// time. A curve whose max time step is 0 is left untouched.
pub fn normalize_time_axis(curves: &mut BTreeMap<String, AggregateCurve>) {
    let longest = curves
        .values()
        .map(AggregateCurve::max_time_step)
        .max()
        .unwrap_or(0);

    for (broker, curve) in curves.iter_mut() {
        let max = curve.max_time_step();
        if max == 0 || max >= longest {
            continue;
        }
        let factor = f64::from(longest) / f64::from(max);
        debug!("rescaling {broker} time axis by {factor:.3} ({max} -> {longest} steps)");
        curve.rescale(factor);
    }
}
