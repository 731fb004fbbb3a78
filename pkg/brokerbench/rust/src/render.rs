// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Chart data for the rendering step: one chart group per experiment, one
//! chart per metric, one mean/stddev series per broker.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;

use crate::aggregate::{AggregateCurve, Metric};
use crate::errors::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub broker: String,
    pub time: Vec<f64>,
    pub mean: Vec<f64>,
    pub stddev: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricChart {
    pub metric: Metric,
    pub title: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartGroup {
    pub experiment_id: u32,
    pub title: String,
    pub x_label: String,
    pub charts: Vec<MetricChart>,
}

impl ChartGroup {
    pub fn from_curves(experiment_id: u32, curves: &BTreeMap<String, AggregateCurve>) -> Self {
        let charts = Metric::ALL
            .iter()
            .map(|&metric| MetricChart {
                metric,
                title: format!("{metric} over Time"),
                y_label: metric.column().to_string(),
                series: curves
                    .iter()
                    .map(|(broker, curve)| Series {
                        broker: broker.clone(),
                        time: curve.points.iter().map(|p| p.time).collect(),
                        mean: curve.points.iter().map(|p| p.stat(metric).mean).collect(),
                        stddev: curve.points.iter().map(|p| p.stat(metric).stddev).collect(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            experiment_id,
            title: format!("Broker Performance Comparison - Experiment {experiment_id}"),
            x_label: "Time (seconds)".to_string(),
            charts,
        }
    }
}

/// Produces a line-plus-band chart from a chart group.
pub trait ChartRenderer {
    fn render(&mut self, group: &ChartGroup) -> Result<()>;
}

/// Writes each chart group as `experiment-<id>.json` for an external plotter.
pub struct JsonChartWriter {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl JsonChartWriter {
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            written: Vec::new(),
        })
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ChartRenderer for JsonChartWriter {
    fn render(&mut self, group: &ChartGroup) -> Result<()> {
        let path = self
            .dir
            .join(format!("experiment-{}.json", group.experiment_id));
        fs::write(&path, serde_json::to_vec_pretty(group)?)?;
        info!("wrote chart data to {}", path.display());
        self.written.push(path);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::dataset::{Dataset, Row};

    fn dataset() -> Dataset {
        let row = |broker: &str, time_step: u32, cpu: f64| Row {
            observation_index: 1,
            experiment_id: 4,
            broker_label: broker.to_string(),
            time_step,
            active_procs: 1,
            cpu_percent: cpu,
            net_sent_kbps: 1.0,
            net_recv_kbps: 2.0,
        };
        vec![
            row("primary", 1, 1.0),
            row("primary", 2, 2.0),
            row("reference", 1, 3.0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_one_chart_per_metric_one_series_per_broker() {
        let group = ChartGroup::from_curves(4, &aggregate(&dataset(), 4));

        assert_eq!(group.title, "Broker Performance Comparison - Experiment 4");
        assert_eq!(group.charts.len(), 3);
        assert_eq!(group.charts[0].title, "CPU(%) over Time");
        let brokers: Vec<&str> = group.charts[0]
            .series
            .iter()
            .map(|s| s.broker.as_str())
            .collect();
        assert_eq!(brokers, vec!["primary", "reference"]);

        let reference = &group.charts[2].series[1];
        assert_eq!(reference.time, vec![2.0]);
        assert_eq!(reference.mean, vec![2.0]);
        assert_eq!(reference.stddev, vec![0.0]);
    }

    #[test]
    fn test_json_writer() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("charts");
        let mut writer = JsonChartWriter::new(&out).unwrap();

        writer
            .render(&ChartGroup::from_curves(4, &aggregate(&dataset(), 4)))
            .unwrap();

        assert_eq!(writer.written(), &[out.join("experiment-4.json")]);
        let json: serde_json::Value =
            serde_json::from_slice(&fs::read(out.join("experiment-4.json")).unwrap()).unwrap();
        assert_eq!(json["experiment_id"], 4);
        assert_eq!(json["charts"][1]["metric"], "NetSent");
        assert_eq!(json["charts"][0]["series"][0]["mean"][1], 2.0);
    }
}
