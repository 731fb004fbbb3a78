// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! The flat table of accepted samples, persisted as CSV with the columns
//! `ObservationSet, Experiment, Broker, Time, ActiveProcs, CPU(%),
//! NetSent(KB/s), NetRecv(KB/s)` in that order.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::monitor::{Run, Sample};

const BYTES_PER_KB: f64 = 1024.0;

/// Identifies the run a sample belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunTag {
    pub experiment_id: u32,
    pub broker_label: String,
    pub observation_index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    #[serde(rename = "ObservationSet")]
    pub observation_index: u32,
    #[serde(rename = "Experiment")]
    pub experiment_id: u32,
    #[serde(rename = "Broker")]
    pub broker_label: String,
    #[serde(rename = "Time")]
    pub time_step: u32,
    #[serde(rename = "ActiveProcs")]
    pub active_procs: usize,
    #[serde(rename = "CPU(%)")]
    pub cpu_percent: f64,
    #[serde(rename = "NetSent(KB/s)")]
    pub net_sent_kbps: f64,
    #[serde(rename = "NetRecv(KB/s)")]
    pub net_recv_kbps: f64,
}

impl Row {
    pub fn new(tag: &RunTag, sample: &Sample) -> Self {
        Self {
            observation_index: tag.observation_index,
            experiment_id: tag.experiment_id,
            broker_label: tag.broker_label.clone(),
            time_step: sample.time_step,
            active_procs: sample.active_process_count,
            cpu_percent: sample.cpu_percent,
            net_sent_kbps: sample.net_sent_rate / BYTES_PER_KB,
            net_recv_kbps: sample.net_recv_rate / BYTES_PER_KB,
        }
    }

    fn key(&self) -> (u32, &str, u32, u32) {
        (
            self.experiment_id,
            &self.broker_label,
            self.observation_index,
            self.time_step,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every sample of an accepted run.
    pub fn push_run(&mut self, tag: &RunTag, run: &Run) {
        self.rows
            .extend(run.samples.iter().map(|sample| Row::new(tag, sample)));
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct experiment ids, ascending.
    pub fn experiments(&self) -> Vec<u32> {
        self.rows
            .iter()
            .map(|row| row.experiment_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct run tags present, sorted.
    pub fn run_tags(&self) -> BTreeSet<RunTag> {
        self.rows
            .iter()
            .map(|row| RunTag {
                experiment_id: row.experiment_id,
                broker_label: row.broker_label.clone(),
                observation_index: row.observation_index,
            })
            .collect()
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        info!("wrote {} row(s) to {}", self.rows.len(), path.display());
        Ok(())
    }

    /// Load a dataset, rejecting rows that repeat an
    /// (experiment, broker, observation, time) key.
    pub fn read_csv(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::DatasetNotFound {
                path: path.to_path_buf(),
            });
        }

        let mut reader = csv::Reader::from_path(path)?;
        let mut rows: Vec<Row> = Vec::new();
        for record in reader.deserialize::<Row>() {
            let row = record?;
            if row.broker_label.is_empty() {
                return Err(Error::InvalidRow {
                    line: line_of(rows.len()),
                    reason: "empty broker label".to_string(),
                });
            }
            rows.push(row);
        }

        let mut seen = HashSet::new();
        for (index, row) in rows.iter().enumerate() {
            if !seen.insert(row.key()) {
                return Err(Error::InvalidRow {
                    line: line_of(index),
                    reason: format!(
                        "duplicate sample for experiment {}, broker {}, observation {}, time {}",
                        row.experiment_id, row.broker_label, row.observation_index, row.time_step
                    ),
                });
            }
        }

        Ok(Self { rows })
    }
}

/// File line of the `index`-th data row; the header is line 1.
fn line_of(index: usize) -> u64 {
    index as u64 + 2
}

impl FromIterator<Row> for Dataset {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use super::*;
    use crate::state::MonitorState;
    use std::fs;

    fn tag(experiment_id: u32, broker: &str, observation_index: u32) -> RunTag {
        RunTag {
            experiment_id,
            broker_label: broker.to_string(),
            observation_index,
        }
    }

    fn run(cpus: &[f64]) -> Run {
        Run {
            samples: cpus
                .iter()
                .enumerate()
                .map(|(i, cpu)| Sample {
                    time_step: i as u32 + 1,
                    active_process_count: 1,
                    cpu_percent: *cpu,
                    net_sent_rate: 2048.0,
                    net_recv_rate: 512.0,
                })
                .collect(),
            state: MonitorState::Done,
        }
    }

    #[test]
    fn test_rows_carry_tag_and_kilobytes() {
        let mut dataset = Dataset::new();
        dataset.push_run(&tag(2, "primary", 3), &run(&[1.0, 2.0]));

        assert_eq!(dataset.len(), 2);
        let row = &dataset.rows()[1];
        assert_eq!(row.experiment_id, 2);
        assert_eq!(row.broker_label, "primary");
        assert_eq!(row.observation_index, 3);
        assert_eq!(row.time_step, 2);
        assert_eq!(row.net_sent_kbps, 2.0);
        assert_eq!(row.net_recv_kbps, 0.5);
    }

    #[test]
    fn test_csv_header_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let mut dataset = Dataset::new();
        dataset.push_run(&tag(1, "reference", 1), &run(&[4.5]));
        dataset.write_csv(&path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "ObservationSet,Experiment,Broker,Time,ActiveProcs,CPU(%),NetSent(KB/s),NetRecv(KB/s)"
        );
        assert_eq!(lines.next().unwrap(), "1,1,reference,1,1,4.5,2.0,0.5");
    }

    #[test]
    fn test_written_dataset_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let mut dataset = Dataset::new();
        dataset.push_run(&tag(1, "primary", 1), &run(&[5.0, 7.0, 6.0]));
        dataset.push_run(&tag(3, "reference", 2), &run(&[1.0]));
        dataset.write_csv(&path).unwrap();

        let loaded = Dataset::read_csv(&path).unwrap();
        assert_eq!(loaded, dataset);
        assert_eq!(loaded.experiments(), vec![1, 3]);
        assert_eq!(loaded.run_tags().len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let err = Dataset::read_csv(Path::new("/nonexistent/results.csv")).unwrap_err();
        assert!(matches!(err, Error::DatasetNotFound { .. }));
        assert!(err.to_string().contains("/nonexistent/results.csv"));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dup.csv");
        fs::write(
            &path,
            "ObservationSet,Experiment,Broker,Time,ActiveProcs,CPU(%),NetSent(KB/s),NetRecv(KB/s)\n\
             1,1,primary,1,1,2.0,0.0,0.0\n\
             1,1,primary,1,1,3.0,0.0,0.0\n",
        )
        .unwrap();

        match Dataset::read_csv(&path).unwrap_err() {
            Error::InvalidRow { line, reason } => {
                assert_eq!(line, 3);
                assert!(reason.contains("duplicate"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_row_is_csv_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(
            &path,
            "ObservationSet,Experiment,Broker,Time,ActiveProcs,CPU(%),NetSent(KB/s),NetRecv(KB/s)\n\
             1,one,primary,1,1,2.0,0.0,0.0\n",
        )
        .unwrap();

        assert!(matches!(Dataset::read_csv(&path), Err(Error::Csv(_))));
    }
}
