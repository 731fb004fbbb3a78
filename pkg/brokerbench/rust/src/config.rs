// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use anyhow::{Context, Result, bail};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::orchestrator::SuitePlan;

pub const CONFIG_ENV: &str = "BROKERBENCH_CONFIG";
pub const DEFAULT_OUTPUT: &str = "mqtt_results.csv";

fn default_experiments() -> Vec<u32> {
    vec![1, 2, 3]
}

fn default_brokers() -> Vec<BrokerTarget> {
    vec![
        BrokerTarget::new("primary", &["server"]),
        BrokerTarget::new("reference", &["mosquitto"]),
    ]
}

fn default_observations() -> u32 {
    3
}

fn default_duration_secs() -> u64 {
    30
}

fn default_interval_secs() -> u64 {
    1
}

fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT)
}

/// A broker under test and the process names that make it up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerTarget {
    pub label: String,
    pub processes: Vec<String>,
}

impl BrokerTarget {
    pub fn new(label: &str, processes: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            processes: processes.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuiteConfig {
    #[serde(default = "default_experiments")]
    pub experiments: Vec<u32>,
    #[serde(default = "default_brokers")]
    pub brokers: Vec<BrokerTarget>,
    #[serde(default = "default_observations")]
    pub observations: u32,
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            experiments: default_experiments(),
            brokers: default_brokers(),
            observations: default_observations(),
            duration_secs: default_duration_secs(),
            interval_secs: default_interval_secs(),
            output: default_output(),
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteOverrides {
    pub observations: Option<u32>,
    pub duration_secs: Option<u64>,
    pub interval_secs: Option<u64>,
    pub output: Option<PathBuf>,
}

/// Explicit `--config` path, else `BROKERBENCH_CONFIG`, else none.
pub fn config_path(flag: Option<PathBuf>) -> Option<PathBuf> {
    choose_config_path(flag, std::env::var_os(CONFIG_ENV))
}

fn choose_config_path(flag: Option<PathBuf>, env: Option<OsString>) -> Option<PathBuf> {
    flag.or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from))
}

impl SuiteConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let config: SuiteConfig =
            serde_yaml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;
        debug!("loaded suite config from {}", path.display());
        Ok(config)
    }

    /// The file at `path` if given, built-in defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn apply(mut self, overrides: SuiteOverrides) -> Self {
        if let Some(observations) = overrides.observations {
            self.observations = observations;
        }
        if let Some(duration_secs) = overrides.duration_secs {
            self.duration_secs = duration_secs;
        }
        if let Some(interval_secs) = overrides.interval_secs {
            self.interval_secs = interval_secs;
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.observations == 0 {
            bail!("observations must be at least 1");
        }
        if self.duration_secs == 0 {
            bail!("duration_secs must be greater than 0");
        }
        if self.interval_secs == 0 {
            bail!("interval_secs must be greater than 0");
        }
        if self.experiments.is_empty() {
            bail!("experiments must list at least one experiment id");
        }
        if self.brokers.is_empty() {
            bail!("brokers must list at least one broker");
        }
        let mut labels = HashSet::new();
        for broker in &self.brokers {
            if broker.label.is_empty() {
                bail!("brokers: label must not be empty");
            }
            if broker.processes.is_empty() {
                bail!("brokers: {} has no process names", broker.label);
            }
            if !labels.insert(broker.label.as_str()) {
                bail!("brokers: duplicate label {}", broker.label);
            }
        }
        Ok(())
    }

    pub fn plan(&self) -> Result<SuitePlan> {
        self.validate()?;
        Ok(SuitePlan {
            experiments: self.experiments.clone(),
            brokers: self.brokers.clone(),
            observations: self.observations,
            duration: Duration::from_secs(self.duration_secs),
            interval: Duration::from_secs(self.interval_secs),
        })
    }
}
