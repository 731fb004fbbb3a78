// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! The experiment suite: every (experiment, broker) pair is observed until
//! `observations` runs have been accepted by the operator.
//!
//! Each observation goes through `AwaitConfirm -> Running -> AwaitAcceptance`
//! and then either `Accepted` (next observation) or `Rejected` (same
//! observation again). A run without samples is rejected without asking.
//! Declining the start prompt, or an interrupt at any point, ends the suite
//! with the runs accepted so far.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::config::BrokerTarget;
use crate::dataset::{Dataset, RunTag};
use crate::host::{NetworkCounters, ProcessTable};
use crate::monitor::{MonitorLoop, MonitorSettings, Run};
use crate::state::RunState;
use crate::summary::RunSummary;

/// Yes/no decision from the operator.
#[async_trait]
pub trait Decider {
    async fn confirm(&mut self, prompt: &str) -> bool;
}

/// Produces one run for the given settings.
#[async_trait]
pub trait Recorder {
    async fn record(&mut self, settings: &MonitorSettings) -> Run;
}

/// Records runs with a fresh [`MonitorLoop`] over a shared host.
pub struct MonitorRecorder<'a, H: ?Sized> {
    host: &'a mut H,
    cancel: CancellationToken,
}

impl<'a, H: ?Sized> MonitorRecorder<'a, H> {
    pub fn new(host: &'a mut H, cancel: CancellationToken) -> Self {
        Self { host, cancel }
    }
}

#[async_trait]
impl<H> Recorder for MonitorRecorder<'_, H>
where
    H: ProcessTable + NetworkCounters + Send + ?Sized,
{
    async fn record(&mut self, settings: &MonitorSettings) -> Run {
        MonitorLoop::new(&mut *self.host, self.cancel.clone())
            .run(settings)
            .await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuitePlan {
    pub experiments: Vec<u32>,
    pub brokers: Vec<BrokerTarget>,
    /// Accepted runs required per (experiment, broker) pair.
    pub observations: u32,
    pub duration: Duration,
    pub interval: Duration,
}

impl SuitePlan {
    fn settings(&self, broker: &BrokerTarget) -> MonitorSettings {
        MonitorSettings {
            target_names: broker.processes.clone(),
            duration: self.duration,
            interval: self.interval,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuiteOutcome {
    /// Accepted runs only.
    pub dataset: Dataset,
    pub interrupted: bool,
}

pub struct Orchestrator<'a, R: ?Sized, D: ?Sized> {
    recorder: &'a mut R,
    decider: &'a mut D,
    cancel: CancellationToken,
    state: RunState,
}

impl<'a, R, D> Orchestrator<'a, R, D>
where
    R: Recorder + ?Sized,
    D: Decider + ?Sized,
{
    pub fn new(recorder: &'a mut R, decider: &'a mut D, cancel: CancellationToken) -> Self {
        Self {
            recorder,
            decider,
            cancel,
            state: RunState::AwaitConfirm,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid run transition {} -> {next}",
            self.state
        );
        debug!("run: {} -> {next}", self.state);
        self.state = next;
    }

    pub async fn run(mut self, plan: &SuitePlan) -> SuiteOutcome {
        let mut dataset = Dataset::new();

        'suite: for &experiment_id in &plan.experiments {
            for broker in &plan.brokers {
                let settings = plan.settings(broker);
                let mut observation_index = 1;

                while observation_index <= plan.observations {
                    let tag = RunTag {
                        experiment_id,
                        broker_label: broker.label.clone(),
                        observation_index,
                    };

                    let start = format!(
                        "Start experiment {experiment_id}, broker {}, observation {observation_index}/{}?",
                        broker.label, plan.observations
                    );
                    if self.cancel.is_cancelled()
                        || !self.decider.confirm(&start).await
                        || self.cancel.is_cancelled()
                    {
                        self.transition(RunState::Interrupted);
                        info!("suite stopped before {}", describe(&tag));
                        break 'suite;
                    }

                    self.transition(RunState::Running);
                    info!("recording {}", describe(&tag));
                    let run = self.recorder.record(&settings).await;
                    if run.was_aborted() || self.cancel.is_cancelled() {
                        self.transition(RunState::Interrupted);
                        warn!(
                            "discarding interrupted run ({} sample(s)) for {}",
                            run.samples.len(),
                            describe(&tag)
                        );
                        break 'suite;
                    }

                    self.transition(RunState::AwaitAcceptance);
                    let accepted = match RunSummary::from_run(&run) {
                        Some(summary) => {
                            info!("{summary}");
                            let accept = format!("Accept run ({} samples)?", run.samples.len());
                            let accepted = self.decider.confirm(&accept).await;
                            if self.cancel.is_cancelled() {
                                self.transition(RunState::Interrupted);
                                warn!("discarding unreviewed run for {}", describe(&tag));
                                break 'suite;
                            }
                            accepted
                        }
                        None => {
                            warn!(
                                "run recorded no samples, was the broker running? repeating {}",
                                describe(&tag)
                            );
                            false
                        }
                    };

                    if accepted {
                        dataset.push_run(&tag, &run);
                        self.transition(RunState::Accepted);
                        observation_index += 1;
                    } else {
                        self.transition(RunState::Rejected);
                        info!("run rejected, repeating {}", describe(&tag));
                    }
                    self.transition(RunState::AwaitConfirm);
                }
            }
        }

        let interrupted = self.state == RunState::Interrupted;
        info!(
            "suite {}: {} accepted run(s), {} row(s)",
            if interrupted { "interrupted" } else { "complete" },
            dataset.run_tags().len(),
            dataset.len()
        );
        SuiteOutcome {
            dataset,
            interrupted,
        }
    }
}

fn describe(tag: &RunTag) -> String {
    format!(
        "experiment {}, broker {}, observation {}",
        tag.experiment_id, tag.broker_label, tag.observation_index
    )
}
