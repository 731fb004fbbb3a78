// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

mod cli;
mod prompt;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use brokerbench::config::{SuiteConfig, SuiteOverrides, config_path};
use brokerbench::{
    ChartGroup, ChartRenderer, Dataset, Error, JsonChartWriter, Metric, MonitorLoop,
    MonitorRecorder, MonitorSettings, Orchestrator, RunSummary, SysinfoHost, aggregate,
};
use clap::Parser;
use log::{error, info, warn};
use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;

use crate::cli::{Args, Command};
use crate::prompt::StdinDecider;

/// Exit status after a second interrupt, as for a shell-killed process.
const FORCED_EXIT_CODE: i32 = 130;

fn main() -> Result<()> {
    let args = Args::parse();
    let level = if args.verbose {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    simple_logger::init_with_level(level)?;
    info!(
        "brokerbench starting (version {})",
        env!("CARGO_PKG_VERSION")
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;
    let result = runtime.block_on(run(args.command));
    // A stdin read still pending in the prompt reader cannot be cancelled.
    runtime.shutdown_background();
    result
}

async fn run(command: Command) -> Result<()> {
    let cancel = CancellationToken::new();
    let watcher = tokio::spawn(watch_signals(cancel.clone()));

    let result = match command {
        Command::Monitor {
            processes,
            duration,
            interval,
        } => monitor(processes, duration, interval, cancel).await,
        Command::Collect {
            config,
            observations,
            duration,
            interval,
            output,
        } => {
            collect(
                config_path(config).as_deref(),
                SuiteOverrides {
                    observations,
                    duration_secs: duration,
                    interval_secs: interval,
                    output,
                },
                cancel,
            )
            .await
        }
        Command::Report { input, output_dir } => report(&input, &output_dir),
    };
    watcher.abort();
    result
}

/// The first SIGINT/SIGTERM cancels the token so the current run is
/// discarded and accepted runs are saved. A second one exits immediately.
async fn watch_signals(cancel: CancellationToken) -> Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    loop {
        let name = tokio::select! {
            Some(()) = sigterm.recv() => "SIGTERM",
            Some(()) = sigint.recv() => "SIGINT",
            else => break,
        };
        if escalate(&cancel) {
            warn!("received {name} again, exiting without saving");
            std::process::exit(FORCED_EXIT_CODE);
        }
        info!("received {name}, stopping after the current step");
    }
    Ok(())
}

/// Cancels on the first interrupt. Returns true when the token was already
/// cancelled, i.e. the operator is insisting.
fn escalate(cancel: &CancellationToken) -> bool {
    if cancel.is_cancelled() {
        return true;
    }
    cancel.cancel();
    false
}

async fn monitor(
    processes: Vec<String>,
    duration: u64,
    interval: u64,
    cancel: CancellationToken,
) -> Result<()> {
    anyhow::ensure!(interval > 0, "--interval must be greater than 0");
    let settings = MonitorSettings {
        target_names: processes,
        duration: Duration::from_secs(duration),
        interval: Duration::from_secs(interval),
    };
    info!(
        "monitoring {:?} for {duration}s every {interval}s",
        settings.target_names
    );

    let mut host = SysinfoHost::new();
    let run = MonitorLoop::new(&mut host, cancel).run(&settings).await;

    match RunSummary::from_run(&run) {
        Some(summary) => println!("{summary}"),
        None => println!("No CPU data collected. Was the broker running?"),
    }
    Ok(())
}

async fn collect(
    config: Option<&Path>,
    overrides: SuiteOverrides,
    cancel: CancellationToken,
) -> Result<()> {
    let config = SuiteConfig::load_or_default(config)?.apply(overrides);
    let plan = config.plan().context("invalid suite configuration")?;

    let mut host = SysinfoHost::new();
    let mut recorder = MonitorRecorder::new(&mut host, cancel.clone());
    let mut decider = StdinDecider::new(cancel.clone());
    let outcome = Orchestrator::new(&mut recorder, &mut decider, cancel)
        .run(&plan)
        .await;

    if outcome.interrupted {
        warn!("suite interrupted, keeping accepted runs only");
    }
    if outcome.dataset.is_empty() {
        info!("no runs accepted, nothing to save");
        return Ok(());
    }

    outcome
        .dataset
        .write_csv(&config.output)
        .with_context(|| format!("saving results to {}", config.output.display()))?;
    println!(
        "Saved {} rows to {}",
        outcome.dataset.len(),
        config.output.display()
    );
    Ok(())
}

fn report(input: &Path, output_dir: &Path) -> Result<()> {
    let dataset = match Dataset::read_csv(input) {
        Ok(dataset) => dataset,
        Err(Error::DatasetNotFound { path }) => {
            error!(
                "{} not found, nothing to aggregate; run `brokerbench collect` first",
                path.display()
            );
            return Ok(());
        }
        Err(e) => return Err(e).with_context(|| format!("loading {}", input.display())),
    };
    if dataset.is_empty() {
        info!("{} has no rows, nothing to aggregate", input.display());
        return Ok(());
    }

    let mut writer = JsonChartWriter::new(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;
    for experiment_id in dataset.experiments() {
        let curves = aggregate(&dataset, experiment_id);
        for (broker, curve) in &curves {
            let overall = |metric: Metric| {
                let means: Vec<f64> = curve.points.iter().map(|p| p.stat(metric).mean).collect();
                brokerbench::Stat::from_values(&means).mean
            };
            info!(
                "experiment {experiment_id} {broker}: {} step(s), CPU {:.2}%, sent {:.2} KB/s, recv {:.2} KB/s",
                curve.points.len(),
                overall(Metric::Cpu),
                overall(Metric::NetSent),
                overall(Metric::NetRecv)
            );
        }
        writer.render(&ChartGroup::from_curves(experiment_id, &curves))?;
    }
    println!(
        "Wrote {} chart file(s) to {}",
        writer.written().len(),
        output_dir.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_interrupt_escalates() {
        let cancel = CancellationToken::new();
        assert!(!escalate(&cancel));
        assert!(cancel.is_cancelled());
        assert!(escalate(&cancel));
        assert!(escalate(&cancel));
    }

    #[test]
    fn test_interrupt_after_stdin_closed_escalates() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(escalate(&cancel));
    }
}
