// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::io::{self, Write};

use async_trait::async_trait;
use brokerbench::Decider;
use log::{debug, warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;

/// Operator decisions read from stdin. Lines are forwarded by a reader task
/// so a pending prompt still notices an interrupt. End of input cancels the
/// suite.
pub struct StdinDecider {
    lines: UnboundedReceiver<String>,
    cancel: CancellationToken,
}

impl StdinDecider {
    pub fn new(cancel: CancellationToken) -> Self {
        Self::from_reader(tokio::io::stdin(), cancel)
    }

    fn from_reader<R>(reader: R, cancel: CancellationToken) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(forward_lines(reader, tx));
        Self::from_lines(rx, cancel)
    }

    fn from_lines(lines: UnboundedReceiver<String>, cancel: CancellationToken) -> Self {
        Self { lines, cancel }
    }

    /// Drops input typed before the prompt was shown, e.g. while a run was
    /// recording.
    fn discard_pending(&mut self) {
        let mut discarded = 0;
        while self.lines.try_recv().is_ok() {
            discarded += 1;
        }
        if discarded > 0 {
            debug!("discarded {discarded} line(s) typed ahead of the prompt");
        }
    }
}

async fn forward_lines<R>(reader: R, tx: UnboundedSender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if tx.send(line).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!("reading stdin: {e}");
                break;
            }
        }
    }
}

#[async_trait]
impl Decider for StdinDecider {
    async fn confirm(&mut self, prompt: &str) -> bool {
        self.discard_pending();
        loop {
            print!("{prompt} [y/n] ");
            if let Err(e) = io::stdout().flush() {
                warn!("flushing prompt: {e}");
            }

            let line = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    println!();
                    return false;
                }
                line = self.lines.recv() => line,
            };
            let Some(line) = line else {
                println!();
                warn!("stdin closed, stopping");
                self.cancel.cancel();
                return false;
            };

            match parse_answer(&line) {
                Some(answer) => return answer,
                None => println!("Please answer y or n."),
            }
        }
    }
}

fn parse_answer(line: &str) -> Option<bool> {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}
