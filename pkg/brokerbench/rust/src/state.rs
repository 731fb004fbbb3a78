// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::fmt;

/// Lifecycle of one monitor loop execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Constructed, not sampling yet.
    Idle,
    /// Waiting for the next tick.
    Sampling,
    /// Reading counters for the current tick.
    SampleTick,
    /// Duration elapsed.
    Done,
    /// Interrupted by the operator; samples so far are kept.
    Aborted,
}

impl MonitorState {
    pub(crate) fn can_transition_to(self, next: MonitorState) -> bool {
        use MonitorState::*;
        matches!(
            (self, next),
            (Idle, Sampling)
                | (Sampling, SampleTick)
                | (SampleTick, Sampling)
                | (Sampling, Done)
                | (Sampling, Aborted)
        )
    }
}

impl fmt::Display for MonitorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorState::Idle => write!(f, "idle"),
            MonitorState::Sampling => write!(f, "sampling"),
            MonitorState::SampleTick => write!(f, "sample-tick"),
            MonitorState::Done => write!(f, "done"),
            MonitorState::Aborted => write!(f, "aborted"),
        }
    }
}

/// Per-observation state of an (experiment, broker) pair in the suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Waiting for the operator to start the run.
    AwaitConfirm,
    /// Monitor loop executing.
    Running,
    /// Waiting for the operator to accept or reject the run.
    AwaitAcceptance,
    /// Run kept; the next observation starts.
    Accepted,
    /// Run discarded; the same observation is repeated.
    Rejected,
    /// Suite stopped by the operator.
    Interrupted,
}

impl RunState {
    pub(crate) fn can_transition_to(self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (AwaitConfirm, Running)
                | (Running, AwaitAcceptance)
                | (AwaitAcceptance, Accepted)
                | (AwaitAcceptance, Rejected)
                | (Accepted, AwaitConfirm)
                | (Rejected, AwaitConfirm)
                | (AwaitConfirm, Interrupted)
                | (Running, Interrupted)
                | (AwaitAcceptance, Interrupted)
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::AwaitConfirm => write!(f, "await-confirm"),
            RunState::Running => write!(f, "running"),
            RunState::AwaitAcceptance => write!(f, "await-acceptance"),
            RunState::Accepted => write!(f, "accepted"),
            RunState::Rejected => write!(f, "rejected"),
            RunState::Interrupted => write!(f, "interrupted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitor_happy_path() {
        use MonitorState::*;
        let path = [Idle, Sampling, SampleTick, Sampling, SampleTick, Sampling, Done];
        for pair in path.windows(2) {
            if let [from, to] = pair {
                assert!(from.can_transition_to(*to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_monitor_terminal_states_are_final() {
        use MonitorState::*;
        for next in [Idle, Sampling, SampleTick, Done, Aborted] {
            assert!(!Done.can_transition_to(next));
            assert!(!Aborted.can_transition_to(next));
        }
        assert!(!Idle.can_transition_to(Done));
        assert!(Sampling.can_transition_to(Aborted));
    }

    #[test]
    fn test_run_reject_loops_back() {
        use RunState::*;
        assert!(AwaitAcceptance.can_transition_to(Rejected));
        assert!(Rejected.can_transition_to(AwaitConfirm));
        assert!(!Rejected.can_transition_to(Accepted));
        assert!(!AwaitConfirm.can_transition_to(AwaitAcceptance));
        assert!(!Interrupted.can_transition_to(AwaitConfirm));
    }

    #[test]
    fn test_display() {
        assert_eq!(MonitorState::SampleTick.to_string(), "sample-tick");
        assert_eq!(RunState::AwaitAcceptance.to_string(), "await-acceptance");
    }
}
