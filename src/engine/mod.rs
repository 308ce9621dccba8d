// src/engine/mod.rs

//! Coordination engine for logpanes.
//!
//! This module ties together:
//! - one [`LogPane`](crate::pane::LogPane) per selected command
//! - the event channel fed by pumping tasks (lines, completions)
//! - the single owner of the display surface
//!
//! The pure core state machine lives in [`core`]; the async/IO shell that
//! owns the surface and the runner backend is implemented in [`runtime`].

use std::fmt;

use crate::pane::RetentionPolicy;
use crate::types::RepaintPolicy;

/// Index of a pane inside one coordinator run (launch order).
pub type PaneId = usize;

/// Why a command ended up `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The process could not be launched.
    Spawn(String),
    /// The process could not be reaped.
    Wait(String),
    /// The process exited with a code the success predicate rejects.
    ExitCode(i32),
    /// The process ended without an exit code (killed by a signal).
    Terminated,
    /// The run was cancelled and the process killed.
    Cancelled,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Spawn(msg) => write!(f, "failed to start: {msg}"),
            FailureReason::Wait(msg) => write!(f, "failed to reap: {msg}"),
            FailureReason::ExitCode(code) => write!(f, "exit code {code}"),
            FailureReason::Terminated => f.write_str("terminated by signal"),
            FailureReason::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Terminal result of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Failed(FailureReason),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Completed)
    }
}

/// Options shared by the core and the async shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorOptions {
    pub retention: RetentionPolicy,
    pub repaint: RepaintPolicy,
    /// Flush interval for [`RepaintPolicy::Tick`].
    pub tick: std::time::Duration,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            retention: RetentionPolicy::default(),
            repaint: RepaintPolicy::Line,
            tick: std::time::Duration::from_millis(100),
        }
    }
}

/// Events flowing into the coordinator from pumping tasks and signals.
#[derive(Debug, Clone)]
pub enum CoordinatorEvent {
    /// A command produced one line of output (stdout or stderr).
    LineReceived { pane: PaneId, line: String },
    /// End-of-stream marker: the command is done and reaped (or failed to
    /// start). Sent exactly once per launched command.
    CommandFinished { pane: PaneId, outcome: RunOutcome },
    /// Flush buffered lines to the surface (tick repaint policy).
    RepaintTick,
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

/// Final state of one pane after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneSummary {
    pub name: String,
    pub title: String,
    pub outcome: RunOutcome,
    pub lines: Vec<String>,
    pub total_lines: u64,
    pub evicted_lines: u64,
}

/// Result of [`Coordinator::run`], one summary per pane in launch order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub panes: Vec<PaneSummary>,
}

impl RunReport {
    pub fn all_succeeded(&self) -> bool {
        self.panes.iter().all(|p| p.outcome.is_success())
    }

    pub fn pane(&self, name: &str) -> Option<&PaneSummary> {
        self.panes.iter().find(|p| p.name == name)
    }
}

pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use self::core::CoreCoordinator;
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::Coordinator;
