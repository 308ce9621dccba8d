// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running commands with
//! `tokio::process::Command` and reporting back to the coordinator via
//! `CoordinatorEvent`s.
//!
//! - [`runner`] spawns one process and exposes its merged line stream and
//!   final status (`CommandRunner` / `RunHandle`).
//! - [`pump`] is the per-command task that forwards lines into the
//!   coordinator's channel and ends with exactly one `CommandFinished`.
//! - [`supervisor`] owns the background loop tracking active pumps so they
//!   can be cancelled.
//! - [`backend`] provides the `RunnerBackend` trait and the production
//!   `ProcessBackend`; tests can replace it with a scripted fake.

pub mod backend;
pub mod pump;
pub mod runner;
pub mod supervisor;

pub use backend::{ProcessBackend, RunnerBackend};
pub use runner::{CommandRunner, OutputLine, RunHandle, RunState, StdStream};
pub use supervisor::spawn_supervisor;

use thiserror::Error;

use crate::engine::FailureReason;

/// Errors from launching, reaping or killing a process.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("[{command}] cannot start process")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("[{command}] cannot wait for process")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("[{command}] process was already reaped")]
    AlreadyFinished { command: String },
    #[error("[{command}] cannot kill process")]
    Kill {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<&RunError> for FailureReason {
    fn from(err: &RunError) -> Self {
        match err {
            RunError::Spawn { source, .. } => FailureReason::Spawn(source.to_string()),
            RunError::Wait { source, .. } | RunError::Kill { source, .. } => {
                FailureReason::Wait(source.to_string())
            }
            RunError::AlreadyFinished { .. } => FailureReason::Wait(err.to_string()),
        }
    }
}
