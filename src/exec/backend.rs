// src/exec/backend.rs

//! Pluggable runner backend abstraction.
//!
//! The coordinator talks to a `RunnerBackend` instead of spawning processes
//! itself. This keeps the coordinator testable with a fake backend that
//! emits scripted events.
//!
//! - `ProcessBackend` is the production implementation. It wraps the
//!   supervisor loop from [`spawn_supervisor`] and forwards requests to it
//!   over an mpsc channel.
//! - Tests can provide their own `RunnerBackend` that, for example, sends
//!   canned `LineReceived` / `CommandFinished` events without any process.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;

use crate::command::CommandSpec;
use crate::engine::{CoordinatorEvent, PaneId};
use crate::errors::{Error, Result};
use crate::exec::supervisor::{spawn_supervisor, SupervisorRequest};
use crate::exec::CommandRunner;

/// Trait abstracting how commands are executed.
///
/// Every `launch` must eventually produce exactly one
/// `CoordinatorEvent::CommandFinished` for the given pane, preceded by any
/// number of `LineReceived` events for it.
pub trait RunnerBackend: Send {
    /// Start running `command`, reporting into `pane`.
    fn launch(
        &mut self,
        pane: PaneId,
        command: CommandSpec,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Cancel every running command. Each cancelled command still reports
    /// its `CommandFinished`.
    fn cancel_all(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Backend that runs real OS processes.
pub struct ProcessBackend {
    tx: mpsc::Sender<SupervisorRequest>,
}

impl ProcessBackend {
    /// Create a process backend reporting into `events`.
    ///
    /// This spawns the background supervisor loop immediately, so it must
    /// be called from within a Tokio runtime.
    pub fn new(events: mpsc::Sender<CoordinatorEvent>) -> Self {
        Self::with_runner(CommandRunner::default(), events)
    }

    pub fn with_runner(runner: CommandRunner, events: mpsc::Sender<CoordinatorEvent>) -> Self {
        let tx = spawn_supervisor(runner, events);
        Self { tx }
    }
}

impl RunnerBackend for ProcessBackend {
    fn launch(
        &mut self,
        pane: PaneId,
        command: CommandSpec,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        // Clone the sender so the future doesn't borrow `self` across `await`.
        let tx = self.tx.clone();

        Box::pin(async move {
            tx.send(SupervisorRequest::Launch { pane, command })
                .await
                .map_err(Error::from)?;
            Ok(())
        })
    }

    fn cancel_all(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.tx.clone();

        Box::pin(async move {
            tx.send(SupervisorRequest::CancelAll)
                .await
                .map_err(Error::from)?;
            Ok(())
        })
    }
}
