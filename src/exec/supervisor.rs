// src/exec/supervisor.rs

//! Background loop that launches pumps and tracks them for cancellation.

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::command::CommandSpec;
use crate::engine::{CoordinatorEvent, PaneId};
use crate::exec::pump::pump_command;
use crate::exec::CommandRunner;

/// Requests accepted by the supervisor loop.
#[derive(Debug)]
pub enum SupervisorRequest {
    /// Start pumping `command` into `pane`.
    Launch { pane: PaneId, command: CommandSpec },
    /// Kill every command that is still running.
    CancelAll,
}

/// Internal handle for a currently-running pump.
///
/// - `cancel` asks the pump to kill its process.
/// - `handle` is the Tokio task running the pump.
struct ActiveRun {
    command: String,
    cancel: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<()>,
}

/// Spawn the background supervisor loop.
///
/// Each launched command runs in its own Tokio task, so commands progress
/// in parallel and a slow command never holds back a fast one. **Per pane
/// there is never more than one pump**: a second `Launch` for a pane whose
/// pump is still alive is ignored.
pub fn spawn_supervisor(
    runner: CommandRunner,
    events: mpsc::Sender<CoordinatorEvent>,
) -> mpsc::Sender<SupervisorRequest> {
    let (tx, mut rx) = mpsc::channel::<SupervisorRequest>(32);

    tokio::spawn(async move {
        info!("supervisor loop started");

        let mut active: HashMap<PaneId, ActiveRun> = HashMap::new();

        while let Some(request) = rx.recv().await {
            match request {
                SupervisorRequest::Launch { pane, command } => {
                    launch(pane, command, runner, &events, &mut active);
                }
                SupervisorRequest::CancelAll => cancel_all(&mut active),
            }
        }

        // Dropping the cancel senders lets unfinished pumps run to
        // completion; kill_on_drop covers anything left when the runtime
        // shuts down.
        info!(active = active.len(), "supervisor loop finished (channel closed)");
    });

    tx
}

fn launch(
    pane: PaneId,
    command: CommandSpec,
    runner: CommandRunner,
    events: &mpsc::Sender<CoordinatorEvent>,
    active: &mut HashMap<PaneId, ActiveRun>,
) {
    if let Some(existing) = active.get(&pane) {
        if !existing.handle.is_finished() {
            warn!(
                pane,
                command = %command.name,
                running = %existing.command,
                "pane already has a running command; ignoring launch request"
            );
            return;
        }
    }

    let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
    let events = events.clone();
    let name = command.name.clone();
    let spawn_name = name.clone();

    let handle = tokio::spawn(async move {
        pump_command(pane, command, runner, events, cancel_rx).await;
        debug!(command = %spawn_name, pane, "pump finished");
    });

    active.insert(
        pane,
        ActiveRun {
            command: name,
            cancel: Some(cancel_tx),
            handle,
        },
    );
}

fn cancel_all(active: &mut HashMap<PaneId, ActiveRun>) {
    for (pane, run) in active.iter_mut() {
        if run.handle.is_finished() {
            continue;
        }
        match run.cancel.take() {
            Some(cancel) => {
                info!(pane = *pane, command = %run.command, "cancelling command");
                if cancel.send(()).is_err() {
                    debug!(
                        pane = *pane,
                        command = %run.command,
                        "command already finished while cancelling"
                    );
                }
            }
            None => {
                debug!(
                    pane = *pane,
                    command = %run.command,
                    "no cancel sender present; command may already have been cancelled"
                );
            }
        }
    }
}
