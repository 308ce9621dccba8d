// src/exec/pump.rs

//! Per-command pumping task.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::command::CommandSpec;
use crate::engine::{CoordinatorEvent, FailureReason, PaneId, RunOutcome};
use crate::exec::{CommandRunner, RunError, RunHandle};

/// Run one command and forward its output to the coordinator.
///
/// Always ends by sending exactly one `CommandFinished` for `pane`:
/// - spawn / wait errors become `Failed(Spawn | Wait)` on this pane only;
/// - if the cancel channel fires, the process is killed and reaped and the
///   pane ends as `Failed(Cancelled)`.
///
/// The task yields after every forwarded line so sibling pumps sharing a
/// worker thread keep making progress.
pub async fn pump_command(
    pane: PaneId,
    command: CommandSpec,
    runner: CommandRunner,
    events: mpsc::Sender<CoordinatorEvent>,
    cancel_rx: oneshot::Receiver<()>,
) {
    let name = command.name.clone();
    let outcome = match pump_inner(pane, &command, runner, &events, cancel_rx).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(command = %name, pane, error = %err, "command execution error");
            RunOutcome::Failed(FailureReason::from(&err))
        }
    };

    if events
        .send(CoordinatorEvent::CommandFinished { pane, outcome })
        .await
        .is_err()
    {
        warn!(command = %name, pane, "coordinator gone before CommandFinished was delivered");
    }
}

async fn pump_inner(
    pane: PaneId,
    command: &CommandSpec,
    runner: CommandRunner,
    events: &mpsc::Sender<CoordinatorEvent>,
    mut cancel_rx: oneshot::Receiver<()>,
) -> Result<RunOutcome, RunError> {
    let mut handle = runner.start(command)?;
    let mut cancel_armed = true;

    loop {
        tokio::select! {
            line = handle.next_line() => {
                let Some(line) = line else {
                    debug!(command = %command.name, pane, "output streams closed");
                    break;
                };
                let delivered = events
                    .send(CoordinatorEvent::LineReceived { pane, line: line.text })
                    .await;
                if delivered.is_err() {
                    warn!(command = %command.name, pane, "coordinator gone; killing process");
                    return cancel(&mut handle).await;
                }
                tokio::task::yield_now().await;
            }

            signal = &mut cancel_rx, if cancel_armed => {
                match signal {
                    Ok(()) => {
                        info!(
                            command = %command.name,
                            pane,
                            "cancellation requested; killing process"
                        );
                        return cancel(&mut handle).await;
                    }
                    Err(_) => {
                        // Supervisor dropped the sender without cancelling;
                        // keep pumping until the process ends on its own.
                        debug!(command = %command.name, pane, "cancel channel closed");
                        cancel_armed = false;
                    }
                }
            }
        }
    }

    handle.finish().await
}

/// Kill and reap, reporting the run as cancelled.
///
/// Remaining output is not drained: a grandchild may hold the pipes open
/// long after the direct child is gone.
async fn cancel(handle: &mut RunHandle) -> Result<RunOutcome, RunError> {
    handle.kill().await?;
    handle.finish().await?;
    Ok(RunOutcome::Failed(FailureReason::Cancelled))
}
