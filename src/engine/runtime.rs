// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::command::CommandSpec;
use crate::errors::Result;
use crate::exec::RunnerBackend;
use crate::surface::{DisplaySurface, PaneRef};
use crate::types::RepaintPolicy;

use super::core::CoreCoordinator;
use super::{
    CoordinatorEvent, CoordinatorOptions, CoreCommand, FailureReason, PaneId, RunOutcome, RunReport,
};

/// Runs a set of commands concurrently, one pane each.
///
/// This is the single owner of the display surface: pumping tasks only send
/// `CoordinatorEvent`s, and every surface mutation happens here, serialized
/// through [`CoreCoordinator::step`]. Command execution is delegated to a
/// `RunnerBackend`.
pub struct Coordinator<S: DisplaySurface, B: RunnerBackend> {
    core: CoreCoordinator,
    surface: S,
    backend: B,
    event_rx: mpsc::Receiver<CoordinatorEvent>,
    pane_refs: Vec<PaneRef>,
}

impl<S: DisplaySurface, B: RunnerBackend> fmt::Debug for Coordinator<S, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("core", &self.core)
            .field("pane_refs", &self.pane_refs)
            .finish_non_exhaustive()
    }
}

impl<S: DisplaySurface, B: RunnerBackend> Coordinator<S, B> {
    /// `event_rx` must be the receiving end of the channel the backend
    /// reports into.
    pub fn new(
        surface: S,
        backend: B,
        event_rx: mpsc::Receiver<CoordinatorEvent>,
        options: CoordinatorOptions,
    ) -> Self {
        Self {
            core: CoreCoordinator::new(options),
            surface,
            backend,
            event_rx,
            pane_refs: Vec::new(),
        }
    }

    /// Run every command in `selected` concurrently.
    ///
    /// Creates one pane per command, launches them all, then applies
    /// events until every pane has a terminal status. One command failing
    /// (launch, spawn, wait or exit code) never stops its siblings.
    pub async fn run(mut self, selected: Vec<CommandSpec>) -> Result<RunReport> {
        info!(commands = selected.len(), "coordinator started");

        for command in &selected {
            let pane_ref = self.surface.create_pane(&command.name)?;
            let pane = self.core.add_pane(command);
            debug_assert_eq!(pane, self.pane_refs.len());
            self.pane_refs.push(pane_ref);
        }

        for (pane, command) in selected.into_iter().enumerate() {
            debug!(pane, command = %command.name, "launching command");
            let name = command.name.clone();
            if let Err(err) = self.backend.launch(pane, command).await {
                warn!(pane, command = %name, error = %err, "launch failed; failing this pane only");
                let step = self.core.step(CoordinatorEvent::CommandFinished {
                    pane,
                    outcome: RunOutcome::Failed(FailureReason::Spawn(err.to_string())),
                });
                for command in step.commands {
                    self.execute_command(command).await?;
                }
            }
        }

        if self.core.is_idle() {
            info!("nothing to run");
            return Ok(self.core.report());
        }

        self.event_loop().await?;

        info!("coordinator exiting");
        Ok(self.core.report())
    }

    /// Main event loop.
    ///
    /// - Consumes `CoordinatorEvent`s from `event_rx` (plus repaint ticks).
    /// - Feeds them into the core.
    /// - Executes commands returned by the core.
    async fn event_loop(&mut self) -> Result<()> {
        let options = *self.core.options();
        let ticking = options.repaint == RepaintPolicy::Tick;
        let mut ticker = interval(options.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let event = tokio::select! {
                event = self.event_rx.recv() => match event {
                    Some(e) => e,
                    None => {
                        warn!("coordinator event channel closed before every pane finished");
                        for command in self.core.finalize_unfinished(FailureReason::Cancelled) {
                            self.execute_command(command).await?;
                        }
                        break;
                    }
                },
                _ = ticker.tick(), if ticking => CoordinatorEvent::RepaintTick,
            };

            if !matches!(event, CoordinatorEvent::LineReceived { .. } | CoordinatorEvent::RepaintTick) {
                debug!(?event, "coordinator received event");
            }

            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                info!("all panes final; stopping coordinator");
                break;
            }
        }

        Ok(())
    }

    /// Execute a single command from the core.
    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::Append { pane, lines } => {
                let pane_ref = self.pane_ref(pane);
                self.surface.append(pane_ref, &lines.join("\n"))?;
            }
            CoreCommand::SetStatus { pane, badge, label } => {
                let pane_ref = self.pane_ref(pane);
                self.surface.set_status(pane_ref, badge, &label)?;
            }
            CoreCommand::CancelAll => {
                info!("shutdown requested; cancelling running commands");
                self.backend.cancel_all().await?;
            }
        }
        Ok(())
    }

    // Core pane ids and surface refs are assigned together in `run`, so
    // every id the core emits has a ref.
    fn pane_ref(&self, pane: PaneId) -> PaneRef {
        self.pane_refs[pane]
    }
}
