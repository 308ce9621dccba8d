// src/engine/core.rs

//! Pure core coordinator state machine.
//!
//! This module contains a synchronous, deterministic "core" that consumes
//! [`CoordinatorEvent`]s and produces:
//! - updated pane state (buffers, statuses)
//! - a list of commands describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Coordinator`) is responsible for:
//! - reading events from the channel
//! - applying `Append` / `SetStatus` to the display surface
//! - forwarding cancellation to the runner backend
//!
//! The core is unit tested without any Tokio, channels, or processes.

use crate::command::CommandSpec;
use crate::engine::event_handlers::{
    handle_finished, handle_line, handle_tick, CoreCommand, CoreStep,
};
use crate::engine::{
    CoordinatorEvent, CoordinatorOptions, FailureReason, PaneId, PaneSummary, RunOutcome,
    RunReport,
};
use crate::pane::LogPane;

/// Pure core coordinator state.
///
/// Owns one [`LogPane`] per launched command. It has **no** channels, no
/// Tokio types, and does not perform any IO.
#[derive(Debug)]
pub struct CoreCoordinator {
    panes: Vec<LogPane>,
    options: CoordinatorOptions,
    shutting_down: bool,
}

impl CoreCoordinator {
    pub fn new(options: CoordinatorOptions) -> Self {
        Self {
            panes: Vec::new(),
            options,
            shutting_down: false,
        }
    }

    pub fn options(&self) -> &CoordinatorOptions {
        &self.options
    }

    /// Register a pane for `command`; ids are assigned in call order.
    pub fn add_pane(&mut self, command: &CommandSpec) -> PaneId {
        self.panes.push(LogPane::new(
            command.name.clone(),
            command.title.clone(),
            self.options.retention,
        ));
        self.panes.len() - 1
    }

    pub fn pane(&self, id: PaneId) -> Option<&LogPane> {
        self.panes.get(id)
    }

    pub fn panes(&self) -> &[LogPane] {
        &self.panes
    }

    /// True once every registered pane has a terminal status.
    pub fn is_idle(&self) -> bool {
        self.panes.iter().all(LogPane::is_final)
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down
    }

    /// Handle a single event, updating pane state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: CoordinatorEvent) -> CoreStep {
        let commands = match event {
            CoordinatorEvent::LineReceived { pane, line } => {
                handle_line(&mut self.panes, &self.options, pane, line)
            }
            CoordinatorEvent::CommandFinished { pane, outcome } => {
                handle_finished(&mut self.panes, pane, outcome)
            }
            CoordinatorEvent::RepaintTick => handle_tick(&mut self.panes),
            CoordinatorEvent::ShutdownRequested => {
                if self.shutting_down {
                    Vec::new()
                } else {
                    self.shutting_down = true;
                    vec![CoreCommand::CancelAll]
                }
            }
        };

        CoreStep {
            commands,
            keep_running: !self.is_idle(),
        }
    }

    /// Give every pane still running a `Failed(reason)` status.
    ///
    /// Used when no further events can arrive for them, so the surface and
    /// the report agree on their outcome.
    pub fn finalize_unfinished(&mut self, reason: FailureReason) -> Vec<CoreCommand> {
        let open: Vec<PaneId> = self
            .panes
            .iter()
            .enumerate()
            .filter(|(_, pane)| !pane.is_final())
            .map(|(id, _)| id)
            .collect();

        open.into_iter()
            .flat_map(|id| {
                handle_finished(&mut self.panes, id, RunOutcome::Failed(reason.clone()))
            })
            .collect()
    }

    /// Snapshot of every pane. A pane without a terminal status is
    /// reported as cancelled.
    pub fn report(&self) -> RunReport {
        let panes = self
            .panes
            .iter()
            .map(|pane| PaneSummary {
                name: pane.name().to_string(),
                title: pane.title().to_string(),
                outcome: pane
                    .outcome()
                    .cloned()
                    .unwrap_or(RunOutcome::Failed(FailureReason::Cancelled)),
                lines: pane.buffer().to_vec(),
                total_lines: pane.buffer().total_lines(),
                evicted_lines: pane.buffer().evicted_lines(),
            })
            .collect();
        RunReport { panes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pane::RetentionPolicy;
    use crate::surface::Badge;
    use crate::types::RepaintPolicy;

    fn core_with(repaint: RepaintPolicy, names: &[&str]) -> CoreCoordinator {
        let options = CoordinatorOptions {
            retention: RetentionPolicy::lines(3),
            repaint,
            ..CoordinatorOptions::default()
        };
        let mut core = CoreCoordinator::new(options);
        for name in names {
            core.add_pane(&CommandSpec::shell(*name, format!("echo {name}")));
        }
        core
    }

    fn line(pane: PaneId, text: &str) -> CoordinatorEvent {
        CoordinatorEvent::LineReceived {
            pane,
            line: text.to_string(),
        }
    }

    #[test]
    fn line_policy_forwards_each_line_immediately() {
        let mut core = core_with(RepaintPolicy::Line, &["a"]);
        let step = core.step(line(0, "hello"));
        assert!(step.keep_running);
        assert_eq!(
            step.commands,
            vec![CoreCommand::Append {
                pane: 0,
                lines: vec!["hello".into()]
            }]
        );
    }

    #[test]
    fn tick_policy_batches_until_tick() {
        let mut core = core_with(RepaintPolicy::Tick, &["a", "b"]);
        assert!(core.step(line(0, "a1")).commands.is_empty());
        assert!(core.step(line(1, "b1")).commands.is_empty());
        assert!(core.step(line(0, "a2")).commands.is_empty());

        let step = core.step(CoordinatorEvent::RepaintTick);
        assert_eq!(
            step.commands,
            vec![
                CoreCommand::Append {
                    pane: 0,
                    lines: vec!["a1".into(), "a2".into()]
                },
                CoreCommand::Append {
                    pane: 1,
                    lines: vec!["b1".into()]
                },
            ]
        );
        assert!(core.step(CoordinatorEvent::RepaintTick).commands.is_empty());
    }

    #[test]
    fn tick_batch_only_ships_retained_lines() {
        let mut core = core_with(RepaintPolicy::Tick, &["a"]);
        for i in 0..10 {
            core.step(line(0, &format!("l{i}")));
        }
        let step = core.step(CoordinatorEvent::RepaintTick);
        assert_eq!(
            step.commands,
            vec![CoreCommand::Append {
                pane: 0,
                lines: vec!["l7".into(), "l8".into(), "l9".into()]
            }]
        );
    }

    #[test]
    fn completion_flushes_pending_lines_before_status() {
        let mut core = core_with(RepaintPolicy::Tick, &["a"]);
        core.step(line(0, "last words"));
        let step = core.step(CoordinatorEvent::CommandFinished {
            pane: 0,
            outcome: RunOutcome::Failed(FailureReason::ExitCode(2)),
        });

        assert!(!step.keep_running);
        assert_eq!(step.commands.len(), 2);
        assert!(matches!(&step.commands[0], CoreCommand::Append { lines, .. } if lines == &vec!["last words".to_string()]));
        match &step.commands[1] {
            CoreCommand::SetStatus { pane, badge, label } => {
                assert_eq!(*pane, 0);
                assert_eq!(*badge, Badge::Failed);
                assert_eq!(label, "echo a: Ended with errors (exit code 2)");
            }
            other => panic!("expected SetStatus, got {other:?}"),
        }
    }

    #[test]
    fn keeps_running_until_every_pane_is_final() {
        let mut core = core_with(RepaintPolicy::Line, &["a", "b"]);
        let step = core.step(CoordinatorEvent::CommandFinished {
            pane: 1,
            outcome: RunOutcome::Completed,
        });
        assert!(step.keep_running);
        assert!(!core.is_idle());

        let step = core.step(CoordinatorEvent::CommandFinished {
            pane: 0,
            outcome: RunOutcome::Completed,
        });
        assert!(!step.keep_running);
        assert!(core.is_idle());
    }

    #[test]
    fn duplicate_completion_keeps_first_status() {
        let mut core = core_with(RepaintPolicy::Line, &["a", "b"]);
        core.step(CoordinatorEvent::CommandFinished {
            pane: 0,
            outcome: RunOutcome::Completed,
        });
        let step = core.step(CoordinatorEvent::CommandFinished {
            pane: 0,
            outcome: RunOutcome::Failed(FailureReason::ExitCode(1)),
        });
        assert!(step.commands.is_empty());
        assert_eq!(core.pane(0).unwrap().outcome(), Some(&RunOutcome::Completed));
    }

    #[test]
    fn shutdown_cancels_once_and_waits_for_panes() {
        let mut core = core_with(RepaintPolicy::Line, &["a"]);
        let step = core.step(CoordinatorEvent::ShutdownRequested);
        assert_eq!(step.commands, vec![CoreCommand::CancelAll]);
        assert!(step.keep_running);
        assert!(core.is_shutting_down());

        let step = core.step(CoordinatorEvent::ShutdownRequested);
        assert!(step.commands.is_empty());
    }

    #[test]
    fn report_lists_panes_in_launch_order() {
        let mut core = core_with(RepaintPolicy::Line, &["a", "b"]);
        for i in 0..5 {
            core.step(line(0, &format!("a{i}")));
        }
        core.step(CoordinatorEvent::CommandFinished {
            pane: 0,
            outcome: RunOutcome::Completed,
        });

        let report = core.report();
        assert_eq!(report.panes.len(), 2);
        let a = report.pane("a").unwrap();
        assert_eq!(a.lines, vec!["a2", "a3", "a4"]);
        assert_eq!(a.total_lines, 5);
        assert_eq!(a.evicted_lines, 2);
        assert_eq!(
            report.pane("b").unwrap().outcome,
            RunOutcome::Failed(FailureReason::Cancelled)
        );
        assert!(!report.all_succeeded());
    }

    #[test]
    fn finalize_unfinished_badges_only_open_panes() {
        let mut core = core_with(RepaintPolicy::Tick, &["a", "b", "c"]);
        core.step(CoordinatorEvent::CommandFinished {
            pane: 1,
            outcome: RunOutcome::Completed,
        });
        core.step(line(2, "pending"));

        let commands = core.finalize_unfinished(FailureReason::Cancelled);

        assert_eq!(
            commands,
            vec![
                CoreCommand::SetStatus {
                    pane: 0,
                    badge: Badge::Failed,
                    label: "echo a: Ended with errors (cancelled)".into(),
                },
                CoreCommand::Append {
                    pane: 2,
                    lines: vec!["pending".into()],
                },
                CoreCommand::SetStatus {
                    pane: 2,
                    badge: Badge::Failed,
                    label: "echo c: Ended with errors (cancelled)".into(),
                },
            ]
        );
        assert!(core.is_idle());
        assert_eq!(core.pane(1).unwrap().outcome(), Some(&RunOutcome::Completed));
        assert!(core.finalize_unfinished(FailureReason::Cancelled).is_empty());
    }
}
