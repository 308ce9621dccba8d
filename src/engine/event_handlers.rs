// src/engine/event_handlers.rs

//! Event handling logic for the core coordinator.

use tracing::{debug, warn};

use crate::engine::{CoordinatorOptions, PaneId, RunOutcome};
use crate::pane::LogPane;
use crate::surface::Badge;
use crate::types::RepaintPolicy;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Push these new lines (oldest first) to the pane's surface region.
    Append { pane: PaneId, lines: Vec<String> },
    /// Show the terminal badge on the pane.
    SetStatus {
        pane: PaneId,
        badge: Badge,
        label: String,
    },
    /// Ask the runner backend to cancel every active command.
    CancelAll,
}

/// Decision returned by the core after handling a single event.
#[derive(Debug, Clone, Default)]
pub struct CoreStep {
    /// Commands the IO shell should execute, in order.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer loop should keep running.
    pub keep_running: bool,
}

/// Handle one output line.
///
/// With [`RepaintPolicy::Line`] the line is forwarded right away; with
/// [`RepaintPolicy::Tick`] it waits in the pane for the next tick.
pub fn handle_line(
    panes: &mut [LogPane],
    options: &CoordinatorOptions,
    pane: PaneId,
    line: String,
) -> Vec<CoreCommand> {
    let Some(target) = panes.get_mut(pane) else {
        warn!(pane, "line for unknown pane; dropping");
        return Vec::new();
    };

    if !target.append(line) {
        warn!(pane, command = %target.name(), "line after terminal status; dropping");
        return Vec::new();
    }

    match options.repaint {
        RepaintPolicy::Line => flush_pane(target, pane).into_iter().collect(),
        RepaintPolicy::Tick => Vec::new(),
    }
}

/// Handle the end-of-stream marker of one command.
///
/// Lines still waiting for a repaint are flushed before the badge, so the
/// surface never shows a final status above missing output.
pub fn handle_finished(panes: &mut [LogPane], pane: PaneId, outcome: RunOutcome) -> Vec<CoreCommand> {
    let Some(target) = panes.get_mut(pane) else {
        warn!(pane, "completion for unknown pane; ignoring");
        return Vec::new();
    };

    let mut commands: Vec<CoreCommand> = flush_pane(target, pane).into_iter().collect();

    let badge = if outcome.is_success() {
        Badge::Completed
    } else {
        Badge::Failed
    };
    let label = status_label(target.title(), &outcome);

    match target.finalize(outcome, label.clone()) {
        Ok(()) => {
            debug!(pane, command = %target.name(), %label, "pane finalized");
            commands.push(CoreCommand::SetStatus { pane, badge, label });
        }
        Err(e) => {
            warn!(pane, error = %e, "duplicate completion; keeping first status");
        }
    }

    commands
}

/// Flush every pane with pending lines (tick repaint policy).
pub fn handle_tick(panes: &mut [LogPane]) -> Vec<CoreCommand> {
    panes
        .iter_mut()
        .enumerate()
        .filter_map(|(id, pane)| flush_pane(pane, id))
        .collect()
}

fn flush_pane(pane: &mut LogPane, id: PaneId) -> Option<CoreCommand> {
    if !pane.has_unrendered() {
        return None;
    }
    Some(CoreCommand::Append {
        pane: id,
        lines: pane.take_unrendered(),
    })
}

/// Label shown next to a terminal badge.
pub fn status_label(title: &str, outcome: &RunOutcome) -> String {
    match outcome {
        RunOutcome::Completed => format!("{title}: Complete"),
        RunOutcome::Failed(reason) => format!("{title}: Ended with errors ({reason})"),
    }
}
