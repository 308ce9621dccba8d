// src/pane/log_pane.rs

use thiserror::Error;

use crate::engine::RunOutcome;
use crate::pane::buffer::{LogBuffer, RetentionPolicy};

/// Lifecycle of a pane. Leaves `Running` exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneStatus {
    Running,
    Final { outcome: RunOutcome, label: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaneError {
    #[error("pane '{0}' already has a terminal status")]
    AlreadyFinal(String),
}

/// Bounded, incrementally rendered view of one command's output.
///
/// The pane remembers how many of its retained lines the display surface
/// has not received yet, so a repaint only ships the new tail instead of
/// the whole history. Evicted lines that were never rendered are simply
/// dropped: the surface would have scrolled them away anyway.
#[derive(Debug, Clone)]
pub struct LogPane {
    name: String,
    title: String,
    buffer: LogBuffer,
    unrendered: usize,
    status: PaneStatus,
    collapsed: bool,
}

impl LogPane {
    pub fn new(name: impl Into<String>, title: impl Into<String>, retention: RetentionPolicy) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            buffer: LogBuffer::new(retention),
            unrendered: 0,
            status: PaneStatus::Running,
            collapsed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn buffer(&self) -> &LogBuffer {
        &self.buffer
    }

    pub fn status(&self) -> &PaneStatus {
        &self.status
    }

    pub fn outcome(&self) -> Option<&RunOutcome> {
        match &self.status {
            PaneStatus::Running => None,
            PaneStatus::Final { outcome, .. } => Some(outcome),
        }
    }

    pub fn is_final(&self) -> bool {
        !matches!(self.status, PaneStatus::Running)
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Append one line. Returns `false` (and drops the line) once the pane
    /// is final: a finished pane's buffer is frozen.
    pub fn append(&mut self, line: String) -> bool {
        if self.is_final() {
            return false;
        }
        self.buffer.push(line);
        self.unrendered = (self.unrendered + 1).min(self.buffer.len());
        true
    }

    pub fn has_unrendered(&self) -> bool {
        self.unrendered > 0
    }

    /// Retained lines the surface has not been given yet, oldest first.
    /// Marks them as rendered.
    pub fn take_unrendered(&mut self) -> Vec<String> {
        let lines = self.buffer.tail(self.unrendered).map(str::to_owned).collect();
        self.unrendered = 0;
        lines
    }

    /// One-shot terminal transition; freezes the buffer and collapses the
    /// pane.
    pub fn finalize(&mut self, outcome: RunOutcome, label: impl Into<String>) -> Result<(), PaneError> {
        if self.is_final() {
            return Err(PaneError::AlreadyFinal(self.name.clone()));
        }
        self.status = PaneStatus::Final {
            outcome,
            label: label.into(),
        };
        self.collapsed = true;
        Ok(())
    }
}
