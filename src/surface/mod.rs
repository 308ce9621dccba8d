// src/surface/mod.rs

//! Display surface abstraction.
//!
//! The coordinator is the only writer of a surface: it owns it by value and
//! every method takes `&mut self`, so surfaces need neither `Sync` nor
//! interior locking. Pumping tasks never see the surface; they talk to the
//! coordinator through its event channel.
//!
//! - [`PlainSurface`] writes prefixed lines to any `io::Write` (stdout in the
//!   binary).
//! - Tests use a recording surface from the `test-utils` crate.

pub mod plain;

pub use plain::PlainSurface;

use crate::errors::Result;

/// Opaque handle to a pane created on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaneRef(usize);

impl PaneRef {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Terminal status badge shown on a finished pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Completed,
    Failed,
}

pub trait DisplaySurface {
    /// Create a new, empty, expanded pane.
    fn create_pane(&mut self, title: &str) -> Result<PaneRef>;

    /// Append text to a pane. `text` holds one or more lines joined by
    /// `\n`; the last line is the newest and must end up most visible.
    fn append(&mut self, pane: PaneRef, text: &str) -> Result<()>;

    /// Show the terminal badge and collapse the pane.
    fn set_status(&mut self, pane: PaneRef, badge: Badge, label: &str) -> Result<()>;
}
