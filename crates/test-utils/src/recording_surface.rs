use std::sync::{Arc, Mutex};

use logpanes::errors::Result;
use logpanes::surface::{Badge, DisplaySurface, PaneRef};

/// Everything a [`RecordingSurface`] was asked to show for one pane.
#[derive(Debug, Clone, Default)]
pub struct RecordedPane {
    pub title: String,
    pub lines: Vec<String>,
    pub appends: usize,
    pub status: Option<(Badge, String)>,
}

/// Surface operations in the order they were applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceOp {
    Created(String),
    Appended(String, usize),
    StatusSet(String, Badge),
}

#[derive(Debug, Default)]
pub struct SurfaceLog {
    pub panes: Vec<RecordedPane>,
    pub ops: Vec<SurfaceOp>,
}

impl SurfaceLog {
    pub fn pane(&self, title: &str) -> &RecordedPane {
        self.panes
            .iter()
            .find(|p| p.title == title)
            .unwrap_or_else(|| panic!("no pane titled {title}"))
    }

    /// Titles of panes in the order their status was set.
    pub fn status_order(&self) -> Vec<String> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::StatusSet(title, _) => Some(title.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Surface that records every call into a shared [`SurfaceLog`].
///
/// The coordinator consumes its surface, so tests keep a clone of the log
/// handle to inspect afterwards.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    log: Arc<Mutex<SurfaceLog>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Arc<Mutex<SurfaceLog>> {
        Arc::clone(&self.log)
    }
}

impl DisplaySurface for RecordingSurface {
    fn create_pane(&mut self, title: &str) -> Result<PaneRef> {
        let mut log = self.log.lock().unwrap();
        log.panes.push(RecordedPane {
            title: title.to_string(),
            ..RecordedPane::default()
        });
        log.ops.push(SurfaceOp::Created(title.to_string()));
        Ok(PaneRef::new(log.panes.len() - 1))
    }

    fn append(&mut self, pane: PaneRef, text: &str) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        let recorded = &mut log.panes[pane.index()];
        let count = text.split('\n').count();
        recorded.lines.extend(text.split('\n').map(str::to_owned));
        recorded.appends += 1;
        let title = recorded.title.clone();
        log.ops.push(SurfaceOp::Appended(title, count));
        Ok(())
    }

    fn set_status(&mut self, pane: PaneRef, badge: Badge, label: &str) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        let recorded = &mut log.panes[pane.index()];
        assert!(recorded.status.is_none(), "status set twice on {}", recorded.title);
        recorded.status = Some((badge, label.to_string()));
        let title = recorded.title.clone();
        log.ops.push(SurfaceOp::StatusSet(title, badge));
        Ok(())
    }
}
