// src/surface/plain.rs

use std::io::Write;

use crate::errors::Result;
use crate::surface::{Badge, DisplaySurface, PaneRef};

/// Line-oriented surface: every line is printed with its pane's prefix.
///
/// ```text
/// [joe] My name is Joe and this is message 0 sent to stdout
/// [joe] ✔ python3 extprg.py Joe: Complete
/// ```
///
/// Interleaving across panes follows the order the coordinator applies
/// updates, which is arrival order.
pub struct PlainSurface<W: Write> {
    out: W,
    prefixes: Vec<String>,
}

impl<W: Write> PlainSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            prefixes: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn prefix(&self, pane: PaneRef) -> &str {
        self.prefixes
            .get(pane.index())
            .map(String::as_str)
            .unwrap_or("[?]")
    }
}

impl PlainSurface<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> DisplaySurface for PlainSurface<W> {
    fn create_pane(&mut self, title: &str) -> Result<PaneRef> {
        let pane = PaneRef::new(self.prefixes.len());
        let prefix = format!("[{title}]");
        writeln!(self.out, "{prefix} started")?;
        self.prefixes.push(prefix);
        Ok(pane)
    }

    fn append(&mut self, pane: PaneRef, text: &str) -> Result<()> {
        let prefix = self.prefix(pane).to_owned();
        for line in text.split('\n') {
            writeln!(self.out, "{prefix} {line}")?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn set_status(&mut self, pane: PaneRef, badge: Badge, label: &str) -> Result<()> {
        let mark = match badge {
            Badge::Completed => "✔",
            Badge::Failed => "✘",
        };
        let prefix = self.prefix(pane).to_owned();
        writeln!(self.out, "{prefix} {mark} {label}")?;
        self.out.flush()?;
        Ok(())
    }
}
