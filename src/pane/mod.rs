// src/pane/mod.rs

//! Per-command log state.
//!
//! - [`buffer`] holds the bounded line store with FIFO eviction.
//! - [`log_pane`] wraps a buffer with render bookkeeping and the one-shot
//!   terminal status.
//!
//! Nothing in here touches the display surface; the coordinator reads
//! unrendered lines out of a pane and forwards them.

pub mod buffer;
pub mod log_pane;

pub use buffer::{LogBuffer, RetentionPolicy};
pub use log_pane::{LogPane, PaneError, PaneStatus};
