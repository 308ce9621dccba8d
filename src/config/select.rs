// src/config/select.rs

use std::collections::BTreeSet;

use crate::command::CommandSpec;
use crate::config::model::ConfigFile;
use crate::errors::{LogpanesError, Result};

/// Resolve the caller's selection to runnable specs, in name order.
///
/// An empty selection means "every configured command". Duplicate names
/// collapse; any unknown name fails the whole selection.
pub fn select_commands<S: AsRef<str>>(cfg: &ConfigFile, names: &[S]) -> Result<Vec<CommandSpec>> {
    if names.is_empty() {
        return Ok(cfg.command_specs());
    }

    let wanted: BTreeSet<&str> = names.iter().map(AsRef::as_ref).collect();
    let unknown: Vec<&str> = wanted
        .iter()
        .copied()
        .filter(|name| !cfg.command.contains_key(*name))
        .collect();
    if !unknown.is_empty() {
        return Err(LogpanesError::UnknownCommand(unknown.join(", ")));
    }

    Ok(cfg
        .command
        .iter()
        .filter(|(name, _)| wanted.contains(name.as_str()))
        .map(|(name, cmd)| cmd.to_spec(name))
        .collect())
}
