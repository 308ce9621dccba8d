// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::command::CommandSpec;
use crate::engine::CoordinatorOptions;
use crate::pane::RetentionPolicy;
use crate::types::{RepaintPolicy, SuccessPredicate};

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// retention_lines = 100
/// repaint = "tick"
///
/// [command.joe]
/// cmd = "python3 extprg.py Joe 10 2"
///
/// [command.averell]
/// argv = ["python3", "extprg.py", "Averell", "10", "2"]
/// success_codes = [0, 1]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    /// Global behaviour config from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All commands from `[command.<name>]`, keyed by name.
    #[serde(default)]
    pub command: BTreeMap<String, CommandConfig>,
}

/// Validated configuration. Only obtainable through
/// `ConfigFile::try_from(RawConfigFile)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub command: BTreeMap<String, CommandConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        command: BTreeMap<String, CommandConfig>,
    ) -> Self {
        Self { config, command }
    }

    /// All commands as runnable specs, in name order.
    pub fn command_specs(&self) -> Vec<CommandSpec> {
        self.command
            .iter()
            .map(|(name, cmd)| cmd.to_spec(name))
            .collect()
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSection {
    /// Lines kept per pane before the oldest are evicted.
    #[serde(default = "default_retention_lines")]
    pub retention_lines: usize,

    /// Optional byte cap per pane, applied in addition to `retention_lines`.
    #[serde(default)]
    pub retention_bytes: Option<usize>,

    /// `"line"` (default) or `"tick"`.
    #[serde(default)]
    pub repaint: RepaintPolicy,

    /// Repaint interval in milliseconds for `repaint = "tick"`.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Capacity of the coordinator's event channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_retention_lines() -> usize {
    200
}

fn default_tick_ms() -> u64 {
    100
}

fn default_event_buffer() -> usize {
    256
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            retention_lines: default_retention_lines(),
            retention_bytes: None,
            repaint: RepaintPolicy::default(),
            tick_ms: default_tick_ms(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl ConfigSection {
    pub fn retention(&self) -> RetentionPolicy {
        let policy = RetentionPolicy::lines(self.retention_lines);
        match self.retention_bytes {
            Some(bytes) => policy.with_max_bytes(bytes),
            None => policy,
        }
    }

    pub fn coordinator_options(&self) -> CoordinatorOptions {
        CoordinatorOptions {
            retention: self.retention(),
            repaint: self.repaint,
            tick: Duration::from_millis(self.tick_ms),
        }
    }
}

/// `[command.<name>]` section.
///
/// Exactly one of `cmd` and `argv` must be set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandConfig {
    /// Command line run through the platform shell.
    #[serde(default)]
    pub cmd: Option<String>,

    /// Program and arguments, run without a shell.
    #[serde(default)]
    pub argv: Option<Vec<String>>,

    /// Label used on the status badge; defaults to the command line.
    #[serde(default)]
    pub title: Option<String>,

    /// Exit codes counted as success; defaults to `[0]`.
    #[serde(default)]
    pub success_codes: Option<Vec<i32>>,

    /// Working directory for the process.
    #[serde(default)]
    pub cwd: Option<PathBuf>,

    /// Extra environment variables.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl CommandConfig {
    /// Build the runnable spec. Assumes the section passed validation.
    pub fn to_spec(&self, name: &str) -> CommandSpec {
        let mut spec = match (&self.cmd, &self.argv) {
            (_, Some(argv)) => CommandSpec::argv(name, argv.iter().cloned()),
            (Some(line), None) => CommandSpec::shell(name, line.clone()),
            (None, None) => CommandSpec::argv(name, Vec::<String>::new()),
        };

        if let Some(title) = &self.title {
            spec = spec.with_title(title.clone());
        }
        if let Some(codes) = &self.success_codes {
            spec = spec.with_success(SuccessPredicate::Codes(codes.clone()));
        }
        if let Some(cwd) = &self.cwd {
            spec = spec.with_cwd(cwd.clone());
        }
        for (key, value) in &self.env {
            spec = spec.with_env(key.clone(), value.clone());
        }
        spec
    }
}
