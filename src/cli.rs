// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::RepaintPolicy;

/// Command-line arguments for `logpanes`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "logpanes",
    version,
    about = "Run several long-lived commands concurrently, one log pane each.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML). Defaults to `Logpanes.toml`.
    #[arg(long, value_name = "PATH", conflicts_with = "cmd")]
    pub config: Option<PathBuf>,

    /// Run only these configured commands (repeatable). Default: all.
    #[arg(long = "only", value_name = "NAME", conflicts_with = "cmd")]
    pub only: Vec<String>,

    /// Ad-hoc shell command to run (repeatable); bypasses the config file.
    #[arg(long = "cmd", value_name = "LINE")]
    pub cmd: Vec<String>,

    /// Override `[config].retention_lines`.
    #[arg(long, value_name = "LINES")]
    pub retention: Option<usize>,

    /// Override `[config].repaint`.
    #[arg(long, value_parser = parse_repaint, value_name = "POLICY")]
    pub repaint: Option<RepaintPolicy>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `LOGPANES_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the selected commands, but don't run them.
    #[arg(long)]
    pub dry_run: bool,
}

fn parse_repaint(s: &str) -> Result<RepaintPolicy, String> {
    s.parse()
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
