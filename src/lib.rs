// src/lib.rs

pub mod cli;
pub mod command;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod pane;
pub mod surface;
pub mod types;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::command::CommandSpec;
use crate::config::{default_config_path, load_and_validate, select_commands, ConfigSection};
use crate::engine::{Coordinator, CoordinatorEvent, RunReport};
use crate::exec::ProcessBackend;
use crate::surface::PlainSurface;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (or ad-hoc `--cmd` commands) and selection
/// - the process backend
/// - the coordinator with a stdout surface
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<RunReport> {
    let (mut section, selected) = resolve_commands(&args)?;
    if let Some(lines) = args.retention {
        section.retention_lines = lines.max(1);
    }
    if let Some(repaint) = args.repaint {
        section.repaint = repaint;
    }

    if args.dry_run {
        print_dry_run(&section, &selected);
        return Ok(RunReport::default());
    }

    let (event_tx, event_rx) = mpsc::channel::<CoordinatorEvent>(section.event_buffer.max(1));
    let backend = ProcessBackend::new(event_tx.clone());

    // Ctrl-C → cancel every command; panes still get their final status.
    {
        let tx = event_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(CoordinatorEvent::ShutdownRequested).await;
        });
    }
    drop(event_tx);

    let names: Vec<_> = selected.iter().map(|c| c.name.as_str()).collect();
    info!(?names, "running selected commands");

    let coordinator = Coordinator::new(
        PlainSurface::stdout(),
        backend,
        event_rx,
        section.coordinator_options(),
    );
    let report = coordinator.run(selected).await?;

    print_summary(&report);
    Ok(report)
}

/// Commands from `--cmd` (named `cmd1`, `cmd2`, ...) or from the config
/// file filtered by `--only`. The CLI rejects mixing the two.
fn resolve_commands(args: &CliArgs) -> Result<(ConfigSection, Vec<CommandSpec>)> {
    if !args.cmd.is_empty() {
        let specs = args
            .cmd
            .iter()
            .enumerate()
            .map(|(i, line)| CommandSpec::shell(format!("cmd{}", i + 1), line.clone()))
            .collect();
        return Ok((ConfigSection::default(), specs));
    }

    let path = args.config.clone().unwrap_or_else(default_config_path);
    let cfg = load_and_validate(&path)?;
    let selected = select_commands(&cfg, &args.only)?;
    Ok((cfg.config, selected))
}

/// Simple dry-run output: print settings and the selected commands.
fn print_dry_run(section: &ConfigSection, selected: &[CommandSpec]) {
    println!("logpanes dry-run");
    println!("  config.retention_lines = {}", section.retention_lines);
    if let Some(bytes) = section.retention_bytes {
        println!("  config.retention_bytes = {bytes}");
    }
    println!("  config.repaint = {:?}", section.repaint);
    println!();

    println!("commands ({}):", selected.len());
    for spec in selected {
        println!("  - {}", spec.name);
        println!("      run: {}", spec.invocation);
        if spec.title != spec.invocation.to_string() {
            println!("      title: {}", spec.title);
        }
        println!("      success: {:?}", spec.success);
        if let Some(ref cwd) = spec.cwd {
            println!("      cwd: {}", cwd.display());
        }
        if !spec.env.is_empty() {
            println!("      env: {:?}", spec.env);
        }
    }

    debug!("dry-run complete (no execution)");
}

fn print_summary(report: &RunReport) {
    println!();
    println!("summary:");
    for pane in &report.panes {
        let mark = if pane.outcome.is_success() { "✔" } else { "✘" };
        println!(
            "  {mark} {:<16} {} lines ({} kept)",
            pane.name,
            pane.total_lines,
            pane.lines.len()
        );
    }
}
