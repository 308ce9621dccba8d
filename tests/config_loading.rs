// tests/config_loading.rs

use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;

use logpanes::command::Invocation;
use logpanes::config::{load_and_validate, select_commands};
use logpanes::errors::LogpanesError;
use logpanes::types::{RepaintPolicy, SuccessPredicate};
use logpanes_test_utils::builders::{CommandConfigBuilder, ConfigFileBuilder};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn full_config_is_parsed_into_specs() {
    let file = write_config(
        r#"
[config]
retention_lines = 50
retention_bytes = 4096
repaint = "tick"
tick_ms = 250

[command.joe]
cmd = "python3 /tmp/extprg.py Joe 10 2"
title = "Joe"

[command.averell]
argv = ["python3", "/tmp/extprg.py", "Averell", "10", "2"]
success_codes = [0, 1]
cwd = "/tmp"
env = { PYTHONUNBUFFERED = "1" }
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    let options = cfg.config.coordinator_options();
    assert_eq!(options.retention.max_lines, 50);
    assert_eq!(options.retention.max_bytes, Some(4096));
    assert_eq!(options.repaint, RepaintPolicy::Tick);
    assert_eq!(options.tick, Duration::from_millis(250));

    let specs = select_commands::<&str>(&cfg, &[]).unwrap();
    let averell = &specs[0];
    assert_eq!(averell.name, "averell");
    assert_eq!(
        averell.invocation,
        Invocation::Argv(vec![
            "python3".into(),
            "/tmp/extprg.py".into(),
            "Averell".into(),
            "10".into(),
            "2".into()
        ])
    );
    assert_eq!(averell.title, "python3 /tmp/extprg.py Averell 10 2");
    assert_eq!(averell.success, SuccessPredicate::Codes(vec![0, 1]));
    assert_eq!(averell.env.get("PYTHONUNBUFFERED").map(String::as_str), Some("1"));

    let joe = &specs[1];
    assert_eq!(joe.title, "Joe");
    assert_eq!(
        joe.invocation,
        Invocation::Shell("python3 /tmp/extprg.py Joe 10 2".into())
    );
    assert_eq!(joe.success, SuccessPredicate::ZeroExit);
}

#[test]
fn missing_file_is_an_io_error() {
    let result = load_and_validate("/definitely/not/here/Logpanes.toml");
    assert!(matches!(result, Err(LogpanesError::IoError(_))));
}

#[test]
fn unknown_keys_are_rejected() {
    let file = write_config(
        r#"
[command.joe]
cmd = "echo joe"
retries = 3
"#,
    );
    match load_and_validate(file.path()) {
        Err(LogpanesError::TomlError(e)) => assert!(e.to_string().contains("retries")),
        other => panic!("expected TomlError, got {other:?}"),
    }
}

#[test]
fn ambiguous_command_returns_config_error() {
    let file = write_config(
        r#"
[command.joe]
cmd = "echo joe"
argv = ["echo", "joe"]
"#,
    );
    match load_and_validate(file.path()) {
        Err(LogpanesError::ConfigError(msg)) => {
            assert!(msg.contains("joe"));
            assert!(msg.contains("exactly one"));
        }
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn selecting_unknown_command_fails() {
    let cfg = ConfigFileBuilder::new()
        .with_command("joe", CommandConfigBuilder::shell("echo joe").build())
        .build();

    match select_commands(&cfg, &["william"]) {
        Err(LogpanesError::UnknownCommand(name)) => assert_eq!(name, "william"),
        other => panic!("expected UnknownCommand, got {other:?}"),
    }
}

#[test]
fn builder_config_carries_overrides() {
    let cfg = ConfigFileBuilder::new()
        .retention_lines(7)
        .repaint(RepaintPolicy::Tick)
        .with_command(
            "x",
            CommandConfigBuilder::argv(&["ls", "-l"])
                .title("listing")
                .success_codes(&[0, 2])
                .env("LC_ALL", "C")
                .build(),
        )
        .build();

    assert_eq!(cfg.config.retention().max_lines, 7);
    let spec = &cfg.command_specs()[0];
    assert_eq!(spec.title, "listing");
    assert!(spec.success.is_success(2));
    assert_eq!(spec.env.get("LC_ALL").map(String::as_str), Some("C"));
}

/// Sanity-check that demos/Logpanes.toml is wired the way its header says.
#[test]
fn demo_config_is_parsed_correctly() {
    let manifest_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let cfg = load_and_validate(manifest_dir.join("demos/Logpanes.toml")).unwrap();

    assert_eq!(cfg.config.retention_lines, 100);
    assert_eq!(cfg.config.repaint, RepaintPolicy::Tick);
    assert_eq!(cfg.command.len(), 4);

    let selected = select_commands(&cfg, &["joe", "averell"]).unwrap();
    let names: Vec<_> = selected.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["averell", "joe"]);
    assert!(matches!(selected[0].invocation, Invocation::Argv(_)));
    assert_eq!(selected[1].title, "sh demos/dalton.sh Joe");
}
