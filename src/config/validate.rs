// src/config/validate.rs

use crate::config::model::{CommandConfig, ConfigFile, RawConfigFile};
use crate::errors::{LogpanesError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = LogpanesError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.command))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_commands(cfg)?;
    validate_global_config(cfg)?;
    for (name, command) in cfg.command.iter() {
        validate_command(name, command)?;
    }
    Ok(())
}

fn ensure_has_commands(cfg: &RawConfigFile) -> Result<()> {
    if cfg.command.is_empty() {
        return Err(LogpanesError::ConfigError(
            "config must contain at least one [command.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    let c = &cfg.config;
    if c.retention_lines == 0 {
        return Err(LogpanesError::ConfigError(
            "[config].retention_lines must be >= 1 (got 0)".to_string(),
        ));
    }
    if c.retention_bytes == Some(0) {
        return Err(LogpanesError::ConfigError(
            "[config].retention_bytes must be >= 1 (got 0)".to_string(),
        ));
    }
    if c.tick_ms == 0 {
        return Err(LogpanesError::ConfigError(
            "[config].tick_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    if c.event_buffer == 0 {
        return Err(LogpanesError::ConfigError(
            "[config].event_buffer must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_command(name: &str, command: &CommandConfig) -> Result<()> {
    match (&command.cmd, &command.argv) {
        (Some(_), Some(_)) => {
            return Err(LogpanesError::ConfigError(format!(
                "command '{name}' sets both `cmd` and `argv`; use exactly one"
            )));
        }
        (None, None) => {
            return Err(LogpanesError::ConfigError(format!(
                "command '{name}' needs either `cmd` or `argv`"
            )));
        }
        (Some(line), None) if line.trim().is_empty() => {
            return Err(LogpanesError::ConfigError(format!(
                "command '{name}' has an empty `cmd`"
            )));
        }
        (None, Some(argv)) if argv.first().is_none_or(|p| p.trim().is_empty()) => {
            return Err(LogpanesError::ConfigError(format!(
                "command '{name}' has an empty `argv` or program name"
            )));
        }
        _ => {}
    }

    if command.success_codes.as_ref().is_some_and(Vec::is_empty) {
        return Err(LogpanesError::ConfigError(format!(
            "command '{name}' has an empty `success_codes` list"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> Result<ConfigFile> {
        crate::config::parse_config(toml_src)
    }

    fn config_error(toml_src: &str) -> String {
        match parse(toml_src) {
            Err(LogpanesError::ConfigError(msg)) => msg,
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let cfg = parse(
            r#"
[command.joe]
cmd = "echo joe"
"#,
        )
        .unwrap();
        assert_eq!(cfg.config.retention_lines, 200);
        assert_eq!(cfg.config.tick_ms, 100);
        assert_eq!(cfg.command.len(), 1);
    }

    #[test]
    fn rejects_empty_config() {
        assert!(config_error("").contains("at least one"));
    }

    #[test]
    fn rejects_cmd_and_argv_together() {
        let msg = config_error(
            r#"
[command.x]
cmd = "echo"
argv = ["echo"]
"#,
        );
        assert!(msg.contains("both"));
    }

    #[test]
    fn rejects_missing_and_blank_invocations() {
        assert!(config_error("[command.x]\ntitle = \"t\"\n").contains("either"));
        assert!(config_error("[command.x]\ncmd = \"  \"\n").contains("empty `cmd`"));
        assert!(config_error("[command.x]\nargv = []\n").contains("empty `argv`"));
    }

    #[test]
    fn rejects_zero_limits() {
        let msg = config_error(
            r#"
[config]
retention_lines = 0

[command.x]
cmd = "true"
"#,
        );
        assert!(msg.contains("retention_lines"));

        let msg = config_error(
            r#"
[config]
tick_ms = 0

[command.x]
cmd = "true"
"#,
        );
        assert!(msg.contains("tick_ms"));
    }

    #[test]
    fn rejects_empty_success_codes() {
        let msg = config_error("[command.x]\ncmd = \"true\"\nsuccess_codes = []\n");
        assert!(msg.contains("success_codes"));
    }

    #[test]
    fn unknown_repaint_policy_is_a_toml_error() {
        let result = parse(
            r#"
[config]
repaint = "sometimes"

[command.x]
cmd = "true"
"#,
        );
        assert!(matches!(result, Err(LogpanesError::TomlError(_))));
    }
}
