// src/command.rs

//! Immutable description of one external command.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;

use crate::types::SuccessPredicate;

/// How the process is launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// A command line handed to the platform shell (`sh -c` / `cmd /C`).
    Shell(String),
    /// An explicit program + arguments, executed without a shell.
    Argv(Vec<String>),
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invocation::Shell(line) => f.write_str(line),
            Invocation::Argv(argv) => f.write_str(&argv.join(" ")),
        }
    }
}

/// A named command the coordinator can run.
///
/// Once built, a `CommandSpec` is never mutated; the runner only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: String,
    pub title: String,
    pub invocation: Invocation,
    pub success: SuccessPredicate,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
}

impl CommandSpec {
    /// Command run through the platform shell. The title defaults to the
    /// command line itself.
    pub fn shell(name: impl Into<String>, line: impl Into<String>) -> Self {
        Self::new(name, Invocation::Shell(line.into()))
    }

    /// Command run directly from an argv array.
    pub fn argv<I, S>(name: impl Into<String>, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, Invocation::Argv(argv.into_iter().map(Into::into).collect()))
    }

    fn new(name: impl Into<String>, invocation: Invocation) -> Self {
        Self {
            name: name.into(),
            title: invocation.to_string(),
            invocation,
            success: SuccessPredicate::default(),
            cwd: None,
            env: BTreeMap::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_success(mut self, success: SuccessPredicate) -> Self {
        self.success = success;
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Build the Tokio process command with both output streams piped.
    ///
    /// Stdin is closed so interactive programs fail fast instead of
    /// waiting for input nobody will send.
    pub(crate) fn to_process_command(&self) -> tokio::process::Command {
        let mut cmd = match &self.invocation {
            Invocation::Shell(line) => {
                if cfg!(windows) {
                    let mut c = tokio::process::Command::new("cmd");
                    c.arg("/C").arg(line);
                    c
                } else {
                    let mut c = tokio::process::Command::new("sh");
                    c.arg("-c").arg(line);
                    c
                }
            }
            Invocation::Argv(argv) => {
                // Validated configs never produce an empty argv; an empty
                // program name makes spawn fail with a SpawnError.
                let (program, args) = argv.split_first().map_or(("", &[][..]), |(p, a)| (p.as_str(), a));
                let mut c = tokio::process::Command::new(program);
                c.args(args);
                c
            }
        };

        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        cmd.envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_defaults_to_command_line() {
        let spec = CommandSpec::argv("ls", ["ls", "-la", "/tmp"]);
        assert_eq!(spec.title, "ls -la /tmp");

        let spec = CommandSpec::shell("joe", "python3 extprg.py Joe 10 2").with_title("Joe");
        assert_eq!(spec.title, "Joe");
        assert_eq!(spec.invocation.to_string(), "python3 extprg.py Joe 10 2");
    }

    #[test]
    fn builder_sets_optional_fields() {
        let spec = CommandSpec::shell("a", "true")
            .with_cwd("/tmp")
            .with_env("FOO", "bar")
            .with_success(SuccessPredicate::Codes(vec![0, 2]));
        assert_eq!(spec.cwd.as_deref(), Some(std::path::Path::new("/tmp")));
        assert_eq!(spec.env.get("FOO").map(String::as_str), Some("bar"));
        assert!(spec.success.is_success(2));
    }
}
