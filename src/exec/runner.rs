// src/exec/runner.rs

//! Launching one command and reading its merged output.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::command::CommandSpec;
use crate::engine::{FailureReason, RunOutcome};
use crate::exec::RunError;

/// Which standard stream a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdStream {
    StdOut,
    StdErr,
}

/// One line of process output, without its trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub stream: StdStream,
    pub text: String,
}

/// Lifecycle of a [`RunHandle`]. Leaves `Running` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Succeeded,
    Failed,
}

// Lines buffered between the stream readers and the consumer before the
// readers back off. Also bounds memory when the consumer is slow.
const DEFAULT_LINE_BUFFER: usize = 256;

/// Spawns commands and hands back [`RunHandle`]s.
#[derive(Debug, Clone, Copy)]
pub struct CommandRunner {
    line_buffer: usize,
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self {
            line_buffer: DEFAULT_LINE_BUFFER,
        }
    }
}

impl CommandRunner {
    pub fn new(line_buffer: usize) -> Self {
        Self {
            line_buffer: line_buffer.max(1),
        }
    }

    /// Spawn `command` with both output streams captured.
    ///
    /// Must be called from within a Tokio runtime: one reader task per
    /// stream is spawned to feed the handle's line sequence.
    pub fn start(&self, command: &CommandSpec) -> Result<RunHandle, RunError> {
        info!(
            command = %command.name,
            invocation = %command.invocation,
            "starting command process"
        );

        let mut child = command
            .to_process_command()
            .spawn()
            .map_err(|source| RunError::Spawn {
                command: command.name.clone(),
                source,
            })?;

        let (tx, rx) = mpsc::channel(self.line_buffer);
        if let Some(stdout) = child.stdout.take() {
            spawn_line_reader(command.name.clone(), stdout, StdStream::StdOut, tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_line_reader(command.name.clone(), stderr, StdStream::StdErr, tx);
        }

        Ok(RunHandle {
            command: command.clone(),
            pid: child.id(),
            child,
            lines: rx,
            state: RunState::Running,
        })
    }
}

/// A running (or finished) process plus its merged output stream.
///
/// Dropping the handle kills a still-running process.
#[derive(Debug)]
pub struct RunHandle {
    command: CommandSpec,
    pid: Option<u32>,
    child: Child,
    lines: mpsc::Receiver<OutputLine>,
    state: RunState,
}

impl RunHandle {
    pub fn command(&self) -> &CommandSpec {
        &self.command
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Next line from stdout or stderr, in arrival order.
    ///
    /// Returns `None` once the process has closed both streams; lines
    /// written just before the process died are still delivered first.
    /// Only the awaiting task is suspended.
    pub async fn next_line(&mut self) -> Option<OutputLine> {
        self.lines.recv().await
    }

    /// Reap the process and classify its exit code.
    ///
    /// Call after [`next_line`](Self::next_line) returned `None` (or after
    /// [`kill`](Self::kill)). A second call fails with
    /// [`RunError::AlreadyFinished`].
    pub async fn finish(&mut self) -> Result<RunOutcome, RunError> {
        if self.state != RunState::Running {
            return Err(RunError::AlreadyFinished {
                command: self.command.name.clone(),
            });
        }

        let status = match self.child.wait().await {
            Ok(status) => status,
            Err(source) => {
                self.state = RunState::Failed;
                return Err(RunError::Wait {
                    command: self.command.name.clone(),
                    source,
                });
            }
        };

        let outcome = match status.code() {
            Some(code) if self.command.success.is_success(code) => RunOutcome::Completed,
            Some(code) => RunOutcome::Failed(FailureReason::ExitCode(code)),
            None => RunOutcome::Failed(FailureReason::Terminated),
        };
        self.state = if outcome.is_success() {
            RunState::Succeeded
        } else {
            RunState::Failed
        };

        info!(
            command = %self.command.name,
            pid = ?self.pid,
            exit_code = ?status.code(),
            success = outcome.is_success(),
            "command process exited"
        );
        Ok(outcome)
    }

    /// Terminate the process. Killing an already-exited process is not an
    /// error.
    pub async fn kill(&mut self) -> Result<(), RunError> {
        match self.child.kill().await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => {
                debug!(command = %self.command.name, "process already exited before kill");
                Ok(())
            }
            Err(source) => Err(RunError::Kill {
                command: self.command.name.clone(),
                source,
            }),
        }
    }
}

/// Forward every line of `reader` into `tx` until EOF.
///
/// Lines are split on `\n`; a trailing `\r` is dropped and invalid UTF-8 is
/// replaced, so binary noise never aborts the stream.
fn spawn_line_reader<R>(command: String, reader: R, stream: StdStream, tx: mpsc::Sender<OutputLine>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        debug!(%command, ?stream, "line reader started");
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    if buf.last() == Some(&b'\n') {
                        buf.pop();
                    }
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                    let text = String::from_utf8_lossy(&buf).into_owned();
                    trace!(%command, ?stream, %text, "line read");
                    if tx.send(OutputLine { stream, text }).await.is_err() {
                        debug!(%command, ?stream, "line consumer gone; stopping reader");
                        break;
                    }
                }
                Err(e) => {
                    warn!(%command, ?stream, error = %e, "error reading process output");
                    break;
                }
            }
        }
        debug!(%command, ?stream, "line reader finished");
    });
}
