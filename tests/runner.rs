// tests/runner.rs
#![cfg(unix)]

use std::error::Error;
use std::time::Duration;

use tokio::time::timeout;

use logpanes::command::CommandSpec;
use logpanes::engine::{FailureReason, RunOutcome};
use logpanes::exec::{CommandRunner, OutputLine, RunError, RunHandle, RunState, StdStream};
use logpanes::types::SuccessPredicate;
use logpanes_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

async fn drain(handle: &mut RunHandle) -> Vec<OutputLine> {
    let mut lines = Vec::new();
    while let Some(line) = handle.next_line().await {
        lines.push(line);
    }
    lines
}

fn texts(lines: &[OutputLine]) -> Vec<&str> {
    lines.iter().map(|l| l.text.as_str()).collect()
}

#[tokio::test]
async fn zero_exit_completes_with_all_lines() -> TestResult {
    init_tracing();

    let cmd = CommandSpec::shell("echo", "echo one; echo two; echo three");
    let mut handle = CommandRunner::default().start(&cmd)?;
    assert!(handle.pid().is_some());

    let lines = timeout(Duration::from_secs(5), drain(&mut handle)).await?;
    assert_eq!(texts(&lines), vec!["one", "two", "three"]);
    assert!(lines.iter().all(|l| l.stream == StdStream::StdOut));

    assert_eq!(handle.finish().await?, RunOutcome::Completed);
    assert_eq!(handle.state(), RunState::Succeeded);
    Ok(())
}

#[tokio::test]
async fn non_zero_exit_is_failed_with_code() -> TestResult {
    init_tracing();

    let cmd = CommandSpec::shell("fail", "echo bye; exit 3");
    let mut handle = CommandRunner::default().start(&cmd)?;
    let lines = drain(&mut handle).await;

    assert_eq!(texts(&lines), vec!["bye"]);
    assert_eq!(
        handle.finish().await?,
        RunOutcome::Failed(FailureReason::ExitCode(3))
    );
    assert_eq!(handle.state(), RunState::Failed);
    Ok(())
}

#[tokio::test]
async fn success_predicate_decides_classification() -> TestResult {
    init_tracing();

    let cmd = CommandSpec::shell("grep-like", "exit 1")
        .with_success(SuccessPredicate::Codes(vec![0, 1]));
    let mut handle = CommandRunner::default().start(&cmd)?;
    drain(&mut handle).await;
    assert_eq!(handle.finish().await?, RunOutcome::Completed);

    let cmd = CommandSpec::shell("strict", "exit 0")
        .with_success(SuccessPredicate::Codes(vec![2]));
    let mut handle = CommandRunner::default().start(&cmd)?;
    drain(&mut handle).await;
    assert_eq!(
        handle.finish().await?,
        RunOutcome::Failed(FailureReason::ExitCode(0))
    );
    Ok(())
}

#[tokio::test]
async fn stderr_is_merged_into_the_line_stream() -> TestResult {
    init_tracing();

    let cmd = CommandSpec::shell("mixed", "echo out; sleep 0.05; echo err 1>&2; sleep 0.05; echo out2");
    let mut handle = CommandRunner::default().start(&cmd)?;
    let lines = drain(&mut handle).await;

    assert_eq!(
        lines,
        vec![
            OutputLine { stream: StdStream::StdOut, text: "out".into() },
            OutputLine { stream: StdStream::StdErr, text: "err".into() },
            OutputLine { stream: StdStream::StdOut, text: "out2".into() },
        ]
    );
    handle.finish().await?;
    Ok(())
}

#[tokio::test]
async fn missing_executable_is_a_spawn_error() {
    init_tracing();

    let cmd = CommandSpec::argv("ghost", ["/definitely/not/a/real/program"]);
    match CommandRunner::default().start(&cmd) {
        Err(RunError::Spawn { command, .. }) => assert_eq!(command, "ghost"),
        other => panic!("expected SpawnError, got {other:?}"),
    }
}

#[tokio::test]
async fn silent_command_reaches_finish_promptly() -> TestResult {
    init_tracing();

    let cmd = CommandSpec::argv("true", ["true"]);
    let mut handle = CommandRunner::default().start(&cmd)?;
    let outcome = timeout(Duration::from_secs(2), async {
        assert!(handle.next_line().await.is_none());
        handle.finish().await
    })
    .await??;
    assert_eq!(outcome, RunOutcome::Completed);
    Ok(())
}

#[tokio::test]
async fn output_before_death_is_delivered_before_failure() -> TestResult {
    init_tracing();

    // Last line has no trailing newline and the shell kills itself.
    let cmd = CommandSpec::shell("dying", "echo first; printf 'partial'; kill -9 $$");
    let mut handle = CommandRunner::default().start(&cmd)?;
    let lines = drain(&mut handle).await;

    assert_eq!(texts(&lines), vec!["first", "partial"]);
    assert_eq!(
        handle.finish().await?,
        RunOutcome::Failed(FailureReason::Terminated)
    );
    Ok(())
}

#[tokio::test]
async fn finishing_twice_is_a_wait_error() -> TestResult {
    init_tracing();

    let cmd = CommandSpec::argv("true", ["true"]);
    let mut handle = CommandRunner::default().start(&cmd)?;
    drain(&mut handle).await;
    handle.finish().await?;

    match handle.finish().await {
        Err(RunError::AlreadyFinished { command }) => assert_eq!(command, "true"),
        other => panic!("expected AlreadyFinished, got {other:?}"),
    }
    assert_eq!(
        FailureReason::from(&RunError::AlreadyFinished { command: "true".into() }),
        FailureReason::Wait("[true] process was already reaped".into())
    );
    Ok(())
}

#[tokio::test]
async fn kill_terminates_a_long_running_process() -> TestResult {
    init_tracing();

    let cmd = CommandSpec::argv("sleeper", ["sleep", "30"]);
    let mut handle = CommandRunner::default().start(&cmd)?;
    handle.kill().await?;

    let outcome = timeout(Duration::from_secs(2), handle.finish()).await??;
    assert_eq!(outcome, RunOutcome::Failed(FailureReason::Terminated));
    Ok(())
}

#[tokio::test]
async fn invalid_utf8_and_crlf_are_normalised() -> TestResult {
    init_tracing();

    let cmd = CommandSpec::shell("bytes", r"printf 'caf\303\251\r\nbad\377byte\n'");
    let mut handle = CommandRunner::default().start(&cmd)?;
    let lines = drain(&mut handle).await;
    handle.finish().await?;

    assert_eq!(texts(&lines), vec!["café", "bad\u{FFFD}byte"]);
    Ok(())
}

#[tokio::test]
async fn cwd_and_env_are_applied() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let cmd = CommandSpec::shell("where", "pwd; echo $GREETING")
        .with_cwd(dir.path())
        .with_env("GREETING", "hello");
    let mut handle = CommandRunner::default().start(&cmd)?;
    let lines = drain(&mut handle).await;
    handle.finish().await?;

    let expected = dir.path().canonicalize()?;
    let pwd = std::path::PathBuf::from(&lines[0].text).canonicalize()?;
    assert_eq!(pwd, expected);
    assert_eq!(lines[1].text, "hello");
    Ok(())
}
