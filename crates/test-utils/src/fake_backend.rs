use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use logpanes::command::CommandSpec;
use logpanes::engine::{CoordinatorEvent, FailureReason, PaneId, RunOutcome};
use logpanes::errors::{LogpanesError, Result};
use logpanes::exec::RunnerBackend;

/// What a fake command does once launched.
#[derive(Debug, Clone)]
pub struct Script {
    pub lines: Vec<String>,
    /// Pause before each line and before finishing.
    pub step_delay: Duration,
    pub outcome: RunOutcome,
}

impl Script {
    pub fn completes_with(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            step_delay: Duration::ZERO,
            outcome: RunOutcome::Completed,
        }
    }

    pub fn fails_with(lines: &[&str], reason: FailureReason) -> Self {
        Self {
            outcome: RunOutcome::Failed(reason),
            ..Self::completes_with(lines)
        }
    }

    pub fn step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }
}

/// A fake backend that:
/// - records which commands were launched
/// - plays a [`Script`] per command name (unknown names complete silently)
/// - turns `cancel_all` into `Failed(Cancelled)` for scripts still playing
/// - fails `launch` itself for names registered with [`refuse`](Self::refuse).
pub struct ScriptedBackend {
    events: mpsc::Sender<CoordinatorEvent>,
    scripts: HashMap<String, Script>,
    refused: HashSet<String>,
    launched: Arc<Mutex<Vec<String>>>,
    cancel: watch::Sender<bool>,
}

impl ScriptedBackend {
    pub fn new(events: mpsc::Sender<CoordinatorEvent>, launched: Arc<Mutex<Vec<String>>>) -> Self {
        let (cancel, _) = watch::channel(false);
        Self {
            events,
            scripts: HashMap::new(),
            refused: HashSet::new(),
            launched,
            cancel,
        }
    }

    pub fn script(mut self, name: &str, script: Script) -> Self {
        self.scripts.insert(name.to_string(), script);
        self
    }

    pub fn refuse(mut self, name: &str) -> Self {
        self.refused.insert(name.to_string());
        self
    }
}

impl RunnerBackend for ScriptedBackend {
    fn launch(
        &mut self,
        pane: PaneId,
        command: CommandSpec,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        self.launched.lock().unwrap().push(command.name.clone());
        if self.refused.contains(&command.name) {
            let err = std::io::Error::other(format!("backend refused {}", command.name));
            return Box::pin(async move { Err(LogpanesError::IoError(err)) });
        }
        let script = self
            .scripts
            .get(&command.name)
            .cloned()
            .unwrap_or_else(|| Script::completes_with(&[]));
        let tx = self.events.clone();
        let mut cancel = self.cancel.subscribe();

        Box::pin(async move {
            tokio::spawn(async move {
                let outcome = tokio::select! {
                    outcome = play(pane, &script, &tx) => outcome,
                    Ok(_) = cancel.wait_for(|c| *c) => RunOutcome::Failed(FailureReason::Cancelled),
                };
                let _ = tx.send(CoordinatorEvent::CommandFinished { pane, outcome }).await;
            });
            Ok(())
        })
    }

    fn cancel_all(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let _ = self.cancel.send(true);
        Box::pin(async { Ok(()) })
    }
}

async fn play(pane: PaneId, script: &Script, tx: &mpsc::Sender<CoordinatorEvent>) -> RunOutcome {
    for line in &script.lines {
        tokio::time::sleep(script.step_delay).await;
        let _ = tx
            .send(CoordinatorEvent::LineReceived {
                pane,
                line: line.clone(),
            })
            .await;
    }
    tokio::time::sleep(script.step_delay).await;
    script.outcome.clone()
}
