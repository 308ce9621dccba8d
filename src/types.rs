use std::str::FromStr;

use serde::Deserialize;

/// How often pane content is pushed to the display surface.
///
/// - `Line`: every received line is forwarded immediately (lowest latency).
/// - `Tick`: lines are buffered in the pane and flushed on a fixed interval,
///   trading latency for throughput on very chatty commands.
///
/// Either way the surface only ever receives lines it has not seen yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepaintPolicy {
    Line,
    Tick,
}

impl Default for RepaintPolicy {
    fn default() -> Self {
        RepaintPolicy::Line
    }
}

impl FromStr for RepaintPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "line" => Ok(RepaintPolicy::Line),
            "tick" => Ok(RepaintPolicy::Tick),
            other => Err(format!(
                "invalid repaint policy: {other} (expected \"line\" or \"tick\")"
            )),
        }
    }
}

/// Rule mapping a process exit code to success or failure.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SuccessPredicate {
    /// Only exit code 0 counts as success.
    #[default]
    ZeroExit,
    /// Any of the listed exit codes counts as success.
    Codes(Vec<i32>),
}

impl SuccessPredicate {
    pub fn is_success(&self, code: i32) -> bool {
        match self {
            SuccessPredicate::ZeroExit => code == 0,
            SuccessPredicate::Codes(codes) => codes.contains(&code),
        }
    }
}
