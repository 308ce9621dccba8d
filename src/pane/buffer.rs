// src/pane/buffer.rs

use std::collections::VecDeque;

/// Limits applied to a [`LogBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Maximum number of retained lines (always >= 1).
    pub max_lines: usize,
    /// Optional cap on the summed byte length of retained lines.
    pub max_bytes: Option<usize>,
}

impl RetentionPolicy {
    pub fn lines(max_lines: usize) -> Self {
        Self {
            max_lines: max_lines.max(1),
            max_bytes: None,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::lines(200)
    }
}

/// Ordered, bounded sequence of output lines.
///
/// Appends are O(1) amortized; once a limit is exceeded the oldest lines are
/// evicted first. The newest line is always retained, even when it alone is
/// larger than `max_bytes`.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    lines: VecDeque<String>,
    bytes: usize,
    policy: RetentionPolicy,
    total: u64,
    evicted: u64,
}

impl LogBuffer {
    pub fn new(policy: RetentionPolicy) -> Self {
        Self {
            lines: VecDeque::with_capacity(policy.max_lines.min(1024)),
            bytes: 0,
            policy,
            total: 0,
            evicted: 0,
        }
    }

    /// Append one line, evicting from the front as needed.
    ///
    /// Returns how many lines were evicted by this call.
    pub fn push(&mut self, line: String) -> usize {
        self.bytes += line.len();
        self.lines.push_back(line);
        self.total += 1;

        let mut evicted = 0;
        while self.lines.len() > 1 && self.over_limit() {
            if let Some(old) = self.lines.pop_front() {
                self.bytes -= old.len();
                evicted += 1;
            }
        }
        self.evicted += evicted as u64;
        evicted
    }

    fn over_limit(&self) -> bool {
        self.lines.len() > self.policy.max_lines
            || self.policy.max_bytes.is_some_and(|max| self.bytes > max)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Retained bytes (sum of line lengths, without separators).
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    /// Lines ever pushed, including evicted ones.
    pub fn total_lines(&self) -> u64 {
        self.total
    }

    pub fn evicted_lines(&self) -> u64 {
        self.evicted
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.lines.iter().map(String::as_str)
    }

    /// The newest `n` retained lines, oldest first.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &str> {
        let skip = self.lines.len().saturating_sub(n);
        self.lines.iter().skip(skip).map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }
}
