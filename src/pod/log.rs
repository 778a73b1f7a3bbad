use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub line: String,
}

/// Append-only command log shown under the office floor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PodLog {
    entries: Vec<LogEntry>,
}

impl PodLog {
    pub fn push(&mut self, line: impl Into<String>) {
        self.entries.push(LogEntry {
            at: Utc::now(),
            line: line.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.line.as_str())
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(|e| e.line.as_str())
    }
}
