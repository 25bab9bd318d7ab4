use std::fmt;

use chrono::{Local, NaiveTime};

/// Timestamped status lines shown while a plan is being generated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationLog {
    entries: Vec<OperationLogEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationLogEntry {
    pub time: NaiveTime,
    pub message: String,
}

impl OperationLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.push_at(Local::now().time(), message);
    }

    pub fn push_at(&mut self, time: NaiveTime, message: impl Into<String>) {
        self.entries.push(OperationLogEntry {
            time,
            message: message.into(),
        });
    }

    #[must_use]
    pub fn entries(&self) -> &[OperationLogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn messages(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.message.as_str()).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl fmt::Display for OperationLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.time.format("%H:%M:%S"), self.message)
    }
}

/// Shortens long context previews to `limit` characters.
#[must_use]
pub fn preview(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        format!("{}...", text.chars().take(limit).collect::<String>())
    } else {
        text.to_string()
    }
}
