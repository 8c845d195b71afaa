use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Category assigned to every new task.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Format new deadlines are stored in.
pub const DEADLINE_FORMAT: &str = "%Y-%m-%dT%H:%M";

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Represents a single task in the task list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    /// Unique identifier, derived from the creation time in milliseconds.
    pub id: u64,
    /// Short name of the task.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Deadline as local date-time text.
    pub deadline: String,
    #[serde(default)]
    pub priority: Priority,
    /// Whether the task has been completed.
    #[serde(default)]
    pub completed: bool,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl Task {
    /// Parses the stored deadline text. `None` when it is not a recognizable date.
    pub fn deadline_at(&self) -> Option<NaiveDateTime> {
        parse_deadline(&self.deadline)
    }
}

/// Fields supplied by the user when creating a task.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub name: String,
    pub description: String,
    pub deadline: String,
    pub priority: Priority,
}

/// Task priority.
///
/// Stored values other than the three known ones are kept verbatim in
/// `Other`, so rewriting the collection never loses them.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    High,
    Medium,
    #[default]
    None,
    Other(String),
}

impl From<String> for Priority {
    fn from(s: String) -> Self {
        match s.as_str() {
            "high" => Priority::High,
            "medium" => Priority::Medium,
            "none" => Priority::None,
            _ => Priority::Other(s),
        }
    }
}

impl From<Priority> for String {
    fn from(p: Priority) -> Self {
        match p {
            Priority::Other(s) => s,
            known => known.to_string(),
        }
    }
}

impl FromStr for Priority {
    type Err = Error;

    /// Parses user input. Only the three known priorities are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(Priority::None),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(Error::InvalidPriority(s.to_string())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::None => "none",
            Priority::Other(s) => s.as_str(),
        };
        f.write_str(s)
    }
}

/// Parses deadline text in any of the accepted local forms, or RFC 3339.
///
/// A bare date is read as midnight of that day.
pub fn parse_deadline(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Validates user input and returns the deadline in the stored format.
pub fn normalize_deadline(raw: &str) -> Result<String, Error> {
    parse_deadline(raw)
        .map(|dt| dt.format(DEADLINE_FORMAT).to_string())
        .ok_or_else(|| Error::InvalidDeadline(raw.to_string()))
}
