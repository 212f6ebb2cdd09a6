//! Task and calendar-day types shared by the allocator and the estimate engine.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
}

/// A validated task identifier (e.g. a Jira issue key such as `PROJ-42`).
///
/// The value is opaque to the core; it only has to be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId(String);

impl TaskId {
    /// Creates a new ID after validation.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::Empty { field: "task ID" });
        }
        Ok(Self(id))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TaskId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lifecycle status of a task.
///
/// Trackers report status as free text. Recognized values are parsed
/// case-insensitively; anything else is kept verbatim in [`TaskStatus::Other`],
/// which is never loggable, never eligible for estimate inference and never
/// transitioned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[default]
    Open,
    InProgress,
    Paused,
    Done,
    Other(String),
}

impl TaskStatus {
    /// Parses a tracker status name.
    pub fn parse(s: &str) -> Self {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "open" => Self::Open,
            "in progress" | "in-progress" | "in_progress" => Self::InProgress,
            "paused" | "pause" => Self::Paused,
            "done" => Self::Done,
            _ => Self::Other(s.trim().to_string()),
        }
    }

    /// Whether time may be allocated to a task in this status.
    pub const fn is_loggable(&self) -> bool {
        matches!(self, Self::Open | Self::InProgress | Self::Paused)
    }

    /// Whether a missing estimate may be inferred for a task in this status.
    pub const fn accepts_estimate(&self) -> bool {
        matches!(self, Self::Open)
    }

    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Paused => "PAUSED",
            Self::Done => "DONE",
            Self::Other(name) => name.as_str(),
        };
        write!(f, "{s}")
    }
}

impl From<&str> for TaskStatus {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl Serialize for TaskStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

/// A unit of trackable work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,

    /// Free-text title ("summary" in Jira).
    pub summary: String,

    /// Original estimate. Zero means unknown.
    pub estimate: Duration,

    /// Effort already recorded against the task.
    pub logged: Duration,

    pub status: TaskStatus,

    /// Grouping key (project).
    pub project: String,

    /// Parent grouping key (epic or parent issue), if any.
    pub parent: Option<String>,

    pub labels: BTreeSet<String>,

    pub created: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates an open, unestimated task with no logged time.
    pub fn new(id: TaskId, summary: impl Into<String>) -> Self {
        Self {
            id,
            summary: summary.into(),
            estimate: Duration::zero(),
            logged: Duration::zero(),
            status: TaskStatus::Open,
            project: String::new(),
            parent: None,
            labels: BTreeSet::new(),
            created: None,
        }
    }

    #[must_use]
    pub fn with_estimate(mut self, estimate: Duration) -> Self {
        self.estimate = estimate;
        self
    }

    #[must_use]
    pub fn with_logged(mut self, logged: Duration) -> Self {
        self.logged = logged;
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Estimated effort not yet logged. Negative when the task is over budget.
    pub fn remaining(&self) -> Duration {
        self.estimate - self.logged
    }

    pub fn has_estimate(&self) -> bool {
        self.estimate > Duration::zero()
    }
}

/// One calendar day's allocation context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCapacity {
    pub date: NaiveDate,

    /// Effort already logged on this day.
    pub consumed: Duration,
}

impl DayCapacity {
    pub fn new(date: NaiveDate, consumed: Duration) -> Self {
        Self {
            date,
            consumed: consumed.max(Duration::zero()),
        }
    }
}
