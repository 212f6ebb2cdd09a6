//! Jira REST v2 payloads.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use lw_core::{Task, TaskId, TaskStatus};
use serde::Deserialize;

use crate::JiraError;

/// Timestamp format Jira expects when creating worklogs.
pub const JIRA_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Lenient variant for parsing, accepting any fractional precision.
const JIRA_TIME_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

pub fn parse_time(value: &str) -> Result<DateTime<FixedOffset>, JiraError> {
    DateTime::parse_from_str(value, JIRA_TIME_PARSE_FORMAT).map_err(|source| {
        JiraError::InvalidTimestamp {
            value: value.to_string(),
            source,
        }
    })
}

/// One page of `search/jql` results.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub issues: Vec<Issue>,
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub is_last: bool,
}

impl SearchResponse {
    /// Token for the following page, or `None` on the last page.
    pub fn next_page(&self) -> Option<&str> {
        if self.is_last {
            return None;
        }
        self.next_page_token.as_deref().filter(|token| !token.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct Issue {
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

#[derive(Debug, Default, Deserialize)]
pub struct IssueFields {
    pub summary: Option<String>,
    pub status: Option<Named>,
    pub project: Option<Keyed>,
    pub parent: Option<Keyed>,
    pub labels: Option<Vec<String>>,
    pub created: Option<String>,
    pub timeoriginalestimate: Option<i64>,
    pub timespent: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct Named {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Keyed {
    pub key: String,
}

impl IssueFields {
    pub fn status(&self) -> TaskStatus {
        TaskStatus::parse(self.status.as_ref().map_or("", |s| s.name.as_str()))
    }

    pub fn original_estimate(&self) -> Duration {
        Duration::seconds(self.timeoriginalestimate.unwrap_or(0))
    }
}

impl Issue {
    pub fn into_task(self) -> Result<Task, JiraError> {
        let id = TaskId::new(self.key)
            .map_err(|err| JiraError::InvalidResponse(format!("issue without key: {err}")))?;
        let fields = self.fields;

        let mut task = Task::new(id, fields.summary.clone().unwrap_or_default())
            .with_estimate(fields.original_estimate())
            .with_logged(Duration::seconds(fields.timespent.unwrap_or(0)))
            .with_status(fields.status())
            .with_labels(fields.labels.unwrap_or_default());

        if let Some(project) = fields.project {
            task = task.with_project(project.key);
        }
        if let Some(parent) = fields.parent {
            task = task.with_parent(parent.key);
        }
        task.created = fields
            .created
            .as_deref()
            .and_then(|created| parse_time(created).ok())
            .map(|created| created.with_timezone(&Utc));

        Ok(task)
    }
}

#[derive(Debug, Deserialize)]
pub struct WorklogResponse {
    #[serde(default)]
    pub worklogs: Vec<Worklog>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worklog {
    pub started: String,
    pub time_spent_seconds: i64,
}

#[derive(Debug, Deserialize)]
pub struct TransitionsResponse {
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Deserialize)]
pub struct Transition {
    pub id: String,
    pub name: String,
}

/// Error body returned by Jira on 4xx/5xx.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    #[serde(default)]
    pub error_messages: Vec<String>,
    #[serde(default)]
    pub errors: BTreeMap<String, String>,
}

impl ErrorPayload {
    /// All messages joined, or `None` if the payload carried none.
    pub fn message(&self) -> Option<String> {
        let mut messages = self.error_messages.clone();
        for (field, msg) in &self.errors {
            messages.push(format!("{field}: {msg}"));
        }
        if messages.is_empty() {
            None
        } else {
            Some(messages.join("; "))
        }
    }
}
