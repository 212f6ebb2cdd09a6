//! Jira integration for logwork.
//!
//! Implements [`lw_core::Tracker`] over the Jira REST API v2:
//! - Fetching assigned tasks and the current week's worklogs
//! - Searching the whole instance for similar, estimated issues
//! - Posting worklogs, updating estimates and pausing open issues

mod jql;
mod wire;

use std::fmt;
use std::time::Duration as StdDuration;

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, TimeZone};
use lw_core::{
    AllocationAction, DayCapacity, EstimateCommit, PauseOutcome, Task, TaskId, Tracker, week,
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;

use crate::wire::{
    ErrorPayload, Issue, JIRA_TIME_FORMAT, SearchResponse, TransitionsResponse, WorklogResponse,
};

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(30);
const API_PREFIX: &str = "rest/api/2";

/// Page size for queries over the user's own issues. Every page is read.
const USER_PAGE_SIZE: u32 = 1000;
/// Instance-wide keyword searches only read the first, most recent page.
const CANDIDATE_PAGE_SIZE: u32 = 500;

/// Fields needed to build a [`Task`].
const TASK_FIELDS: &str =
    "summary,status,project,parent,labels,created,timeoriginalestimate,timespent";
/// Issues searched for worklogs only need their key.
const WORKLOG_ISSUE_FIELDS: &str = "summary";
const STATUS_FIELDS: &str = "status,timeoriginalestimate";

/// Name of the transition applied to open issues after logging work.
const PAUSE_TRANSITION: &str = "PAUSE";

/// Jira client errors.
#[derive(Debug, Error)]
pub enum JiraError {
    /// Endpoint or credentials were missing.
    #[error("invalid Jira configuration: {reason}")]
    InvalidConfig { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Jira answered with a non-success status.
    #[error("Jira returned {status}: {message}")]
    Api { status: u16, message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// A Jira timestamp could not be parsed.
    #[error("invalid timestamp {value:?}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A local start time does not exist (e.g. inside a DST gap).
    #[error("{0} does not exist in the local time zone")]
    NonexistentLocalTime(NaiveDateTime),
}

/// Jira REST client authenticated with a user name and API token.
pub struct JiraClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    api_token: String,
}

impl fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("api_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl JiraClient {
    /// Creates a client for the Jira instance at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error if any argument is empty or whitespace-only, or if
    /// the HTTP client fails to build.
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Result<Self, JiraError> {
        let endpoint = endpoint.into();
        let username = username.into();
        let api_token = api_token.into();

        if endpoint.trim().is_empty() {
            return Err(JiraError::InvalidConfig {
                reason: "endpoint cannot be empty",
            });
        }
        if username.trim().is_empty() {
            return Err(JiraError::InvalidConfig {
                reason: "username cannot be empty",
            });
        }
        if api_token.trim().is_empty() {
            return Err(JiraError::InvalidConfig {
                reason: "API token cannot be empty",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(JiraError::ClientBuild)?;

        Ok(Self {
            http,
            base_url: endpoint.trim().trim_end_matches('/').to_string(),
            username,
            api_token,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{API_PREFIX}/{path}", self.base_url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, JiraError> {
        tracing::debug!(path, "GET");
        let response = self
            .http
            .get(self.url(path))
            .basic_auth(&self.username, Some(&self.api_token))
            .query(query)
            .send()
            .await?;
        let body = read_body(response).await?;
        serde_json::from_str(&body).map_err(|err| JiraError::InvalidResponse(err.to_string()))
    }

    async fn send(&self, method: Method, path: &str, body: &Value) -> Result<(), JiraError> {
        tracing::debug!(%method, path, "sending");
        let response = self
            .http
            .request(method, self.url(path))
            .basic_auth(&self.username, Some(&self.api_token))
            .json(body)
            .send()
            .await?;
        read_body(response).await?;
        Ok(())
    }

    async fn search_page(
        &self,
        jql: &str,
        fields: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<SearchResponse, JiraError> {
        let mut query = vec![
            ("jql", jql.to_string()),
            ("fields", fields.to_string()),
            ("maxResults", page_size.to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("nextPageToken", token.to_string()));
        }
        self.get("search/jql", &query).await
    }

    /// Runs `jql` and collects the issues of every page.
    async fn search(
        &self,
        jql: &str,
        fields: &str,
        page_size: u32,
    ) -> Result<Vec<Issue>, JiraError> {
        let mut page = self.search_page(jql, fields, page_size, None).await?;
        let mut issues = std::mem::take(&mut page.issues);
        while let Some(token) = page.next_page() {
            tracing::debug!(fetched = issues.len(), "fetching next search page");
            let token = token.to_string();
            page = self
                .search_page(jql, fields, page_size, Some(token.as_str()))
                .await?;
            issues.append(&mut page.issues);
            if page.next_page() == Some(token.as_str()) {
                tracing::warn!(%token, "Jira repeated a page token, stopping");
                break;
            }
        }
        Ok(issues)
    }

    async fn search_tasks(&self, jql: &str, page_size: u32) -> Result<Vec<Task>, JiraError> {
        into_tasks(self.search(jql, TASK_FIELDS, page_size).await?)
    }

    async fn issue(&self, key: &TaskId) -> Result<Issue, JiraError> {
        let query = [("fields", STATUS_FIELDS.to_string())];
        self.get(&format!("issue/{key}"), &query).await
    }

    /// `(local date, duration)` of every worklog on `key`.
    async fn worklog_entries(&self, key: &str) -> Result<Vec<(NaiveDate, Duration)>, JiraError> {
        let response: WorklogResponse = self.get(&format!("issue/{key}/worklog"), &[]).await?;
        let mut entries = Vec::with_capacity(response.worklogs.len());
        for worklog in response.worklogs {
            match wire::parse_time(&worklog.started) {
                Ok(started) => entries.push((
                    started.with_timezone(&Local).date_naive(),
                    Duration::seconds(worklog.time_spent_seconds),
                )),
                Err(err) => tracing::warn!(issue = key, error = %err, "skipping worklog"),
            }
        }
        Ok(entries)
    }
}

impl Tracker for JiraClient {
    type Error = JiraError;

    async fn fetch_loggable_tasks(&self) -> Result<Vec<Task>, JiraError> {
        self.search_tasks(&jql::loggable_tasks(&self.username), USER_PAGE_SIZE)
            .await
    }

    async fn fetch_weekly_capacity(
        &self,
        week_start: NaiveDate,
    ) -> Result<Vec<DayCapacity>, JiraError> {
        let issues = self
            .search(
                &jql::worklogs_since(&self.username, week_start),
                WORKLOG_ISSUE_FIELDS,
                USER_PAGE_SIZE,
            )
            .await?;

        let mut entries = Vec::new();
        for issue in &issues {
            match self.worklog_entries(&issue.key).await {
                Ok(found) => entries.extend(found),
                Err(err) => {
                    tracing::warn!(issue = %issue.key, error = %err, "failed to fetch worklogs");
                }
            }
        }

        Ok(week::tally_week(week_start, entries))
    }

    async fn fetch_estimate_targets(&self) -> Result<Vec<Task>, JiraError> {
        self.search_tasks(&jql::estimate_targets(&self.username), USER_PAGE_SIZE)
            .await
    }

    async fn search_by_keywords(&self, keywords: &[String]) -> Result<Vec<Task>, JiraError> {
        if keywords.is_empty() {
            return Ok(Vec::new());
        }
        let query = jql::keyword_search(keywords);
        let page = self
            .search_page(&query, TASK_FIELDS, CANDIDATE_PAGE_SIZE, None)
            .await?;
        if page.next_page().is_some() {
            tracing::debug!(
                found = page.issues.len(),
                "more candidates than one page, keeping the most recent"
            );
        }
        into_tasks(page.issues)
    }

    async fn commit_allocation(&self, action: &AllocationAction) -> Result<(), JiraError> {
        let started = Local
            .from_local_datetime(&action.started)
            .earliest()
            .ok_or(JiraError::NonexistentLocalTime(action.started))?;
        let body = json!({
            "started": started.format(JIRA_TIME_FORMAT).to_string(),
            "timeSpentSeconds": action.time_to_log.num_seconds(),
        });
        self.send(
            Method::POST,
            &format!("issue/{}/worklog", action.task_id),
            &body,
        )
        .await?;
        tracing::info!(
            issue = %action.task_id,
            seconds = action.time_to_log.num_seconds(),
            "worklog added"
        );
        Ok(())
    }

    async fn commit_estimate(
        &self,
        task_id: &TaskId,
        estimate: Duration,
    ) -> Result<EstimateCommit, JiraError> {
        let current = self.issue(task_id).await?.fields.original_estimate();
        if current > Duration::zero() {
            return Ok(EstimateCommit::AlreadyEstimated(current));
        }

        let body = json!({
            "fields": {
                "timetracking": {
                    "originalEstimate": format_jira_duration(estimate),
                },
            },
        });
        self.send(Method::PUT, &format!("issue/{task_id}"), &body)
            .await?;
        tracing::info!(
            issue = %task_id,
            estimate = %format_jira_duration(estimate),
            "estimate updated"
        );
        Ok(EstimateCommit::Updated)
    }

    async fn pause_task(&self, task_id: &TaskId) -> Result<PauseOutcome, JiraError> {
        let status = self.issue(task_id).await?.fields.status();
        if !status.is_open() {
            return Ok(PauseOutcome::NotOpen(status));
        }

        let transitions: TransitionsResponse = self
            .get(&format!("issue/{task_id}/transitions"), &[])
            .await?;
        let Some(pause) = transitions
            .transitions
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(PAUSE_TRANSITION))
        else {
            return Ok(PauseOutcome::NoPauseTransition);
        };

        let body = json!({ "transition": { "id": pause.id } });
        self.send(Method::POST, &format!("issue/{task_id}/transitions"), &body)
            .await?;
        tracing::info!(issue = %task_id, "issue paused");
        Ok(PauseOutcome::Paused)
    }
}

/// Formats a duration the way Jira's time-tracking fields accept it:
/// `"2h"` or `"2h 30m"`.
///
/// Partial minutes round up, so a positive duration never becomes `"0h"`.
pub fn format_jira_duration(duration: Duration) -> String {
    let total_minutes = (duration.num_seconds() + 59).div_euclid(60);
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if minutes == 0 {
        format!("{hours}h")
    } else {
        format!("{hours}h {minutes}m")
    }
}

fn into_tasks(issues: Vec<Issue>) -> Result<Vec<Task>, JiraError> {
    issues.into_iter().map(Issue::into_task).collect()
}

async fn read_body(response: reqwest::Response) -> Result<String, JiraError> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        return Ok(body);
    }

    let message = serde_json::from_str::<ErrorPayload>(&body)
        .ok()
        .and_then(|payload| payload.message())
        .unwrap_or(body);
    Err(JiraError::Api {
        status: status.as_u16(),
        message,
    })
}
