//! The ticket tracker as seen by the core.
//!
//! Implemented by tracker integrations (e.g. `lw-jira`) and by in-memory
//! fakes in tests. The core itself never calls these methods; the CLI feeds
//! their results into [`crate::allocate`] and [`crate::EstimateEngine`].

use chrono::{Duration, NaiveDate};

use crate::allocation::AllocationAction;
use crate::task::{DayCapacity, Task, TaskId, TaskStatus};

/// Result of writing an inferred estimate back to the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EstimateCommit {
    Updated,
    /// The tracker already holds a positive estimate, which was kept.
    AlreadyEstimated(Duration),
}

/// Result of moving a task out of the open state after logging to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PauseOutcome {
    Paused,
    /// The task was not open, so it was left alone.
    NotOpen(TaskStatus),
    /// The task was open but offers no pause transition.
    NoPauseTransition,
}

/// Operations the CLI needs from a ticket tracker.
#[expect(
    async_fn_in_trait,
    reason = "trackers are driven from a single-threaded runtime, Send futures are not needed"
)]
pub trait Tracker {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Tasks eligible for time allocation, in the tracker's priority order.
    async fn fetch_loggable_tasks(&self) -> Result<Vec<Task>, Self::Error>;

    /// Time already logged on each day of the week starting at `week_start`.
    /// Seven entries, Monday first, Sunday last.
    async fn fetch_weekly_capacity(
        &self,
        week_start: NaiveDate,
    ) -> Result<Vec<DayCapacity>, Self::Error>;

    /// Tasks assigned to the user that may need an estimate.
    async fn fetch_estimate_targets(&self) -> Result<Vec<Task>, Self::Error>;

    /// Candidate tasks whose titles mention any of `keywords`.
    async fn search_by_keywords(&self, keywords: &[String]) -> Result<Vec<Task>, Self::Error>;

    async fn commit_allocation(&self, action: &AllocationAction) -> Result<(), Self::Error>;

    /// Commits every action in order, one result per action. Failures are
    /// not retried and do not stop later actions.
    async fn commit_allocations(
        &self,
        actions: &[AllocationAction],
    ) -> Vec<Result<(), Self::Error>> {
        let mut results = Vec::with_capacity(actions.len());
        for action in actions {
            results.push(self.commit_allocation(action).await);
        }
        results
    }

    async fn commit_estimate(
        &self,
        task_id: &TaskId,
        estimate: Duration,
    ) -> Result<EstimateCommit, Self::Error>;

    async fn pause_task(&self, task_id: &TaskId) -> Result<PauseOutcome, Self::Error>;
}
