//! In-memory tracker for command tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::io;

use chrono::{Duration, NaiveDate};
use lw_core::{
    AllocationAction, DayCapacity, EstimateCommit, PauseOutcome, Task, TaskId, Tracker, week,
};

#[derive(Debug, Default)]
pub struct FakeTracker {
    pub tasks: Vec<Task>,
    /// Time already logged, by date.
    pub logged: Vec<(NaiveDate, Duration)>,
    /// Issues returned by keyword searches that match them.
    pub catalogue: Vec<Task>,
    /// Tasks whose worklogs are refused.
    pub failing: BTreeSet<String>,
    /// Tasks without a pause transition.
    pub unpausable: BTreeSet<String>,
    /// Estimates set behind our back since the tasks were fetched.
    pub concurrent_estimates: BTreeMap<String, Duration>,

    pub worklogs: RefCell<Vec<AllocationAction>>,
    pub estimates: RefCell<Vec<(TaskId, Duration)>>,
    pub paused: RefCell<Vec<TaskId>>,
    pub searches: RefCell<Vec<Vec<String>>>,
}

impl FakeTracker {
    fn task(&self, id: &TaskId) -> io::Result<&Task> {
        self.tasks
            .iter()
            .find(|task| &task.id == id)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no issue {id}")))
    }
}

impl Tracker for FakeTracker {
    type Error = io::Error;

    async fn fetch_loggable_tasks(&self) -> io::Result<Vec<Task>> {
        Ok(self
            .tasks
            .iter()
            .filter(|task| task.status.is_loggable())
            .cloned()
            .collect())
    }

    async fn fetch_weekly_capacity(&self, week_start: NaiveDate) -> io::Result<Vec<DayCapacity>> {
        Ok(week::tally_week(week_start, self.logged.iter().copied()))
    }

    async fn fetch_estimate_targets(&self) -> io::Result<Vec<Task>> {
        Ok(self.tasks.clone())
    }

    async fn search_by_keywords(&self, keywords: &[String]) -> io::Result<Vec<Task>> {
        self.searches.borrow_mut().push(keywords.to_vec());
        Ok(self
            .catalogue
            .iter()
            .filter(|task| {
                let summary = task.summary.to_lowercase();
                keywords.iter().any(|kw| summary.contains(kw.as_str()))
            })
            .cloned()
            .collect())
    }

    async fn commit_allocation(&self, action: &AllocationAction) -> io::Result<()> {
        if self.failing.contains(action.task_id.as_str()) {
            return Err(io::Error::other("worklog rejected"));
        }
        self.worklogs.borrow_mut().push(action.clone());
        Ok(())
    }

    async fn commit_estimate(
        &self,
        task_id: &TaskId,
        estimate: Duration,
    ) -> io::Result<EstimateCommit> {
        if let Some(existing) = self.concurrent_estimates.get(task_id.as_str()) {
            return Ok(EstimateCommit::AlreadyEstimated(*existing));
        }
        self.estimates
            .borrow_mut()
            .push((task_id.clone(), estimate));
        Ok(EstimateCommit::Updated)
    }

    async fn pause_task(&self, task_id: &TaskId) -> io::Result<PauseOutcome> {
        let task = self.task(task_id)?;
        if !task.status.is_open() {
            return Ok(PauseOutcome::NotOpen(task.status.clone()));
        }
        if self.unpausable.contains(task_id.as_str()) {
            return Ok(PauseOutcome::NoPauseTransition);
        }
        self.paused.borrow_mut().push(task_id.clone());
        Ok(PauseOutcome::Paused)
    }
}
