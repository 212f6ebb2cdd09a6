//! Time allocation algorithm.
//!
//! Spreads the remaining capacity of each working day across tasks that
//! still have estimated effort left.
//!
//! # Algorithm Summary
//!
//! 1. Skip Saturdays, Sundays and days that are already full
//! 2. Walk the tasks in their given order, giving each `min(remaining estimate,
//!    remaining shift)` until the shift is used up
//! 3. Carry the updated logged time forward to the next day
//!
//! This is first-fit packing with a stable task order: the same input always
//! yields the same actions, and no task is ever allocated beyond its estimate.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::task::{DayCapacity, Task, TaskId};
use crate::week::is_weekend;

/// Length of a working day in minutes (7.5 hours).
pub const SHIFT_CAPACITY_MINUTES: i64 = 450;

/// Configuration for time allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationConfig {
    /// Work capacity of a single day. Default: 7.5 hours.
    pub shift_capacity: Duration,

    /// Clock time at which allocated work is recorded as started. Default: 07:30.
    pub shift_start: NaiveTime,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            shift_capacity: Duration::minutes(SHIFT_CAPACITY_MINUTES),
            shift_start: NaiveTime::from_hms_opt(7, 30, 0).unwrap_or_default(),
        }
    }
}

/// An instruction to record effort against a task on a given day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationAction {
    pub task_id: TaskId,

    /// Task title at the time of allocation, for display.
    pub summary: String,

    pub time_to_log: Duration,

    pub day: NaiveDate,

    /// When the work is recorded as started (the day at shift start).
    pub started: NaiveDateTime,
}

/// Result of [`allocate`]: the actions in emission order and the task list
/// with `logged` advanced by everything allocated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationPlan {
    pub actions: Vec<AllocationAction>,
    pub tasks: Vec<Task>,
}

impl AllocationPlan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Total time allocated on `day`.
    pub fn logged_on(&self, day: NaiveDate) -> Duration {
        self.actions
            .iter()
            .filter(|a| a.day == day)
            .fold(Duration::zero(), |acc, a| acc + a.time_to_log)
    }

    /// Total time allocated to `task_id` across all days.
    pub fn logged_to(&self, task_id: &TaskId) -> Duration {
        self.actions
            .iter()
            .filter(|a| &a.task_id == task_id)
            .fold(Duration::zero(), |acc, a| acc + a.time_to_log)
    }
}

/// Allocate the remaining capacity of `days` to `tasks`.
///
/// Takes ownership of the task list for the duration of the run and hands it
/// back in the plan with each task's `logged` advanced. Task order is never
/// changed; earlier tasks are always served first.
pub fn allocate(
    mut tasks: Vec<Task>,
    days: &[DayCapacity],
    config: &AllocationConfig,
) -> AllocationPlan {
    let mut actions = Vec::new();

    for day in days {
        if is_weekend(day.date) {
            tracing::debug!(date = %day.date, "skipping weekend");
            continue;
        }

        let mut remaining_shift = config.shift_capacity - day.consumed;
        if remaining_shift <= Duration::zero() {
            tracing::debug!(date = %day.date, "day already full");
            continue;
        }

        let started = day.date.and_time(config.shift_start);

        // Keep passing over the tasks until the shift is full or a pass
        // allocates nothing.
        while remaining_shift > Duration::zero() && !tasks.is_empty() {
            let mut assigned = false;

            for task in &mut tasks {
                let remaining_estimate = task.remaining();
                if remaining_estimate <= Duration::zero() {
                    continue;
                }

                let time_to_log = remaining_estimate.min(remaining_shift);
                if time_to_log <= Duration::zero() {
                    continue;
                }

                actions.push(AllocationAction {
                    task_id: task.id.clone(),
                    summary: task.summary.clone(),
                    time_to_log,
                    day: day.date,
                    started,
                });

                task.logged += time_to_log;
                remaining_shift -= time_to_log;
                assigned = true;

                if remaining_shift <= Duration::zero() {
                    break;
                }
            }

            if !assigned {
                break;
            }
        }
    }

    AllocationPlan { actions, tasks }
}
