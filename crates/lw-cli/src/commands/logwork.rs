//! Logwork command: fill the week's free time with worklogs.

use std::collections::BTreeSet;
use std::io::{BufRead, Write};

use anyhow::{Context, Result, bail};
use chrono::{Duration, NaiveDate};
use clap::Args;
use lw_core::{AllocationConfig, PauseOutcome, Task, TaskId, Tracker, allocate};

use crate::Config;
use crate::commands::util::{confirm, format_duration, resolve_week};
use crate::commands::week::{DAY_FORMAT, free_time, logged_time};

#[derive(Debug, Args)]
pub struct LogworkArgs {
    /// Any date in the week to fill (defaults to the current week).
    #[arg(long, value_name = "DATE")]
    pub week_of: Option<NaiveDate>,

    /// Show the plan without logging anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Log without asking for confirmation.
    #[arg(short, long)]
    pub yes: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &LogworkArgs, config: &Config) -> Result<()> {
    let client = config.jira_client()?;
    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    let mut stdin = std::io::stdin().lock();
    runtime.block_on(execute(
        &client,
        &mut stdin,
        writer,
        args,
        resolve_week(args.week_of),
        &AllocationConfig::default(),
    ))
}

/// Plans the week and, once confirmed, commits every worklog.
///
/// Open tasks are paused after their first successful worklog. Worklog
/// failures are reported and do not stop the remaining ones, but make the
/// command fail at the end.
pub async fn execute<T, R, W>(
    tracker: &T,
    reader: &mut R,
    writer: &mut W,
    args: &LogworkArgs,
    week_start: NaiveDate,
    allocation: &AllocationConfig,
) -> Result<()>
where
    T: Tracker,
    R: BufRead,
    W: Write,
{
    let tasks: Vec<Task> = tracker
        .fetch_loggable_tasks()
        .await
        .context("failed to fetch assigned tasks")?
        .into_iter()
        .filter(|task| task.status.is_loggable())
        .collect();
    let days = tracker
        .fetch_weekly_capacity(week_start)
        .await
        .context("failed to fetch this week's worklogs")?;

    writeln!(
        writer,
        "Week of {week_start}: {} logged, {} free",
        format_duration(logged_time(&days)),
        format_duration(free_time(&days, allocation))
    )?;

    if tasks.is_empty() {
        writeln!(writer, "No open tasks assigned.")?;
        return Ok(());
    }
    writeln!(writer, "Tasks:")?;
    for task in &tasks {
        writeln!(
            writer,
            "  {}  {}  ({} left)",
            task.id,
            task.summary,
            format_duration(task.remaining())
        )?;
    }

    let mut to_pause: BTreeSet<TaskId> = tasks
        .iter()
        .filter(|task| task.status.is_open())
        .map(|task| task.id.clone())
        .collect();

    let plan = allocate(tasks, &days, allocation);
    if plan.is_empty() {
        writeln!(writer, "Nothing to log.")?;
        return Ok(());
    }

    writeln!(writer, "Plan:")?;
    for action in &plan.actions {
        writeln!(
            writer,
            "  {}  {}  {}  {}",
            action.day.format(DAY_FORMAT),
            action.task_id,
            format_duration(action.time_to_log),
            action.summary
        )?;
    }
    let total = plan
        .actions
        .iter()
        .fold(Duration::zero(), |acc, action| acc + action.time_to_log);
    writeln!(writer, "Total: {}", format_duration(total))?;

    if args.dry_run {
        writeln!(writer, "Dry run, nothing logged.")?;
        return Ok(());
    }
    let prompt = format!("Log {} worklogs?", plan.actions.len());
    if !args.yes && !confirm(reader, writer, &prompt)? {
        writeln!(writer, "Aborted.")?;
        return Ok(());
    }

    let results = tracker.commit_allocations(&plan.actions).await;
    let mut failed = 0;
    for (action, result) in plan.actions.iter().zip(results) {
        let day = action.day.format(DAY_FORMAT);
        let spent = format_duration(action.time_to_log);
        match result {
            Ok(()) => {
                writeln!(writer, "Logged {spent} to {} on {day}", action.task_id)?;
                if to_pause.remove(&action.task_id) {
                    pause(tracker, writer, &action.task_id).await?;
                }
            }
            Err(err) => {
                failed += 1;
                tracing::warn!(task = %action.task_id, %day, error = %err, "worklog failed");
                writeln!(
                    writer,
                    "Failed to log {spent} to {} on {day}: {err}",
                    action.task_id
                )?;
            }
        }
    }

    let attempted = plan.actions.len();
    let logged = attempted - failed;
    writeln!(writer, "Logged {logged} of {attempted} worklogs.")?;
    if failed > 0 {
        bail!("{failed} of {attempted} worklogs failed");
    }
    Ok(())
}

async fn pause<T: Tracker, W: Write>(tracker: &T, writer: &mut W, task_id: &TaskId) -> Result<()> {
    match tracker.pause_task(task_id).await {
        Ok(PauseOutcome::Paused) => writeln!(writer, "Paused {task_id}")?,
        Ok(PauseOutcome::NoPauseTransition) => {
            writeln!(writer, "{task_id} has no PAUSE transition, left open")?;
        }
        Ok(PauseOutcome::NotOpen(status)) => {
            tracing::debug!(task = %task_id, %status, "no longer open, not pausing");
        }
        Err(err) => {
            tracing::warn!(task = %task_id, error = %err, "pause failed");
            writeln!(writer, "Failed to pause {task_id}: {err}")?;
        }
    }
    Ok(())
}
