//! Week command: logged and free time per day.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use clap::Args;
use lw_core::{AllocationConfig, DayCapacity, Tracker, week};

use crate::Config;
use crate::commands::util::{format_duration, resolve_week};

/// Date format used when listing days.
pub const DAY_FORMAT: &str = "%a %Y-%m-%d";

#[derive(Debug, Args)]
pub struct WeekArgs {
    /// Any date in the week to show (defaults to the current week).
    #[arg(long, value_name = "DATE")]
    pub week_of: Option<NaiveDate>,
}

pub fn run<W: Write>(writer: &mut W, args: &WeekArgs, config: &Config) -> Result<()> {
    let client = config.jira_client()?;
    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    runtime.block_on(execute(
        &client,
        writer,
        resolve_week(args.week_of),
        &AllocationConfig::default(),
    ))
}

pub async fn execute<T: Tracker, W: Write>(
    tracker: &T,
    writer: &mut W,
    week_start: NaiveDate,
    allocation: &AllocationConfig,
) -> Result<()> {
    let days = tracker
        .fetch_weekly_capacity(week_start)
        .await
        .context("failed to fetch this week's worklogs")?;

    writeln!(writer, "Week of {week_start}")?;
    for day in &days {
        let free = free_on(day, allocation).map_or_else(
            || "weekend".to_string(),
            |free| format!("free {}", format_duration(free)),
        );
        writeln!(
            writer,
            "  {}  logged {}  {free}",
            day.date.format(DAY_FORMAT),
            format_duration(day.consumed)
        )?;
    }
    writeln!(
        writer,
        "Total: {} logged, {} free",
        format_duration(logged_time(&days)),
        format_duration(free_time(&days, allocation))
    )?;
    Ok(())
}

/// Unused shift time on `day`, or `None` on weekends.
pub fn free_on(day: &DayCapacity, allocation: &AllocationConfig) -> Option<Duration> {
    if week::is_weekend(day.date) {
        None
    } else {
        Some((allocation.shift_capacity - day.consumed).max(Duration::zero()))
    }
}

pub fn free_time(days: &[DayCapacity], allocation: &AllocationConfig) -> Duration {
    days.iter()
        .filter_map(|day| free_on(day, allocation))
        .fold(Duration::zero(), |acc, free| acc + free)
}

pub fn logged_time(days: &[DayCapacity]) -> Duration {
    days.iter()
        .fold(Duration::zero(), |acc, day| acc + day.consumed)
}
