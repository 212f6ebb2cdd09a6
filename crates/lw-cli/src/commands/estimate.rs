//! Estimate command: copy estimates from similar issues.

use std::io::{BufRead, Write};

use anyhow::{Context, Result, bail};
use chrono::Duration;
use clap::Args;
use lw_core::{EstimateCommit, EstimateEngine, Inference, TaskId, Tracker};

use crate::Config;
use crate::commands::util::{confirm, format_estimate};

#[derive(Debug, Args)]
pub struct EstimateArgs {
    /// Show inferred estimates without updating anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Update without asking for confirmation.
    #[arg(short, long)]
    pub yes: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &EstimateArgs, config: &Config) -> Result<()> {
    let client = config.jira_client()?;
    let engine = EstimateEngine::new(config.estimate_config());
    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    let mut stdin = std::io::stdin().lock();
    runtime.block_on(execute(&client, &engine, &mut stdin, writer, args))
}

/// Infers an estimate for every open, unestimated task and, once confirmed,
/// writes the accepted ones back.
pub async fn execute<T, R, W>(
    tracker: &T,
    engine: &EstimateEngine,
    reader: &mut R,
    writer: &mut W,
    args: &EstimateArgs,
) -> Result<()>
where
    T: Tracker,
    R: BufRead,
    W: Write,
{
    let targets = tracker
        .fetch_estimate_targets()
        .await
        .context("failed to fetch assigned tasks")?;

    let mut accepted: Vec<(TaskId, Duration)> = Vec::new();
    for mut task in targets.into_iter().filter(EstimateEngine::needs_estimate) {
        writeln!(writer, "{}  {}", task.id, task.summary)?;

        let keywords = engine.keywords(&task.summary);
        if keywords.is_empty() {
            writeln!(writer, "  skipped: no keywords")?;
            continue;
        }

        let candidates = match tracker.search_by_keywords(&keywords).await {
            Ok(candidates) => candidates,
            Err(err) => {
                tracing::warn!(task = %task.id, error = %err, "candidate search failed");
                writeln!(writer, "  skipped: search failed: {err}")?;
                continue;
            }
        };

        match engine.infer(&mut task, &candidates) {
            Inference::Matched(found) => {
                writeln!(
                    writer,
                    "  estimate {} from {} {:?} (score {:.2})",
                    format_estimate(found.estimate),
                    found.candidate_id,
                    found.candidate_summary,
                    found.score
                )?;
                accepted.push((task.id, found.estimate));
            }
            Inference::BelowThreshold(best) => {
                writeln!(
                    writer,
                    "  no match: best {} {:?} scored {:.2}",
                    best.candidate_id, best.candidate_summary, best.score
                )?;
            }
            Inference::NoCandidates => writeln!(writer, "  no estimated candidates")?,
        }
    }

    if accepted.is_empty() {
        writeln!(writer, "No estimates to update.")?;
        return Ok(());
    }
    if args.dry_run {
        writeln!(writer, "Dry run, nothing updated.")?;
        return Ok(());
    }
    let prompt = format!("Update {} estimates?", accepted.len());
    if !args.yes && !confirm(reader, writer, &prompt)? {
        writeln!(writer, "Aborted.")?;
        return Ok(());
    }

    let mut failed = 0;
    for (task_id, estimate) in &accepted {
        match tracker.commit_estimate(task_id, *estimate).await {
            Ok(EstimateCommit::Updated) => {
                let estimate = format_estimate(*estimate);
                writeln!(writer, "Updated {task_id} to {estimate}")?;
            }
            Ok(EstimateCommit::AlreadyEstimated(existing)) => {
                writeln!(
                    writer,
                    "Kept {task_id} at {} (already estimated)",
                    format_estimate(existing)
                )?;
            }
            Err(err) => {
                failed += 1;
                tracing::warn!(task = %task_id, error = %err, "estimate update failed");
                writeln!(writer, "Failed to update {task_id}: {err}")?;
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} estimate updates failed", accepted.len());
    }
    Ok(())
}
