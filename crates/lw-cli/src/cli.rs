//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::estimate::EstimateArgs;
use crate::commands::logwork::LogworkArgs;
use crate::commands::week::WeekArgs;

/// Weekly worklog and estimate assistant for Jira.
///
/// Spreads a week's free working time over your assigned tasks and infers
/// missing estimates from similar, already estimated issues.
#[derive(Debug, Parser)]
#[command(name = "lw", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fill the week's free time with worklogs on assigned tasks.
    Logwork(LogworkArgs),

    /// Copy estimates from similar issues onto unestimated open tasks.
    #[command(alias = "estimate")]
    Est(EstimateArgs),

    /// Show time logged and still free on each day of the week.
    Week(WeekArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;

    #[test]
    fn parses_logwork_flags() {
        let argv = ["lw", "logwork", "--week-of", "2025-01-15", "--yes"];
        let cli = Cli::try_parse_from(argv).unwrap();
        let Some(Commands::Logwork(args)) = cli.command else {
            panic!("expected logwork");
        };
        assert_eq!(args.week_of, NaiveDate::from_ymd_opt(2025, 1, 15));
        assert!(args.yes);
        assert!(!args.dry_run);
    }

    #[test]
    fn estimate_alias_and_global_flags() {
        let cli = Cli::try_parse_from(["lw", "estimate", "--dry-run", "-v"]).unwrap();
        assert!(cli.verbose);
        let Some(Commands::Est(args)) = cli.command else {
            panic!("expected est");
        };
        assert!(args.dry_run);
    }

    #[test]
    fn rejects_malformed_week_date() {
        let result = Cli::try_parse_from(["lw", "week", "--week-of", "next monday"]);
        assert!(result.is_err());
    }
}
