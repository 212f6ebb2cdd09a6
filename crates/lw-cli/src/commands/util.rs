//! Shared utilities for CLI commands.

use std::io::{BufRead, Write};

use anyhow::{Context, Result, bail};
use chrono::{Duration, Local, NaiveDate};
use lw_core::week;

const MINUTES_PER_HOUR: i64 = 60;
/// Estimates count an 8-hour working day.
const ESTIMATE_DAY_MINUTES: i64 = 8 * MINUTES_PER_HOUR;
const ESTIMATE_WEEK_MINUTES: i64 = 5 * ESTIMATE_DAY_MINUTES;

/// Asks a yes/no question and reads the answer.
///
/// `y` and `n` (any case) are the only accepted answers; anything else,
/// including end of input, is an error.
pub fn confirm<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    prompt: &str,
) -> Result<bool> {
    write!(writer, "{prompt} [y/n]: ")?;
    writer.flush()?;

    let mut answer = String::new();
    let read = reader
        .read_line(&mut answer)
        .context("failed to read answer")?;
    if read == 0 {
        bail!("no answer given");
    }

    match answer.trim().to_ascii_lowercase().as_str() {
        "y" => Ok(true),
        "n" => Ok(false),
        other => bail!("invalid answer {other:?}, expected y or n"),
    }
}

/// Monday of the week to work on: the week containing `week_of`, or the
/// current week.
pub fn resolve_week(week_of: Option<NaiveDate>) -> NaiveDate {
    week::week_start(week_of.unwrap_or_else(|| Local::now().date_naive()))
}

/// Renders a duration as hours and minutes, e.g. `7h 30m`.
pub fn format_duration(duration: Duration) -> String {
    let minutes = duration.num_minutes().max(0);
    let (hours, minutes) = (minutes / MINUTES_PER_HOUR, minutes % MINUTES_PER_HOUR);
    match (hours, minutes) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

/// Renders an estimate in working units, e.g. `1w 2d 3h 15m`, where a day
/// is 8 hours and a week is 5 days.
pub fn format_estimate(duration: Duration) -> String {
    let mut minutes = duration.num_minutes().max(0);
    let mut parts = Vec::new();
    for (unit, size) in [
        ("w", ESTIMATE_WEEK_MINUTES),
        ("d", ESTIMATE_DAY_MINUTES),
        ("h", MINUTES_PER_HOUR),
        ("m", 1),
    ] {
        let count = minutes / size;
        minutes %= size;
        if count > 0 {
            parts.push(format!("{count}{unit}"));
        }
    }

    if parts.is_empty() {
        "0m".to_string()
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_accepts_y_and_n() {
        let mut out = Vec::new();
        assert!(confirm(&mut "y\n".as_bytes(), &mut out, "Log?").unwrap());
        assert!(confirm(&mut " Y \n".as_bytes(), &mut out, "Log?").unwrap());
        assert!(!confirm(&mut "n\n".as_bytes(), &mut out, "Log?").unwrap());
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Log? [y/n]: Log? [y/n]: Log? [y/n]: "
        );
    }

    #[test]
    fn confirm_rejects_other_answers() {
        let mut out = Vec::new();
        let err = confirm(&mut "maybe\n".as_bytes(), &mut out, "Log?").unwrap_err();
        let message = err.to_string();
        assert_eq!(message, r#"invalid answer "maybe", expected y or n"#);
        assert!(confirm(&mut "yes\n".as_bytes(), &mut out, "Log?").is_err());
        assert!(confirm(&mut "".as_bytes(), &mut out, "Log?").is_err());
    }

    #[test]
    fn resolve_week_returns_monday() {
        let wednesday = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(
            resolve_week(Some(wednesday)),
            NaiveDate::from_ymd_opt(2025, 1, 13).unwrap()
        );
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(Duration::minutes(450)), "7h 30m");
        assert_eq!(format_duration(Duration::hours(2)), "2h");
        assert_eq!(format_duration(Duration::minutes(45)), "45m");
        assert_eq!(format_duration(Duration::zero()), "0m");
        assert_eq!(format_duration(Duration::minutes(-30)), "0m");
    }

    #[test]
    fn estimates_use_working_days_and_weeks() {
        let estimate = Duration::minutes(ESTIMATE_WEEK_MINUTES + 2 * ESTIMATE_DAY_MINUTES + 195);
        assert_eq!(format_estimate(estimate), "1w 2d 3h 15m");
        assert_eq!(format_estimate(Duration::hours(8)), "1d");
        assert_eq!(format_estimate(Duration::hours(10)), "1d 2h");
        assert_eq!(format_estimate(Duration::minutes(30)), "30m");
        assert_eq!(format_estimate(Duration::zero()), "0m");
    }
}
