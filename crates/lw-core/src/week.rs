//! Calendar-week helpers for building per-day capacity.

use chrono::{Datelike, Days, Duration, NaiveDate, Weekday};

use crate::task::DayCapacity;

/// The Monday of the week containing `date`. A Sunday belongs to the week
/// that started six days earlier.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date - Days::new(offset)
}

/// Saturdays and Sundays get no allocation.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The seven dates of the week starting at `week_start`, Monday to Sunday.
pub fn week_days(week_start: NaiveDate) -> [NaiveDate; 7] {
    std::array::from_fn(|i| week_start + Days::new(i as u64))
}

/// Sums logged durations per day of the week starting at `week_start`.
///
/// Returns exactly seven entries, Monday first and Sunday last. Entries
/// dated outside the week are ignored.
pub fn tally_week<I>(week_start: NaiveDate, entries: I) -> Vec<DayCapacity>
where
    I: IntoIterator<Item = (NaiveDate, Duration)>,
{
    let days = week_days(week_start);
    let mut consumed = [Duration::zero(); 7];

    for (date, spent) in entries {
        if let Some(index) = days.iter().position(|d| *d == date) {
            consumed[index] += spent;
        }
    }

    days.iter()
        .zip(consumed)
        .map(|(date, spent)| DayCapacity::new(*date, spent))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_start_is_monday() {
        // Wednesday
        assert_eq!(week_start(date(2025, 1, 15)), date(2025, 1, 13));
        // Monday itself
        assert_eq!(week_start(date(2025, 1, 13)), date(2025, 1, 13));
        // Sunday belongs to the preceding Monday
        assert_eq!(week_start(date(2025, 1, 19)), date(2025, 1, 13));
        // Across a month boundary
        assert_eq!(week_start(date(2025, 3, 1)), date(2025, 2, 24));
    }

    #[test]
    fn week_days_end_on_sunday() {
        let days = week_days(date(2025, 1, 13));
        assert_eq!(days[0].weekday(), Weekday::Mon);
        assert_eq!(days[6], date(2025, 1, 19));
        assert_eq!(days[6].weekday(), Weekday::Sun);
    }

    #[test]
    fn tally_sums_per_day_and_ignores_other_weeks() {
        let entries = vec![
            (date(2025, 1, 13), Duration::hours(2)),
            (date(2025, 1, 13), Duration::minutes(90)),
            (date(2025, 1, 17), Duration::hours(8)),
            (date(2025, 1, 12), Duration::hours(5)),
            (date(2025, 1, 20), Duration::hours(5)),
        ];

        let week = tally_week(date(2025, 1, 13), entries);

        assert_eq!(week.len(), 7);
        assert_eq!(week[0].consumed, Duration::minutes(210));
        assert_eq!(week[4].consumed, Duration::hours(8));
        assert_eq!(week[6].date, date(2025, 1, 19));
        let minutes: i64 = week.iter().map(|d| d.consumed.num_minutes()).sum();
        assert_eq!(minutes, 690);
    }

    #[test]
    fn weekends() {
        assert!(!is_weekend(date(2025, 1, 17)));
        assert!(is_weekend(date(2025, 1, 18)));
        assert!(is_weekend(date(2025, 1, 19)));
    }

    #[test]
    fn tally_of_nothing_is_an_empty_week() {
        let week = tally_week(date(2025, 1, 13), Vec::new());
        assert_eq!(week.len(), 7);
        assert!(week.iter().all(|d| d.consumed == Duration::zero()));
    }
}
