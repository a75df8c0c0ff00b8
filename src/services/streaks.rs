use chrono::NaiveDate;
use serde::Serialize;

use crate::models::entry::Entry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreakResult {
    pub current: u32,
    pub best: u32,
}

/// Consecutive-day logging streaks.
///
/// `best` is the longest run of consecutive dates anywhere in the history.
/// `current` is the run ending at the most recent date, and only counts while
/// that date is today or yesterday.
pub fn calculate_streaks<E: Entry>(entries: &[E], today: NaiveDate) -> StreakResult {
    let mut dates: Vec<NaiveDate> = entries.iter().map(|e| e.date()).collect();
    dates.sort_unstable_by(|a, b| b.cmp(a));
    dates.dedup();

    let Some(&latest) = dates.first() else {
        return StreakResult::default();
    };

    let mut best = 1u32;
    let mut run = 1u32;
    let mut leading_run: Option<u32> = None;

    for pair in dates.windows(2) {
        if (pair[0] - pair[1]).num_days() == 1 {
            run += 1;
        } else {
            leading_run.get_or_insert(run);
            run = 1;
        }
        best = best.max(run);
    }
    let leading_run = leading_run.unwrap_or(run);

    let days_since = (today - latest).num_days();
    let current = if (0..=1).contains(&days_since) {
        leading_run
    } else {
        0
    };

    StreakResult { current, best }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mood::MoodEntry;
    use chrono::{DateTime, Duration, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn entries_at(offsets: &[i64]) -> Vec<MoodEntry> {
        let now: DateTime<Utc> = "2024-03-10T12:00:00Z".parse().unwrap();
        offsets
            .iter()
            .map(|&o| MoodEntry::new(today() - Duration::days(o), 3, now))
            .collect()
    }

    #[test]
    fn test_empty_has_no_streak() {
        let entries: Vec<MoodEntry> = Vec::new();
        assert_eq!(calculate_streaks(&entries, today()), StreakResult { current: 0, best: 0 });
    }

    #[test]
    fn test_live_streak_with_gap() {
        let result = calculate_streaks(&entries_at(&[0, 1, 2, 5]), today());
        assert_eq!(result, StreakResult { current: 3, best: 3 });
    }

    #[test]
    fn test_stale_streak_is_not_current() {
        let result = calculate_streaks(&entries_at(&[2, 3]), today());
        assert_eq!(result, StreakResult { current: 0, best: 2 });
    }

    #[test]
    fn test_single_entry() {
        assert_eq!(
            calculate_streaks(&entries_at(&[0]), today()),
            StreakResult { current: 1, best: 1 }
        );
        assert_eq!(
            calculate_streaks(&entries_at(&[1]), today()),
            StreakResult { current: 1, best: 1 }
        );
        assert_eq!(
            calculate_streaks(&entries_at(&[4]), today()),
            StreakResult { current: 0, best: 1 }
        );
    }

    #[test]
    fn test_order_and_duplicates_are_ignored() {
        let result = calculate_streaks(&entries_at(&[5, 1, 0, 1, 2, 0]), today());
        assert_eq!(result, StreakResult { current: 3, best: 3 });
    }

    #[test]
    fn test_best_run_found_in_history() {
        let result = calculate_streaks(&entries_at(&[1, 10, 11, 12, 13, 20]), today());
        assert_eq!(result, StreakResult { current: 1, best: 4 });
    }
}
