use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::models::entry::{Entry, Scored};
use crate::models::mood::{mood_label, MoodEntry, MAX_MOOD, MIN_MOOD};

// Empirical cut-offs on the population standard deviation.
const LOW_VARIABILITY_BELOW: f64 = 0.8;
const MEDIUM_VARIABILITY_BELOW: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variability {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayValue {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelCount {
    pub level: i32,
    pub label: &'static str,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayAverage {
    pub weekday: &'static str,
    pub average_value: Option<f64>,
    pub count: u32,
}

/// Mean reading; `0.0` means "no data" since no reading is ever zero.
pub fn average<E: Scored>(entries: &[E]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    entries.iter().map(Scored::score).sum::<f64>() / entries.len() as f64
}

/// Mean over entries dated on or after `today - n` days.
pub fn average_last_n_days<E: Entry + Scored>(entries: &[E], n: i64, today: NaiveDate) -> f64 {
    let since = today - Duration::days(n);
    let recent: Vec<E> = entries
        .iter()
        .filter(|e| e.date() >= since)
        .cloned()
        .collect();
    average(&recent)
}

pub fn std_dev<E: Scored>(entries: &[E]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    let mean = average(entries);
    let variance = entries
        .iter()
        .map(|e| (e.score() - mean).powi(2))
        .sum::<f64>()
        / entries.len() as f64;
    variance.sqrt()
}

pub fn variability<E: Scored>(entries: &[E]) -> Variability {
    let sd = std_dev(entries);
    if sd < LOW_VARIABILITY_BELOW {
        Variability::Low
    } else if sd < MEDIUM_VARIABILITY_BELOW {
        Variability::Medium
    } else {
        Variability::High
    }
}

/// Highest reading; on ties the earliest in input order wins.
pub fn best_day<E: Entry + Scored>(entries: &[E]) -> Option<DayValue> {
    entries
        .iter()
        .fold(None::<&E>, |best, e| match best {
            Some(b) if b.score() >= e.score() => Some(b),
            _ => Some(e),
        })
        .map(day_value)
}

/// Lowest reading; on ties the earliest in input order wins.
pub fn worst_day<E: Entry + Scored>(entries: &[E]) -> Option<DayValue> {
    entries
        .iter()
        .fold(None::<&E>, |worst, e| match worst {
            Some(w) if w.score() <= e.score() => Some(w),
            _ => Some(e),
        })
        .map(day_value)
}

fn day_value<E: Entry + Scored>(entry: &E) -> DayValue {
    DayValue {
        date: entry.date(),
        value: entry.score(),
    }
}

/// Count of entries at every mood level, lowest level first.
pub fn mood_distribution(entries: &[MoodEntry]) -> Vec<LevelCount> {
    (MIN_MOOD..=MAX_MOOD)
        .map(|level| LevelCount {
            level,
            label: mood_label(level),
            count: entries.iter().filter(|e| e.mood == level).count() as u32,
        })
        .collect()
}

/// Mean reading per weekday, Monday first.
pub fn weekday_averages<E: Entry + Scored>(entries: &[E]) -> Vec<WeekdayAverage> {
    const NAMES: [&str; 7] = [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ];
    let mut sums = [0.0f64; 7];
    let mut counts = [0u32; 7];
    for e in entries {
        let dow = e.date().weekday().num_days_from_monday() as usize;
        sums[dow] += e.score();
        counts[dow] += 1;
    }

    NAMES
        .iter()
        .enumerate()
        .map(|(i, &weekday)| WeekdayAverage {
            weekday,
            average_value: (counts[i] > 0).then(|| sums[i] / counts[i] as f64),
            count: counts[i],
        })
        .collect()
}
