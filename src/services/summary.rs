use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::stats::{average, best_day, variability, worst_day, DayValue, Variability};
use crate::models::mood::MoodEntry;

const POSITIVE_MOOD: i32 = 4;
const EMPTY_PERIOD_INSIGHT: &str = "Start tracking your mood to see insights here.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    #[default]
    #[serde(rename = "7days")]
    Last7Days,
    #[serde(rename = "30days")]
    Last30Days,
    #[serde(rename = "thisMonth")]
    ThisMonth,
    #[serde(rename = "allTime")]
    AllTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStats {
    pub period: Period,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days_tracked: u32,
    pub total_days_in_period: u32,
    pub average_value: f64,
    pub best_day: Option<DayValue>,
    pub worst_day: Option<DayValue>,
    pub positive_ratio: f64,
    pub variability: Variability,
    pub insight: String,
}

/// Inclusive `[start, end]` window for a period ending today.
pub fn resolve_window(period: Period, entries: &[MoodEntry], today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = match period {
        Period::Last7Days => today - Duration::days(6),
        Period::Last30Days => today - Duration::days(29),
        Period::ThisMonth => today.with_day(1).unwrap_or(today),
        Period::AllTime => entries
            .iter()
            .map(|e| e.date)
            .min()
            .map_or(today, |earliest| earliest.min(today)),
    };
    (start, today)
}

pub fn summarize_period(entries: &[MoodEntry], period: Period, today: NaiveDate) -> PeriodStats {
    let (start_date, end_date) = resolve_window(period, entries, today);
    let total_days_in_period = ((end_date - start_date).num_days() + 1) as u32;

    let in_window: Vec<MoodEntry> = entries
        .iter()
        .filter(|e| e.date >= start_date && e.date <= end_date)
        .cloned()
        .collect();

    if in_window.is_empty() {
        return PeriodStats {
            period,
            start_date,
            end_date,
            days_tracked: 0,
            total_days_in_period,
            average_value: 0.0,
            best_day: None,
            worst_day: None,
            positive_ratio: 0.0,
            variability: Variability::Low,
            insight: EMPTY_PERIOD_INSIGHT.to_string(),
        };
    }

    let days_tracked = in_window.iter().map(|e| e.date).collect::<BTreeSet<_>>().len() as u32;
    let average_value = average(&in_window);
    let positive = in_window.iter().filter(|e| e.mood >= POSITIVE_MOOD).count();
    let positive_ratio = positive as f64 / in_window.len() as f64;

    PeriodStats {
        period,
        start_date,
        end_date,
        days_tracked,
        total_days_in_period,
        average_value,
        best_day: best_day(&in_window),
        worst_day: worst_day(&in_window),
        positive_ratio,
        variability: variability(&in_window),
        insight: compose_insight(days_tracked, total_days_in_period, average_value),
    }
}

fn compose_insight(days_tracked: u32, total_days: u32, average_value: f64) -> String {
    let coverage = days_tracked as f64 / total_days.max(1) as f64;

    let consistency = if coverage >= 0.8 {
        format!("Great consistency! You tracked {} of {} days.", days_tracked, total_days)
    } else if coverage >= 0.5 {
        format!("Good effort: you tracked {} of {} days.", days_tracked, total_days)
    } else {
        format!(
            "You tracked {} of {} days. Logging more often will make these insights more accurate.",
            days_tracked, total_days
        )
    };

    let mood = if average_value >= 4.0 {
        format!("Your mood has been mostly positive (average {:.1}).", average_value)
    } else if average_value >= 3.0 {
        format!("Your mood has been fairly balanced (average {:.1}).", average_value)
    } else {
        format!(
            "It has been a tougher stretch (average {:.1}). Be kind to yourself.",
            average_value
        )
    };

    format!("{} {}", consistency, mood)
}
