//! Sleep → mood correlation over two independently stored collections.

use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;

use crate::models::mood::MoodEntry;
use crate::models::sleep::SleepEntry;

/// Minimum change in mean mood between adjacent bands that counts as a trend.
const MATERIAL_DIFF: f64 = 0.3;

const BAND_LABELS: [&str; 3] = ["Under 6 hours", "6-8 hours", "Over 8 hours"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStatus {
    Ok,
    NoSleepData,
    NoOverlap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationBand {
    pub label: &'static str,
    pub average_value: Option<f64>,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SleepCorrelation {
    pub status: CorrelationStatus,
    pub samples: u32,
    pub bands: Vec<CorrelationBand>,
    pub direction: Direction,
    pub insight: String,
}

impl SleepCorrelation {
    fn without_samples(status: CorrelationStatus, insight: &str) -> Self {
        Self {
            status,
            samples: 0,
            bands: BAND_LABELS
                .iter()
                .map(|&label| CorrelationBand {
                    label,
                    average_value: None,
                    count: 0,
                })
                .collect(),
            direction: Direction::Neutral,
            insight: insight.to_string(),
        }
    }
}

/// Inner join of two sequences on extracted keys. When `right` holds several
/// items with one key, the last of them is used.
pub fn join_by_key<'a, L, R, K, FL, FR>(
    left: &'a [L],
    right: &'a [R],
    left_key: FL,
    right_key: FR,
) -> Vec<(&'a L, &'a R)>
where
    K: Eq + Hash,
    FL: Fn(&L) -> K,
    FR: Fn(&R) -> K,
{
    let index: HashMap<K, &R> = right.iter().map(|r| (right_key(r), r)).collect();
    left.iter()
        .filter_map(|l| index.get(&left_key(l)).map(|r| (l, *r)))
        .collect()
}

fn band_index(hours: f64) -> usize {
    if hours < 6.0 {
        0
    } else if hours <= 8.0 {
        1
    } else {
        2
    }
}

pub fn sleep_mood_correlation(moods: &[MoodEntry], sleeps: &[SleepEntry]) -> SleepCorrelation {
    if sleeps.is_empty() {
        return SleepCorrelation::without_samples(
            CorrelationStatus::NoSleepData,
            "No sleep data yet. Log your sleep to see how it relates to your mood.",
        );
    }

    let pairs = join_by_key(moods, sleeps, |m| m.date, |s| s.date);
    if pairs.is_empty() {
        return SleepCorrelation::without_samples(
            CorrelationStatus::NoOverlap,
            "No days have both a mood and a sleep entry yet.",
        );
    }

    let mut sums = [0.0f64; 3];
    let mut counts = [0u32; 3];
    for (mood, sleep) in &pairs {
        let band = band_index(sleep.hours());
        sums[band] += mood.mood as f64;
        counts[band] += 1;
    }

    let means: Vec<Option<f64>> = (0..3)
        .map(|i| (counts[i] > 0).then(|| sums[i] / counts[i] as f64))
        .collect();
    let bands: Vec<CorrelationBand> = (0..3)
        .map(|i| CorrelationBand {
            label: BAND_LABELS[i],
            average_value: means[i],
            count: counts[i],
        })
        .collect();

    let samples = pairs.len() as u32;
    let direction = direction_of(&means);
    let insight = compose_insight(samples, &means, direction);

    SleepCorrelation {
        status: CorrelationStatus::Ok,
        samples,
        bands,
        direction,
        insight,
    }
}

/// Compare each populated band with the next populated one, so an empty
/// middle band does not hide a low/high contrast. Mixed signals resolve to
/// the larger change.
fn direction_of(means: &[Option<f64>]) -> Direction {
    let populated: Vec<f64> = means.iter().flatten().copied().collect();
    let mut rise = 0.0f64;
    let mut fall = 0.0f64;
    for pair in populated.windows(2) {
        let diff = pair[1] - pair[0];
        if diff > MATERIAL_DIFF {
            rise = rise.max(diff);
        } else if diff < -MATERIAL_DIFF {
            fall = fall.max(-diff);
        }
    }

    match (rise > 0.0, fall > 0.0) {
        (true, false) => Direction::Positive,
        (false, true) => Direction::Negative,
        (true, true) if rise >= fall => Direction::Positive,
        (true, true) => Direction::Negative,
        (false, false) => Direction::Neutral,
    }
}

fn compose_insight(samples: u32, means: &[Option<f64>], direction: Direction) -> String {
    let present: Vec<(usize, f64)> = means
        .iter()
        .enumerate()
        .filter_map(|(i, m)| m.map(|m| (i, m)))
        .collect();

    if let [(only, _)] = present.as_slice() {
        return format!(
            "Based on {} days, your sleep has stayed in the {} range, so there is nothing to compare yet.",
            samples,
            BAND_LABELS[*only].to_lowercase()
        );
    }

    // Strongest contrast between any two populated bands, oriented from
    // less sleep to more.
    let mut strongest: Option<(usize, usize, f64)> = None;
    for (a, &(i, mi)) in present.iter().enumerate() {
        for &(j, mj) in &present[a + 1..] {
            let diff = mj - mi;
            if strongest.map_or(true, |(_, _, d)| diff.abs() > d.abs()) {
                strongest = Some((i, j, diff));
            }
        }
    }

    // Small steps can still add up to a material low/high gap.
    let material = strongest.map_or(false, |(_, _, d)| d.abs() > MATERIAL_DIFF);
    if direction == Direction::Neutral && !material {
        return format!(
            "Based on {} days, your mood looks about the same no matter how long you sleep.",
            samples
        );
    }

    match strongest {
        Some((less, more, diff)) => format!(
            "Based on {} days, your mood is {:.1} points {} with {} of sleep than with {}.",
            samples,
            diff.abs(),
            if diff >= 0.0 { "higher" } else { "lower" },
            BAND_LABELS[more].to_lowercase(),
            BAND_LABELS[less].to_lowercase()
        ),
        None => format!("Based on {} days of mood and sleep data.", samples),
    }
}
