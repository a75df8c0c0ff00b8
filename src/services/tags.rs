use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::mood::{MoodEntry, MoodTag};

/// Differences within this band are treated as noise.
const TAG_NOISE_FLOOR: f64 = 0.1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagSort {
    #[default]
    Average,
    Count,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagStat {
    pub tag: MoodTag,
    pub average_value: f64,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagWinner {
    A,
    B,
    Tie,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagComparison {
    pub tag_a: MoodTag,
    pub tag_b: MoodTag,
    pub average_a: f64,
    pub average_b: f64,
    pub count_a: u32,
    pub count_b: u32,
    pub diff: f64,
    pub winner: TagWinner,
}

pub fn tag_stats(entries: &[MoodEntry], sort: TagSort) -> Vec<TagStat> {
    let mut totals: BTreeMap<MoodTag, (f64, u32)> = BTreeMap::new();
    for entry in entries {
        for tag in &entry.tags {
            let slot = totals.entry(*tag).or_insert((0.0, 0));
            slot.0 += entry.mood as f64;
            slot.1 += 1;
        }
    }

    let mut stats: Vec<TagStat> = totals
        .into_iter()
        .map(|(tag, (sum, count))| TagStat {
            tag,
            average_value: sum / count as f64,
            count,
        })
        .collect();

    // Stable sort keeps vocabulary order for full ties.
    match sort {
        TagSort::Average => stats.sort_by(|a, b| {
            desc_f64(a.average_value, b.average_value).then(b.count.cmp(&a.count))
        }),
        TagSort::Count => stats.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then(desc_f64(a.average_value, b.average_value))
        }),
    }
    stats
}

fn desc_f64(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

pub fn compare_tags(entries: &[MoodEntry], tag_a: MoodTag, tag_b: MoodTag) -> TagComparison {
    let (average_a, count_a) = tag_average(entries, tag_a);
    let (average_b, count_b) = tag_average(entries, tag_b);
    let diff = average_a - average_b;

    let winner = if diff > TAG_NOISE_FLOOR {
        TagWinner::A
    } else if diff < -TAG_NOISE_FLOOR {
        TagWinner::B
    } else {
        TagWinner::Tie
    };

    TagComparison {
        tag_a,
        tag_b,
        average_a,
        average_b,
        count_a,
        count_b,
        diff,
        winner,
    }
}

/// Mean mood of entries carrying `tag`, `0.0` when none do.
fn tag_average(entries: &[MoodEntry], tag: MoodTag) -> (f64, u32) {
    let (sum, count) = entries
        .iter()
        .filter(|e| e.tags.contains(&tag))
        .fold((0.0, 0u32), |(sum, count), e| (sum + e.mood as f64, count + 1));
    if count == 0 {
        (0.0, 0)
    } else {
        (sum / count as f64, count)
    }
}
