use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use super::entry::{
    import_date, import_id, import_level, import_notes, import_timestamp, Entry, ItemValidation,
    Scored,
};

pub const MIN_MOOD: i32 = 1;
pub const MAX_MOOD: i32 = 5;

/// Context label attached to a mood entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodTag {
    Work,
    Family,
    Health,
    Sleep,
    Stress,
    Friends,
    Exercise,
    Food,
}

impl MoodTag {
    pub const ALL: [MoodTag; 8] = [
        MoodTag::Work,
        MoodTag::Family,
        MoodTag::Health,
        MoodTag::Sleep,
        MoodTag::Stress,
        MoodTag::Friends,
        MoodTag::Exercise,
        MoodTag::Food,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MoodTag::Work => "work",
            MoodTag::Family => "family",
            MoodTag::Health => "health",
            MoodTag::Sleep => "sleep",
            MoodTag::Stress => "stress",
            MoodTag::Friends => "friends",
            MoodTag::Exercise => "exercise",
            MoodTag::Food => "food",
        }
    }
}

impl fmt::Display for MoodTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoodTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MoodTag::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown tag {:?}", s))
    }
}

/// Display name of a mood level.
pub fn mood_label(level: i32) -> &'static str {
    match level {
        1 => "Awful",
        2 => "Bad",
        3 => "Okay",
        4 => "Good",
        5 => "Great",
        _ => "Unknown",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(alias = "value")]
    pub mood: i32,
    #[serde(default)]
    pub tags: BTreeSet<MoodTag>,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MoodEntry {
    #[cfg(test)]
    pub fn new(date: NaiveDate, mood: i32, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            mood,
            tags: BTreeSet::new(),
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[cfg(test)]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = MoodTag>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    pub fn label(&self) -> &'static str {
        mood_label(self.mood)
    }
}

impl Entry for MoodEntry {
    const COLLECTION: &'static str = "mood-entries";

    fn id(&self) -> Uuid {
        self.id
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn restamp(&mut self, id: Uuid, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
        self.updated_at = updated_at;
    }

    fn from_import(raw: &Value, now: DateTime<Utc>) -> ItemValidation<Self> {
        if !raw.is_object() {
            return ItemValidation::Invalid("item is not an object".into());
        }
        let date = match import_date(raw) {
            Ok(d) => d,
            Err(reason) => return ItemValidation::Invalid(reason),
        };
        let mood = match import_level(raw, &["mood", "value"], MIN_MOOD as i64, MAX_MOOD as i64) {
            Ok(m) => m as i32,
            Err(reason) => return ItemValidation::Invalid(reason),
        };
        // Unknown labels are dropped, not fatal.
        let tags = raw
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .filter_map(|t| t.parse::<MoodTag>().ok())
                    .collect()
            })
            .unwrap_or_default();

        ItemValidation::Valid(MoodEntry {
            id: import_id(raw),
            date,
            mood,
            tags,
            notes: import_notes(raw),
            created_at: import_timestamp(raw, "createdAt", now),
            updated_at: import_timestamp(raw, "updatedAt", now),
        })
    }
}

impl Scored for MoodEntry {
    fn score(&self) -> f64 {
        self.mood as f64
    }
}

/// POST /api/mood
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertMoodRequest {
    pub id: Option<Uuid>,
    pub date: Option<NaiveDate>,

    #[validate(range(min = 1, max = 5, message = "Mood must be between 1 and 5"))]
    pub mood: i32,

    #[serde(default)]
    pub tags: BTreeSet<MoodTag>,

    #[validate(length(max = 5000, message = "Notes must be under 5000 characters"))]
    pub notes: Option<String>,
}

impl UpsertMoodRequest {
    pub fn into_entry(self, today: NaiveDate, now: DateTime<Utc>) -> MoodEntry {
        MoodEntry {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            date: self.date.unwrap_or(today),
            mood: self.mood,
            tags: self.tags,
            notes: self.notes.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }
}
