use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use super::entry::{
    import_date, import_id, import_level, import_notes, import_timestamp, Entry, ItemValidation,
    Scored,
};

pub const MAX_SLEEP_MINUTES: u32 = 24 * 60;
const DEFAULT_QUALITY: i32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub duration_minutes: u32,
    pub quality: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedtime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wake_time: Option<String>,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SleepEntry {
    #[cfg(test)]
    pub fn new(date: NaiveDate, duration_minutes: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            duration_minutes,
            quality: DEFAULT_QUALITY,
            bedtime: None,
            wake_time: None,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn hours(&self) -> f64 {
        self.duration_minutes as f64 / 60.0
    }
}

impl Entry for SleepEntry {
    const COLLECTION: &'static str = "sleep-entries";

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
        let duration_minutes =
            match import_level(raw, &["durationMinutes", "duration"], 1, MAX_SLEEP_MINUTES as i64) {
                Ok(m) => m as u32,
                Err(reason) => return ItemValidation::Invalid(reason),
            };
        let quality = if raw.get("quality").is_some() {
            match import_level(raw, &["quality"], 1, 5) {
                Ok(q) => q as i32,
                Err(reason) => return ItemValidation::Invalid(reason),
            }
        } else {
            DEFAULT_QUALITY
        };
        let clock = |key: &str| {
            raw.get(key)
                .and_then(Value::as_str)
                .filter(|s| is_clock_time(s))
                .map(str::to_string)
        };

        ItemValidation::Valid(SleepEntry {
            id: import_id(raw),
            date,
            duration_minutes,
            quality,
            bedtime: clock("bedtime"),
            wake_time: clock("wakeTime"),
            notes: import_notes(raw),
            created_at: import_timestamp(raw, "createdAt", now),
            updated_at: import_timestamp(raw, "updatedAt", now),
        })
    }
}

impl Scored for SleepEntry {
    fn score(&self) -> f64 {
        self.hours()
    }
}

fn is_clock_time(s: &str) -> bool {
    NaiveTime::parse_from_str(s, "%H:%M").is_ok()
}

/// POST /api/sleep
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertSleepRequest {
    pub id: Option<Uuid>,
    pub date: Option<NaiveDate>,

    #[validate(range(min = 1, max = 1440, message = "Duration must be between 1 and 1440 minutes"))]
    pub duration_minutes: u32,

    #[validate(range(min = 1, max = 5, message = "Quality must be between 1 and 5"))]
    pub quality: Option<i32>,

    pub bedtime: Option<String>,
    pub wake_time: Option<String>,

    #[validate(length(max = 5000, message = "Notes must be under 5000 characters"))]
    pub notes: Option<String>,
}

impl UpsertSleepRequest {
    /// Bedtime and wake time must be `HH:MM` when present.
    pub fn validate_times(&self) -> Result<(), String> {
        for (name, value) in [("bedtime", &self.bedtime), ("wakeTime", &self.wake_time)] {
            if let Some(v) = value {
                if !is_clock_time(v) {
                    return Err(format!("{} must be HH:MM", name));
                }
            }
        }
        Ok(())
    }

    pub fn into_entry(self, today: NaiveDate, now: DateTime<Utc>) -> SleepEntry {
        SleepEntry {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            date: self.date.unwrap_or(today),
            duration_minutes: self.duration_minutes,
            quality: self.quality.unwrap_or(DEFAULT_QUALITY),
            bedtime: self.bedtime,
            wake_time: self.wake_time,
            notes: self.notes.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }
}
