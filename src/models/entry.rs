//! Shared shape of a per-day tracker entry.
//!
//! Mood and sleep collections are stored, merged and analysed through the
//! same trait so the streak calculator, the store adapter and the date join
//! never need to know which tracker they are working on.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Outcome of validating one item of an import payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemValidation<T> {
    Valid(T),
    Invalid(String),
}

#[cfg(test)]
impl<T> ItemValidation<T> {
    pub fn into_valid(self) -> Option<T> {
        match self {
            Self::Valid(entry) => Some(entry),
            Self::Invalid(_) => None,
        }
    }
}

pub trait Entry: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection name, used as the suffix of the persistence slot.
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;

    fn date(&self) -> NaiveDate;

    fn created_at(&self) -> DateTime<Utc>;

    /// Overwrite identity and timestamps, keeping the payload.
    fn restamp(&mut self, id: Uuid, created_at: DateTime<Utc>, updated_at: DateTime<Utc>);

    /// Validate one raw import item. Missing identity, notes, tags and
    /// timestamps are defaulted rather than rejected.
    fn from_import(raw: &Value, now: DateTime<Utc>) -> ItemValidation<Self>;
}

/// Entries that carry a single numeric reading for their day.
pub trait Scored {
    fn score(&self) -> f64;
}

// ============================================================================
// Import field helpers
// ============================================================================

pub(crate) fn import_date(item: &Value) -> Result<NaiveDate, String> {
    let raw = item
        .get("date")
        .and_then(Value::as_str)
        .ok_or_else(|| "missing date".to_string())?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| format!("invalid date {:?}", raw))
}

/// Integer reading in `min..=max`, looked up under the first present key.
pub(crate) fn import_level(item: &Value, keys: &[&str], min: i64, max: i64) -> Result<i64, String> {
    let raw = keys
        .iter()
        .find_map(|k| item.get(*k))
        .ok_or_else(|| format!("missing {}", keys[0]))?;
    let n = raw
        .as_f64()
        .ok_or_else(|| format!("{} is not numeric", keys[0]))?;
    if n.fract() != 0.0 || n < min as f64 || n > max as f64 {
        return Err(format!("{} out of range: {}", keys[0], n));
    }
    Ok(n as i64)
}

pub(crate) fn import_id(item: &Value) -> Uuid {
    item.get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4)
}

pub(crate) fn import_notes(item: &Value) -> String {
    item.get("notes")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

pub(crate) fn import_timestamp(item: &Value, key: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    item.get(key)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_import_date_requires_iso_string() {
        assert!(import_date(&json!({ "date": "2024-01-01" })).is_ok());
        assert!(import_date(&json!({ "date": "bad" })).is_err());
        assert!(import_date(&json!({ "date": 20240101 })).is_err());
        assert!(import_date(&json!({})).is_err());
    }

    #[test]
    fn test_import_level_bounds() {
        let item = json!({ "mood": 3 });
        assert_eq!(import_level(&item, &["mood"], 1, 5), Ok(3));
        assert!(import_level(&json!({ "mood": 99 }), &["mood"], 1, 5).is_err());
        assert!(import_level(&json!({ "mood": 2.5 }), &["mood"], 1, 5).is_err());
        assert!(import_level(&json!({ "mood": "4" }), &["mood"], 1, 5).is_err());
        assert_eq!(import_level(&json!({ "value": 5 }), &["mood", "value"], 1, 5), Ok(5));
    }

    #[test]
    fn test_import_id_keeps_valid_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(import_id(&json!({ "id": id.to_string() })), id);
        assert_ne!(import_id(&json!({ "id": "1700000000000" })), Uuid::nil());
    }

    #[test]
    fn test_import_timestamp_defaults_to_now() {
        let now = Utc::now();
        assert_eq!(import_timestamp(&json!({}), "createdAt", now), now);
        let parsed = import_timestamp(
            &json!({ "createdAt": "2024-01-01T08:30:00Z" }),
            "createdAt",
            now,
        );
        assert_eq!(parsed.to_rfc3339(), "2024-01-01T08:30:00+00:00");
    }
}
