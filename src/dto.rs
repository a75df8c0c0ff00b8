//! # MoodArc: Request/Response DTOs
//!
//! Query strings and response envelopes shared by the handlers. Entry bodies
//! live next to their models (`models::mood`, `models::sleep`).
//!
//! Conventions:
//! - `*Query`    → deserialized from query params
//! - `*Response` → serialized to client JSON

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::mood::MoodTag;
use crate::services::stats::{LevelCount, WeekdayAverage};
use crate::services::summary::Period;
use crate::services::tags::TagSort;

// ============================================================================
// Common
// ============================================================================

/// Standard delete confirmation
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub id: Uuid,
}

/// GET /api/mood, GET /api/sleep
#[derive(Debug, Default, Deserialize)]
pub struct EntryListQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl EntryListQuery {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date.map_or(true, |start| date >= start)
            && self.end_date.map_or(true, |end| date <= end)
    }
}

/// Which collection a collection-agnostic endpoint works on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    #[default]
    Mood,
    Sleep,
}

// ============================================================================
// Import / Export
// ============================================================================

/// POST /api/mood/import, POST /api/sleep/import
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub skipped: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

/// GET /api/mood/export
#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: ExportFormat,
}

// ============================================================================
// Insights
// ============================================================================

/// GET /api/insights/streak
#[derive(Debug, Default, Deserialize)]
pub struct StreakQuery {
    #[serde(default)]
    pub collection: Collection,
}

/// GET /api/insights/summary
#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    #[serde(default)]
    pub period: Period,
}

/// GET /api/insights/tags
#[derive(Debug, Default, Deserialize)]
pub struct TagsQuery {
    #[serde(default)]
    pub sort: TagSort,
}

/// GET /api/insights/tags/compare
#[derive(Debug, Deserialize)]
pub struct CompareTagsQuery {
    pub a: MoodTag,
    pub b: MoodTag,
}

/// GET /api/insights/overview
#[derive(Debug, Default, Deserialize)]
pub struct OverviewQuery {
    pub days: Option<i64>,
}

impl OverviewQuery {
    /// Window length for the recent average, clamped to 1..=365. Default 7.
    pub fn window_days(&self) -> i64 {
        self.days.unwrap_or(7).clamp(1, 365)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    pub total_entries: usize,
    pub average_mood: f64,
    pub window_days: i64,
    pub recent_average_mood: f64,
    pub average_sleep_hours: f64,
    pub distribution: Vec<LevelCount>,
    pub weekdays: Vec<WeekdayAverage>,
}

// ============================================================================
// Change broadcast
// ============================================================================

/// Pushed over /ws whenever a collection is rewritten
#[derive(Debug, Clone, Serialize)]
pub struct ChangeEvent {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub collection: &'static str,
}

impl ChangeEvent {
    pub fn entries_changed(collection: &'static str) -> Self {
        Self {
            kind: "entries_changed",
            collection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_bounds_are_inclusive() {
        let q = EntryListQuery {
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 5),
        };
        assert!(q.contains(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert!(q.contains(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()));
        assert!(!q.contains(NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()));
        assert!(EntryListQuery::default().contains(NaiveDate::from_ymd_opt(1999, 1, 1).unwrap()));
    }

    #[test]
    fn test_overview_window_clamped() {
        assert_eq!(OverviewQuery { days: None }.window_days(), 7);
        assert_eq!(OverviewQuery { days: Some(0) }.window_days(), 1);
        assert_eq!(OverviewQuery { days: Some(1000) }.window_days(), 365);
    }

    #[test]
    fn test_change_event_shape() {
        let v = serde_json::to_value(ChangeEvent::entries_changed("mood-entries")).unwrap();
        assert_eq!(v["type"], "entries_changed");
        assert_eq!(v["collection"], "mood-entries");
    }
}
