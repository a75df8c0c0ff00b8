use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use super::{blocking, notify_change};
use crate::dto::{DeleteResponse, EntryListQuery, ExportFormat, ExportQuery, ImportResponse};
use crate::error::{AppError, AppResult};
use crate::models::entry::Entry;
use crate::models::mood::{MoodEntry, UpsertMoodRequest};
use crate::services::entry_store::validate_import;
use crate::services::export::mood_entries_to_csv;
use crate::AppState;

pub async fn list_mood_entries(
    State(state): State<AppState>,
    Query(query): Query<EntryListQuery>,
) -> AppResult<Json<Vec<MoodEntry>>> {
    let store = state.moods.clone();
    let entries = blocking(move || store.load())
        .await?
        .into_iter()
        .filter(|e| query.contains(e.date))
        .collect();
    Ok(Json(entries))
}

pub async fn get_mood_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MoodEntry>> {
    let store = state.moods.clone();
    blocking(move || store.load())
        .await?
        .into_iter()
        .find(|e| e.id == id)
        .map(Json)
        .ok_or(AppError::NotFound("Mood entry not found".into()))
}

/// Create or overwrite the entry for a day (matched by date, then id).
pub async fn upsert_mood_entry(
    State(state): State<AppState>,
    Json(body): Json<UpsertMoodRequest>,
) -> AppResult<Json<MoodEntry>> {
    body.validate()?;

    let now = Utc::now();
    let entry = body.into_entry(now.date_naive(), now);
    let store = state.moods.clone();
    let stored = blocking(move || store.upsert(entry, now)).await??;

    tracing::info!(id = %stored.id, date = %stored.date, mood = stored.mood, "Mood entry saved");
    notify_change(&state, MoodEntry::COLLECTION);

    Ok(Json(stored))
}

pub async fn delete_mood_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DeleteResponse>> {
    let store = state.moods.clone();
    let deleted = blocking(move || store.delete(id)).await??;
    if deleted {
        tracing::info!(id = %id, "Mood entry deleted");
        notify_change(&state, MoodEntry::COLLECTION);
    }
    Ok(Json(DeleteResponse { deleted, id }))
}

/// Accepts the raw contents of an exported JSON file.
pub async fn import_mood_entries(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<ImportResponse>> {
    let data: serde_json::Value =
        serde_json::from_slice(&body).map_err(|_| AppError::InvalidImport)?;
    let submitted = data.as_array().map_or(0, Vec::len);

    let now = Utc::now();
    let items = validate_import::<MoodEntry>(&data, now).ok_or(AppError::InvalidImport)?;
    let store = state.moods.clone();
    let outcome = blocking(move || store.import(items, now)).await??;

    tracing::info!(
        imported = outcome.imported,
        skipped = submitted - outcome.imported,
        "Mood entries imported"
    );
    notify_change(&state, MoodEntry::COLLECTION);

    Ok(Json(ImportResponse {
        imported: outcome.imported,
        skipped: submitted - outcome.imported,
        total: outcome.total_after,
    }))
}

pub async fn export_mood_entries(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    let store = state.moods.clone();
    let entries = blocking(move || store.load()).await?;
    let stamp = Utc::now().format("%Y%m%d_%H%M%S");

    let (content_type, filename, body) = match query.format {
        ExportFormat::Csv => (
            "text/csv; charset=utf-8",
            format!("mood_entries_{}.csv", stamp),
            mood_entries_to_csv(&entries),
        ),
        ExportFormat::Json => (
            "application/json; charset=utf-8",
            format!("mood_entries_{}.json", stamp),
            serde_json::to_string_pretty(&entries).map_err(anyhow::Error::from)?,
        ),
    };

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response())
}
