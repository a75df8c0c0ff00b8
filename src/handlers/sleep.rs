use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use super::{blocking, notify_change};
use crate::dto::{DeleteResponse, EntryListQuery, ImportResponse};
use crate::error::{AppError, AppResult};
use crate::models::entry::Entry;
use crate::models::sleep::{SleepEntry, UpsertSleepRequest};
use crate::services::entry_store::validate_import;
use crate::AppState;

pub async fn list_sleep_entries(
    State(state): State<AppState>,
    Query(query): Query<EntryListQuery>,
) -> AppResult<Json<Vec<SleepEntry>>> {
    let store = state.sleeps.clone();
    let entries = blocking(move || store.load())
        .await?
        .into_iter()
        .filter(|e| query.contains(e.date))
        .collect();
    Ok(Json(entries))
}

pub async fn upsert_sleep_entry(
    State(state): State<AppState>,
    Json(body): Json<UpsertSleepRequest>,
) -> AppResult<Json<SleepEntry>> {
    body.validate()?;
    body.validate_times().map_err(AppError::Validation)?;

    let now = Utc::now();
    let entry = body.into_entry(now.date_naive(), now);
    let store = state.sleeps.clone();
    let stored = blocking(move || store.upsert(entry, now)).await??;

    tracing::info!(
        id = %stored.id,
        date = %stored.date,
        minutes = stored.duration_minutes,
        "Sleep entry saved"
    );
    notify_change(&state, SleepEntry::COLLECTION);

    Ok(Json(stored))
}

pub async fn delete_sleep_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DeleteResponse>> {
    let store = state.sleeps.clone();
    let deleted = blocking(move || store.delete(id)).await??;
    if deleted {
        tracing::info!(id = %id, "Sleep entry deleted");
        notify_change(&state, SleepEntry::COLLECTION);
    }
    Ok(Json(DeleteResponse { deleted, id }))
}

pub async fn import_sleep_entries(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<ImportResponse>> {
    let data: serde_json::Value =
        serde_json::from_slice(&body).map_err(|_| AppError::InvalidImport)?;
    let submitted = data.as_array().map_or(0, Vec::len);

    let now = Utc::now();
    let items = validate_import::<SleepEntry>(&data, now).ok_or(AppError::InvalidImport)?;
    let store = state.sleeps.clone();
    let outcome = blocking(move || store.import(items, now)).await??;

    tracing::info!(
        imported = outcome.imported,
        skipped = submitted - outcome.imported,
        "Sleep entries imported"
    );
    notify_change(&state, SleepEntry::COLLECTION);

    Ok(Json(ImportResponse {
        imported: outcome.imported,
        skipped: submitted - outcome.imported,
        total: outcome.total_after,
    }))
}
