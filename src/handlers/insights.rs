use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use crate::dto::{
    Collection, CompareTagsQuery, OverviewQuery, OverviewResponse, StreakQuery, SummaryQuery,
    TagsQuery,
};
use super::blocking;
use crate::error::AppResult;
use crate::models::mood::MoodEntry;
use crate::models::sleep::SleepEntry;
use crate::services::correlation::{sleep_mood_correlation, SleepCorrelation};
use crate::services::stats::{average, average_last_n_days, mood_distribution, weekday_averages};
use crate::services::streaks::{calculate_streaks, StreakResult};
use crate::services::summary::{summarize_period, PeriodStats};
use crate::services::tags::{compare_tags, tag_stats, TagComparison, TagStat};
use crate::AppState;

pub async fn get_streak(
    State(state): State<AppState>,
    Query(query): Query<StreakQuery>,
) -> AppResult<Json<StreakResult>> {
    let today = Utc::now().date_naive();
    let streak = match query.collection {
        Collection::Mood => calculate_streaks(&load_moods(&state).await?, today),
        Collection::Sleep => {
            let store = state.sleeps.clone();
            calculate_streaks(&blocking(move || store.load()).await?, today)
        }
    };
    Ok(Json(streak))
}

pub async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> AppResult<Json<PeriodStats>> {
    let today = Utc::now().date_naive();
    let entries = load_moods(&state).await?;
    Ok(Json(summarize_period(&entries, query.period, today)))
}

pub async fn get_tag_stats(
    State(state): State<AppState>,
    Query(query): Query<TagsQuery>,
) -> AppResult<Json<Vec<TagStat>>> {
    let entries = load_moods(&state).await?;
    Ok(Json(tag_stats(&entries, query.sort)))
}

pub async fn get_tag_comparison(
    State(state): State<AppState>,
    Query(query): Query<CompareTagsQuery>,
) -> AppResult<Json<TagComparison>> {
    let entries = load_moods(&state).await?;
    Ok(Json(compare_tags(&entries, query.a, query.b)))
}

/// Always 200: missing data is reported through `status`.
pub async fn get_sleep_correlation(
    State(state): State<AppState>,
) -> AppResult<Json<SleepCorrelation>> {
    let (moods, sleeps) = load_both(&state).await?;
    Ok(Json(sleep_mood_correlation(&moods, &sleeps)))
}

pub async fn get_overview(
    State(state): State<AppState>,
    Query(query): Query<OverviewQuery>,
) -> AppResult<Json<OverviewResponse>> {
    let today = Utc::now().date_naive();
    let (moods, sleeps) = load_both(&state).await?;
    let window_days = query.window_days();

    Ok(Json(OverviewResponse {
        total_entries: moods.len(),
        average_mood: average(&moods),
        window_days,
        recent_average_mood: average_last_n_days(&moods, window_days, today),
        average_sleep_hours: average(&sleeps),
        distribution: mood_distribution(&moods),
        weekdays: weekday_averages(&moods),
    }))
}

async fn load_moods(state: &AppState) -> AppResult<Vec<MoodEntry>> {
    let store = state.moods.clone();
    blocking(move || store.load()).await
}

async fn load_both(state: &AppState) -> AppResult<(Vec<MoodEntry>, Vec<SleepEntry>)> {
    let moods = state.moods.clone();
    let sleeps = state.sleeps.clone();
    blocking(move || (moods.load(), sleeps.load())).await
}
