pub mod health;
pub mod insights;
pub mod mood;
pub mod sleep;
pub mod ws;

use crate::dto::ChangeEvent;
use crate::error::{AppError, AppResult};
use crate::AppState;

/// Store calls block (the file backend does disk I/O), so they run on the
/// blocking pool rather than on an async worker.
pub(crate) async fn blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(e.into()))
}

/// Tell connected clients a collection was rewritten. No subscribers is fine.
pub(crate) fn notify_change(state: &AppState, collection: &'static str) {
    if let Ok(msg) = serde_json::to_string(&ChangeEvent::entries_changed(collection)) {
        let _ = state.ws_tx.send(msg);
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use axum::{
        body::Body,
        extract::connect_info::MockConnectInfo,
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use chrono::{Duration, Utc};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::db::MemoryStore;
    use crate::{build_router, AppState};

    fn test_app() -> (AppState, Router) {
        let state = AppState::new(Config::for_tests(), Arc::new(MemoryStore::new()));
        let app = build_router(state.clone())
            .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));
        (state, app)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (state, app) = test_app();
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, _) = send(&app, Method::GET, "/readyz", None).await;
        assert_eq!(status, StatusCode::OK);
        // The readiness write is cleaned up afterwards.
        let probe_slot = crate::db::slot_key("test", "readyz");
        assert_eq!(state.store.get(&probe_slot).unwrap(), None);
    }

    #[tokio::test]
    async fn test_mood_out_of_range_is_rejected() {
        let (state, app) = test_app();
        for mood in [0, 6] {
            let (status, body) =
                send(&app, Method::POST, "/api/mood", Some(json!({ "mood": mood }))).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(body["error"]["code"], 422);
        }
        assert!(state.moods.load().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_same_date_overwrites() {
        let (state, app) = test_app();
        let mut rx = state.ws_tx.subscribe();

        let (status, first) = send(
            &app,
            Method::POST,
            "/api/mood",
            Some(json!({ "date": "2024-03-01", "mood": 2, "tags": ["work"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, second) = send(
            &app,
            Method::POST,
            "/api/mood",
            Some(json!({ "date": "2024-03-01", "mood": 4, "notes": "better" })),
        )
        .await;
        assert_eq!(second["id"], first["id"]);

        let (_, list) = send(&app, Method::GET, "/api/mood", None).await;
        let list = list.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["mood"], 4);
        assert_eq!(list[0]["notes"], "better");

        let event: Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(event["type"], "entries_changed");
        assert_eq!(event["collection"], "mood-entries");
    }

    #[tokio::test]
    async fn test_get_and_delete_entry() {
        let (_, app) = test_app();
        let (_, created) = send(&app, Method::POST, "/api/mood", Some(json!({ "mood": 3 }))).await;
        let id = created["id"].as_str().unwrap().to_string();

        let (status, _) = send(&app, Method::GET, &format!("/api/mood/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, deleted) = send(&app, Method::DELETE, &format!("/api/mood/{}", id), None).await;
        assert_eq!(deleted["deleted"], true);
        let (_, again) = send(&app, Method::DELETE, &format!("/api/mood/{}", id), None).await;
        assert_eq!(again["deleted"], false);

        let (status, _) = send(&app, Method::GET, &format!("/api/mood/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_import_keeps_valid_subset() {
        let (_, app) = test_app();
        let payload = json!([
            { "date": "2024-01-01", "mood": 3 },
            { "date": "bad", "mood": 99 },
            { "notmood": 1 }
        ]);
        let (status, body) = send(&app, Method::POST, "/api/mood/import", Some(payload)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["imported"], 1);
        assert_eq!(body["skipped"], 2);
        assert_eq!(body["total"], 1);
    }

    #[tokio::test]
    async fn test_import_rejects_non_array() {
        let (_, app) = test_app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/mood/import",
            Some(json!({ "entries": [] })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["message"], "Invalid file format");
    }

    #[tokio::test]
    async fn test_import_is_rate_limited() {
        let (_, app) = test_app();
        let payload = json!([{ "date": "2024-01-01", "mood": 3 }]);
        // Test config allows three imports per window.
        for _ in 0..3 {
            let (status, _) =
                send(&app, Method::POST, "/api/mood/import", Some(payload.clone())).await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, _) = send(&app, Method::POST, "/api/mood/import", Some(payload)).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_export_csv() {
        let (_, app) = test_app();
        send(
            &app,
            Method::POST,
            "/api/mood",
            Some(json!({ "date": "2024-03-02", "mood": 5, "tags": ["friends"] })),
        )
        .await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/mood/export?format=csv")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/csv"));
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let csv = String::from_utf8(bytes.to_vec()).unwrap();
        assert_eq!(csv, "Date,Mood Level,Mood,Tags,Notes\n2024-03-02,5,Great,friends,\n");
    }

    #[tokio::test]
    async fn test_streak_and_summary() {
        let (_, app) = test_app();
        let today = Utc::now().date_naive();
        for (offset, mood) in [(0, 4), (1, 5), (2, 3)] {
            let date = (today - Duration::days(offset)).to_string();
            send(
                &app,
                Method::POST,
                "/api/mood",
                Some(json!({ "date": date, "mood": mood })),
            )
            .await;
        }

        let (_, streak) = send(&app, Method::GET, "/api/insights/streak", None).await;
        assert_eq!(streak, json!({ "current": 3, "best": 3 }));

        let (_, summary) =
            send(&app, Method::GET, "/api/insights/summary?period=7days", None).await;
        assert_eq!(summary["daysTracked"], 3);
        assert_eq!(summary["totalDaysInPeriod"], 7);
        assert_eq!(summary["averageValue"], 4.0);

        let (_, sleep_streak) =
            send(&app, Method::GET, "/api/insights/streak?collection=sleep", None).await;
        assert_eq!(sleep_streak, json!({ "current": 0, "best": 0 }));
    }

    #[tokio::test]
    async fn test_sleep_correlation_endpoint() {
        let (_, app) = test_app();
        let (_, empty) =
            send(&app, Method::GET, "/api/insights/sleep-correlation", None).await;
        assert_eq!(empty["status"], "no_sleep_data");

        for (day, minutes, mood) in [(1, 300, 2), (2, 330, 2), (3, 420, 4), (4, 450, 4), (5, 540, 5)] {
            let date = format!("2024-03-0{}", day);
            let (status, _) = send(
                &app,
                Method::POST,
                "/api/sleep",
                Some(json!({ "date": date, "durationMinutes": minutes, "quality": 3 })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            send(&app, Method::POST, "/api/mood", Some(json!({ "date": date, "mood": mood }))).await;
        }

        let (_, result) =
            send(&app, Method::GET, "/api/insights/sleep-correlation", None).await;
        assert_eq!(result["status"], "ok");
        assert_eq!(result["samples"], 5);
        assert_eq!(result["direction"], "positive");
        assert_eq!(result["bands"][0]["averageValue"], 2.0);
    }

    #[tokio::test]
    async fn test_tag_endpoints() {
        let (_, app) = test_app();
        for (day, mood, tag) in [(1, 4, "work"), (2, 4, "work"), (3, 2, "stress")] {
            send(
                &app,
                Method::POST,
                "/api/mood",
                Some(json!({ "date": format!("2024-03-0{}", day), "mood": mood, "tags": [tag] })),
            )
            .await;
        }

        let (_, stats) = send(&app, Method::GET, "/api/insights/tags?sort=count", None).await;
        assert_eq!(stats[0]["tag"], "work");
        assert_eq!(stats[0]["count"], 2);

        let (_, cmp) = send(
            &app,
            Method::GET,
            "/api/insights/tags/compare?a=stress&b=work",
            None,
        )
        .await;
        assert_eq!(cmp["winner"], "b");
        assert_eq!(cmp["diff"], -2.0);

        let (status, _) = send(&app, Method::GET, "/api/insights/overview?days=30", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_sleep_rejects_bad_clock_time() {
        let (_, app) = test_app();
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/sleep",
            Some(json!({ "durationMinutes": 420, "bedtime": "late" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_posts_on_distinct_dates_are_all_stored() {
        let (state, app) = test_app();
        let start = chrono::NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();

        let tasks: Vec<_> = (0..40i64)
            .map(|i| {
                let app = app.clone();
                let date = start + Duration::days(i);
                tokio::spawn(async move {
                    let body = json!({ "date": date.to_string(), "mood": 3 });
                    send(&app, Method::POST, "/api/mood", Some(body)).await.0
                })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap(), StatusCode::OK);
        }

        assert_eq!(state.moods.load().len(), 40);
    }

    #[tokio::test]
    async fn test_overview_uses_camel_case_fields() {
        let (_, app) = test_app();
        send(&app, Method::POST, "/api/mood", Some(json!({ "mood": 4 }))).await;

        let (status, body) = send(&app, Method::GET, "/api/insights/overview?days=3", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalEntries"], 1);
        assert_eq!(body["windowDays"], 3);
        assert_eq!(body["recentAverageMood"], 4.0);
        assert_eq!(body["averageSleepHours"], 0.0);
        assert!(body.get("total_entries").is_none());
    }
}
