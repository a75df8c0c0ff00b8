use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use super::blocking;
use crate::db::slot_key;
use crate::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "moodarc-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Ready once the store accepts a write, returns it and removes it again.
pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let probe_key = slot_key(&state.config.store_namespace, "readyz");
    let store = state.store.clone();
    let key = probe_key.clone();
    let store_ok = blocking(move || {
        store.set(&key, b"ok").is_ok()
            && matches!(store.get(&key), Ok(Some(ref v)) if v.as_slice() == b"ok")
            && store.remove(&key).is_ok()
    })
    .await
    .unwrap_or(false);

    if store_ok {
        (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "checks": { "store": "ok" },
            })),
        )
    } else {
        tracing::warn!(key = %probe_key, "Readiness probe failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "not_ready",
                "checks": { "store": "failed" },
            })),
        )
    }
}
