use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod db;
mod dto;
mod error;
mod handlers;
mod models;
mod rate_limit;
mod services;

use config::Config;
use db::KeyValueStore;
use models::mood::MoodEntry;
use models::sleep::SleepEntry;
use rate_limit::RateLimitState;
use services::entry_store::EntryStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn KeyValueStore>,
    pub moods: EntryStore<MoodEntry>,
    pub sleeps: EntryStore<SleepEntry>,
    pub ws_tx: broadcast::Sender<String>,
    pub rate_limiter: RateLimitState,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn KeyValueStore>) -> Self {
        let (ws_tx, _) = broadcast::channel::<String>(256);
        let rate_limiter =
            RateLimitState::new(config.import_rate_limit, config.import_rate_window_secs);

        Self {
            moods: EntryStore::new(store.clone(), &config.store_namespace),
            sleeps: EntryStore::new(store.clone(), &config.store_namespace),
            config: Arc::new(config),
            store,
            ws_tx,
            rate_limiter,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let import_routes = Router::new()
        .route("/api/mood/import", post(handlers::mood::import_mood_entries))
        .route("/api/sleep/import", post(handlers::sleep::import_sleep_entries))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit_import,
        ));

    let entry_routes = Router::new()
        // Mood
        .route(
            "/api/mood",
            get(handlers::mood::list_mood_entries).post(handlers::mood::upsert_mood_entry),
        )
        .route("/api/mood/export", get(handlers::mood::export_mood_entries))
        .route(
            "/api/mood/:id",
            get(handlers::mood::get_mood_entry).delete(handlers::mood::delete_mood_entry),
        )
        // Sleep
        .route(
            "/api/sleep",
            get(handlers::sleep::list_sleep_entries).post(handlers::sleep::upsert_sleep_entry),
        )
        .route(
            "/api/sleep/:id",
            axum::routing::delete(handlers::sleep::delete_sleep_entry),
        );

    let insight_routes = Router::new()
        .route("/api/insights/streak", get(handlers::insights::get_streak))
        .route("/api/insights/summary", get(handlers::insights::get_summary))
        .route("/api/insights/tags", get(handlers::insights::get_tag_stats))
        .route(
            "/api/insights/tags/compare",
            get(handlers::insights::get_tag_comparison),
        )
        .route(
            "/api/insights/sleep-correlation",
            get(handlers::insights::get_sleep_correlation),
        )
        .route("/api/insights/overview", get(handlers::insights::get_overview));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .route("/ws", get(handlers::ws::ws_handler));

    Router::new()
        .merge(public_routes)
        .merge(import_routes)
        .merge(entry_routes)
        .merge(insight_routes)
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let mut origins = Vec::new();
    match config.frontend_url.parse::<axum::http::HeaderValue>() {
        Ok(origin) => origins.push(origin),
        Err(e) => tracing::warn!(url = %config.frontend_url, error = %e, "Ignoring invalid FRONTEND_URL"),
    }
    // Extra origins, e.g. testing from another device on the LAN
    if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
        for o in extra.split(',') {
            if let Ok(hv) = o.trim().parse::<axum::http::HeaderValue>() {
                origins.push(hv);
            }
        }
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moodarc_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Config::from_env();
    let store = db::create_store(&config)?;
    tracing::info!(
        backend = ?config.store_backend,
        namespace = %config.store_namespace,
        "Entry store ready"
    );

    let cors = cors_layer(&config);
    let addr = config.listen_addr();
    let state = AppState::new(config, store);

    rate_limit::spawn_cleanup_worker(state.rate_limiter.clone());

    let app = build_router(state)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    // Client IP is needed for import rate limiting
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
