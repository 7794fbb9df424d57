use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{self, SessionKeys};
use crate::config::AppConfig;
use crate::database::{keys, ConfigCache, Database};
use crate::error::AppError;
use crate::handlers;

/// Shared application state, cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: ConfigCache,
    pub settings: Arc<AppConfig>,
    pub session_keys: Arc<SessionKeys>,
}

impl AppState {
    /// Load the config cache and session keys from a migrated database
    pub async fn new(db: Database, settings: AppConfig) -> Result<Self, AppError> {
        let config = ConfigCache::load(&mut db.token()).await?;
        let secret = ensure_secret_key(&db, &config).await?;
        let session_keys = SessionKeys::new(&secret, &settings.session)?;

        Ok(Self {
            db,
            config,
            settings: Arc::new(settings),
            session_keys: Arc::new(session_keys),
        })
    }
}

/// Session signing secret, generated and stored on first start
async fn ensure_secret_key(db: &Database, config: &ConfigCache) -> Result<String, AppError> {
    let secret = config.get(keys::SECRET_KEY).await;
    if !secret.is_empty() {
        return Ok(secret);
    }

    let secret = auth::generate_secret();
    let cache = config.clone();
    let value = secret.clone();
    db.transaction(move |t| Box::pin(async move { cache.set(t, keys::SECRET_KEY, &value).await }))
        .await?;
    tracing::info!("Generated new session secret");
    Ok(secret)
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(handlers::routes(&state))
        .route("/health", get(health))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CookieManagerLayer::new()),
        )
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok",
                    "installed": state.config.get_int(keys::INSTALLED).await != 0,
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string(),
                }
            })),
        ),
    }
}

/// Serve on `listener` until Ctrl-C, then close the pool
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let db = state.db.clone();

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
