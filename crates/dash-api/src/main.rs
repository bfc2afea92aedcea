//! # dash-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for the dashboard.
//! Binds to configurable port (default 8080).

use std::sync::Arc;

use dash_api::auth::{InMemorySessions, SessionLookup};
use dash_api::config::{AppConfig, LogFormat};
use dash_api::db::sessions::PgSessionLookup;
use dash_api::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    init_tracing(config.log_format);
    tracing::info!(?config, "configuration loaded");
    tracing::info!(
        rules = config.routes.rules().len(),
        auth_pages = ?config.routes.auth_pages(),
        "route table loaded"
    );

    // Initialize database pool (optional — absent means in-memory only).
    let db_pool = dash_api::db::init_pool().await.map_err(|e| {
        tracing::error!("Database initialization failed: {e}");
        e
    })?;

    let sessions: Arc<dyn SessionLookup> = match (&db_pool, &config.dev_sessions) {
        (Some(pool), dev) => {
            if dev.is_some() {
                tracing::warn!("DEV_SESSIONS ignored: sessions are read from the database");
            }
            Arc::new(PgSessionLookup::new(pool.clone(), config.session_cookie.clone()))
        }
        (None, Some(spec)) => {
            let store = InMemorySessions::from_spec(config.session_cookie.clone(), spec)?;
            tracing::info!(sessions = store.len(), "using in-memory dev sessions");
            Arc::new(store)
        }
        (None, None) => {
            tracing::warn!("no session backend configured — every caller is anonymous");
            Arc::new(InMemorySessions::new(config.session_cookie.clone()))
        }
    };

    let port = config.port;
    let state = AppState::with_sessions(config, sessions, db_pool);

    // Hydrate in-memory stores from database (if connected).
    state.hydrate_from_db().await.map_err(|e| {
        tracing::error!("Database hydration failed: {e}");
        e
    })?;

    let app = dash_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("dashboard listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}
