mod config;

use std::path::Path;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use warbler_api::{AppState, AppStateInner};
use warbler_db::Database;

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warbler=debug,warbler_api=debug,warbler_db=info,tower_http=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    if config.uses_dev_secret() {
        warn!("WARBLER_SECRET_KEY is unset; using the development secret");
    }

    // Init database
    let db = if config.database_url == ":memory:" {
        Database::open_in_memory()?
    } else {
        Database::open(Path::new(&config.database_url))?
    };

    let state: AppState = Arc::new(AppStateInner {
        db,
        session_secret: config.secret_key.clone(),
        session_ttl: chrono::Duration::days(config.session_days),
    });

    let app = warbler_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    info!("Warbler listening on {}", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
