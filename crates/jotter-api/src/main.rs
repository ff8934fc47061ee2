//! jotter-api - HTTP API server for jotter

use std::net::SocketAddr;

use tracing::info;

use jotter_api::{build_router, logging, ApiConfig, AppState, Stores};
use jotter_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let _log_guard = logging::init(&logging::LogSettings::from_env());

    let config = ApiConfig::from_env()?;
    info!(
        subsystem = "api",
        component = "config",
        pin_scope = %config.pin_scope,
        cookie_secure = config.cookie_secure,
        allowed_origins = ?config.allowed_origins,
        "Configuration loaded"
    );

    // Connect to database
    info!("Connecting to database...");
    let db = Database::connect(&config.database_url, &config.pool).await?;
    db.migrate().await?;
    info!("Database connected and migrated");

    let state = AppState::new(Stores::postgres(db), &config)?;
    let app = build_router(state, &config);

    // Start server
    let addr: SocketAddr = config.bind_addr().parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
