//! Carlot dealership service
//!
//! Vehicle inventory browsing, JWT-backed accounts, favorites, and a
//! contact desk, served as a JSON API.

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use carlot::{routes, AppState, Config, SqliteStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carlot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    tracing::info!(port = config.port, production = config.production, "Loaded configuration");

    // Open the database
    let store = match &config.database_path {
        Some(path) => {
            tracing::info!(path, "Opening database");
            SqliteStore::open(path)?
        }
        None => {
            tracing::warn!("DATABASE_PATH not set, using an in-memory database");
            SqliteStore::open_in_memory()?
        }
    };

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), store));

    // Create router
    let app = routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
