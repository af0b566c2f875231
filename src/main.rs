use std::sync::Arc;

use rental_api::{
    auth::SystemClock,
    config::AppConfig,
    create_router, db,
    users::{IdentityStore, InMemoryIdentityStore, PgUserRepository},
    AppState,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging, honouring RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Rental API - Starting...");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let store: Arc<dyn IdentityStore> = match config.database_url.as_deref() {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = match db::create_pool(database_url).await {
                Ok(pool) => pool,
                Err(e) => {
                    tracing::error!("Failed to create database pool: {}", e);
                    std::process::exit(1);
                }
            };
            if let Err(e) = db::run_migrations(&pool).await {
                tracing::error!("Failed to run database migrations: {}", e);
                std::process::exit(1);
            }
            Arc::new(PgUserRepository::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, accounts are kept in memory only");
            Arc::new(InMemoryIdentityStore::new())
        }
    };

    let addr = config.bind_address();
    let state = AppState::new(config.signing, store, Arc::new(SystemClock));
    let app = create_router(state);

    tracing::info!("Starting server on {}", addr);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Rental API is running on http://{}", addr);
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
