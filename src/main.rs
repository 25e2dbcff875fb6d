use std::error::Error;
use std::sync::Arc;

use item_api::{
    auth::{PasswordService, TokenService},
    config::{Config, StoreBackend},
    create_router, db,
    store::{CredentialStore, MemoryCredentialStore, PgCredentialStore},
    AppState,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging, RUST_LOG overrides the default filter
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("item_api=debug,tower_http=info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Item API - Starting...");

    let config = Config::from_env()?;

    let store: Arc<dyn CredentialStore> = match &config.database.backend {
        StoreBackend::Postgres(url) => {
            tracing::info!("Connecting to database...");
            let pool = db::create_pool(
                url,
                config.database.max_connections,
                config.database.acquire_timeout,
            )
            .await?;
            db::ensure_schema(&pool).await?;
            Arc::new(PgCredentialStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, data is lost on exit");
            Arc::new(MemoryCredentialStore::new())
        }
    };

    let passwords = Arc::new(PasswordService::new(&config.hashing)?);
    let tokens = Arc::new(TokenService::new(&config.token)?);
    tracing::info!("Token issuer: {}", tokens.issuer());

    let state = AppState::new(store, passwords, tokens)
        .with_request_timeout(config.server.request_timeout);
    let app = create_router(state);

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Item API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Item API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
