//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, InMemoryStore},
    config::Config,
    error::ApiError,
    web::{api_router, cors_layer, AppState, ApiDoc},
};
use axum::Router;
use marketplace_core::ports::MarketplaceStore;
use sqlx::postgres::PgPoolOptions;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Choose the Store ---
    let store: Arc<dyn MarketplaceStore> = match &config.database_url {
        Some(database_url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(database_url)
                .await?;
            let db_adapter = DbAdapter::new(db_pool);
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(db_adapter)
        }
        None => {
            warn!("DATABASE_URL is not set; using the in-memory store. Data is lost on restart.");
            Arc::new(InMemoryStore::new())
        }
    };

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(store, config.clone()));

    // --- 4. Create the Web Router ---
    let app = Router::new()
        .merge(api_router(app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(&config)?);

    // --- 5. Start the Server ---
    let shutdown = CancellationToken::new();
    tokio::spawn(watch_for_ctrl_c(shutdown.clone()));

    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    info!("Server stopped.");
    Ok(())
}

async fn watch_for_ctrl_c(shutdown: CancellationToken) {
    cancel_on_signal(tokio::signal::ctrl_c(), shutdown).await;
}

/// Cancels `shutdown` once `signal` fires. If the listener cannot be installed
/// the server keeps running until the process is killed.
async fn cancel_on_signal(
    signal: impl Future<Output = std::io::Result<()>>,
    shutdown: CancellationToken,
) {
    if let Err(e) = signal.await {
        warn!("Failed to listen for the shutdown signal, graceful shutdown disabled: {}", e);
        return;
    }
    info!("Shutdown signal received.");
    shutdown.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn signal_cancels_the_server() {
        let shutdown = CancellationToken::new();
        cancel_on_signal(async { Ok(()) }, shutdown.clone()).await;
        assert!(shutdown.is_cancelled());
    }

    #[tokio::test]
    async fn failed_signal_listener_keeps_serving() {
        let shutdown = CancellationToken::new();
        let failing = async { Err(std::io::Error::new(std::io::ErrorKind::Other, "no signals")) };
        cancel_on_signal(failing, shutdown.clone()).await;
        assert!(!shutdown.is_cancelled());
    }
}
