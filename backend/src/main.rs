//! Cloud Roasters - Batch Reporting Server
//!
//! Receives roasting batch reports from the roastery stores and persists
//! them with sequential batch ids.

use std::{net::SocketAddr, sync::Arc};

use cloud_roasters::{
    config::StoreBackend,
    create_app,
    services::SubmissionOptions,
    store::{MemoryRecordStore, PgRecordStore, RecordStore},
    AppState, Config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cloud_roasters=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Cloud Roasters Batch Reporting Server");
    tracing::info!("Environment: {}", config.environment);

    let store: Arc<dyn RecordStore> = match config.store.backend {
        StoreBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let store = PgRecordStore::connect(&config.database).await?;
            tracing::info!("Database connection established");

            tracing::info!("Running database migrations...");
            store.ensure_schema().await?;
            tracing::info!("Migrations completed");

            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory record store; reports are lost on restart");
            Arc::new(MemoryRecordStore::new())
        }
    };

    let state = AppState::new(store, SubmissionOptions::from(&config.store));
    let app = create_app(state);

    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
