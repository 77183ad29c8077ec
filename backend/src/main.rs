//! Fruit Pilot Auth Backend
//!
//! Token-based authentication for the Fruit Pilot mission dashboard.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! - Routes: HTTP request handling and routing
//! - Auth: token issuance, verification and the gatekeeper layer
//! - Services: signup/login business logic
//! - Repositories: credential store (PostgreSQL or in-memory)

use anyhow::Result;
use fruit_pilot_backend::{
    auth::PasswordService,
    config::{self, StoreKind},
    repositories::{InMemoryUserRepository, PgUserRepository, UserRepository},
    routes,
    state::AppState,
};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration; a missing secret or store URL stops here, and so
    // does a weak secret or in-memory store in production
    let config = config::AppConfig::load().map_err(|e| {
        error!("Configuration error: {:#}", e);
        e
    })?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        "Starting Fruit Pilot Auth Backend"
    );

    PasswordService::warm_up()?;

    let users = connect_store(&config).await?;

    // Create application state
    let state = AppState::new(users, config);
    let addr = format!(
        "{}:{}",
        state.config().server.host,
        state.config().server.port
    );

    // Build application
    let app = routes::create_router(state);

    // Start server
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Open the configured credential store
///
/// An unreachable database is fatal; there is no fallback store.
async fn connect_store(config: &config::AppConfig) -> Result<Arc<dyn UserRepository>> {
    match config.database.store_kind()? {
        StoreKind::Postgres => {
            info!("Connecting to database...");
            let repo = PgUserRepository::connect(&config.database).await?;

            // Run migrations (skip in production if using separate migration job)
            if !config::AppConfig::is_production() {
                repo.migrate().await?;
            }

            Ok(Arc::new(repo))
        }
        StoreKind::Memory => {
            warn!("Using in-memory credential store. Users are lost on restart.");
            Ok(Arc::new(InMemoryUserRepository::new()))
        }
    }
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "fruit_pilot_backend=info,tower_http=info".into()
        } else {
            "fruit_pilot_backend=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Pretty logging for development
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
